// Flattened `service__tool` names used by the JSON-RPC surface

pub const SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolNameError {
    #[error("tool name \"{0}\" has no \"__\" separator")]
    MissingSeparator(String),
    #[error("tool name \"{0}\" has an empty service segment")]
    EmptyService(String),
    #[error("tool name \"{0}\" has an empty tool segment")]
    EmptyTool(String),
}

/// Join a service and tool name into one flattened name
pub fn flatten(service: &str, tool: &str) -> String {
    format!("{}{}{}", service, SEPARATOR, tool)
}

/// Split a flattened name at the first separator.
///
/// The remainder is the tool name and may itself contain `__`.
pub fn parse(name: &str) -> Result<(&str, &str), ToolNameError> {
    let (service, tool) = name
        .split_once(SEPARATOR)
        .ok_or_else(|| ToolNameError::MissingSeparator(name.to_string()))?;

    if service.is_empty() {
        return Err(ToolNameError::EmptyService(name.to_string()));
    }
    if tool.is_empty() {
        return Err(ToolNameError::EmptyTool(name.to_string()));
    }

    Ok((service, tool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(parse("github__get_file_content"), Ok(("github", "get_file_content")));
        assert_eq!(parse("n8n__list_workflows"), Ok(("n8n", "list_workflows")));
    }

    #[test]
    fn test_tool_segment_may_contain_separator() {
        assert_eq!(parse("svc__a__b"), Ok(("svc", "a__b")));
        assert_eq!(parse("svc____b"), Ok(("svc", "__b")));
        assert_eq!(parse("svc___b"), Ok(("svc", "_b")));
    }

    #[test]
    fn test_malformed_names_rejected() {
        assert_eq!(
            parse("list_workflows"),
            Err(ToolNameError::MissingSeparator("list_workflows".to_string()))
        );
        assert_eq!(parse("__tool"), Err(ToolNameError::EmptyService("__tool".to_string())));
        assert_eq!(parse("github__"), Err(ToolNameError::EmptyTool("github__".to_string())));
        assert!(parse("").is_err());
        assert!(parse("__").is_err());
    }

    #[test]
    fn test_flatten_then_parse() {
        let name = flatten("github", "find_repo");
        assert_eq!(name, "github__find_repo");
        assert_eq!(parse(&name), Ok(("github", "find_repo")));
    }
}
