use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use serde_json::Value;

/// `InvalidParams` error for an `action` the tool does not implement, with
/// did-you-mean suggestions drawn from `known_actions`.
pub fn unknown_action_error(tool: &str, action: Option<&Value>, known_actions: &[&str]) -> ToolError {
    let requested = action.and_then(|v| v.as_str()).unwrap_or("").trim();
    let known: Vec<String> = known_actions.iter().map(|s| s.to_string()).collect();
    let suggestions = suggest(requested, &known, 3);

    let message = if requested.is_empty() {
        format!("{}: action is required", tool)
    } else {
        format!("Unknown {} action: {}", tool, requested)
    };
    let mut hint = format!("Use one of: {}.", known.join(", "));
    if !suggestions.is_empty() {
        hint = format!("Did you mean: {}? {}", suggestions.join(", "), hint);
    }

    ToolError::invalid_params(message)
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_actions": known,
            "did_you_mean": suggestions,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_nearest_action() {
        let err = unknown_action_error(
            "falcon_hosts",
            Some(&serde_json::json!("serach")),
            &["query", "get", "search"],
        );
        assert_eq!(err.message, "Unknown falcon_hosts action: serach");
        assert!(err.hint.as_deref().unwrap_or("").starts_with("Did you mean: search?"));
    }

    #[test]
    fn missing_action_is_reported() {
        let err = unknown_action_error("falcon_rtr", None, &["init_session"]);
        assert_eq!(err.message, "falcon_rtr: action is required");
    }
}
