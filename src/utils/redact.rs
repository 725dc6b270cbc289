use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const REDACTED: &str = "[REDACTED]";
const INLINE_REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "client_secret",
    "access_token",
    "authorization",
    "api_key",
    "x-cs-client-secret",
];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~+/=-]{10,})").expect("bearer pattern"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b")
                .expect("jwt pattern"),
            INLINE_REDACTED,
        ),
        (
            Regex::new(r#"\b(client_secret|access_token|secret|token)\b\s*([:=])\s*([^\s"'&]+)"#)
                .expect("key-value pattern"),
            "$1$2***REDACTED***",
        ),
    ]
});

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_KEYS.contains(&normalized.as_str())
        || normalized.contains("secret")
        || normalized.contains("token")
}

fn truncate(value: String, max_length: usize) -> String {
    if value.len() <= max_length {
        return value;
    }
    let mut cut = max_length;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &value[..cut])
}

/// Masks bearer tokens, JWTs and `secret=...` pairs inside free text, then
/// truncates to `max_string` bytes.
pub fn redact_text(value: &str, max_string: usize, extra_secrets: Option<&[String]>) -> String {
    let mut out = value.to_string();
    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, *replacement).into_owned();
        }
    }
    for secret in extra_secrets.unwrap_or_default() {
        let needle = secret.trim();
        if needle.len() >= 6 {
            out = out.replace(needle, INLINE_REDACTED);
        }
    }
    truncate(out, max_string)
}

/// Copy of `value` safe to log: sensitive keys are replaced wholesale, other
/// strings are scrubbed with [`redact_text`].
pub fn redact_object(value: &Value, max_string: usize, extra_secrets: Option<&[String]>) -> Value {
    match value {
        Value::String(text) => Value::String(redact_text(text, max_string, extra_secrets)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_object(item, max_string, extra_secrets))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, entry)| {
                    let redacted = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_object(entry, max_string, extra_secrets)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_keys_are_replaced() {
        let input = serde_json::json!({
            "client_id": "abc",
            "client_secret": "shh",
            "nested": {"X-CS-Client-Secret": "shh", "access_token": "tok"}
        });
        let out = redact_object(&input, usize::MAX, None);
        assert_eq!(out["client_id"], "abc");
        assert_eq!(out["client_secret"], REDACTED);
        assert_eq!(out["nested"]["X-CS-Client-Secret"], REDACTED);
        assert_eq!(out["nested"]["access_token"], REDACTED);
    }

    #[test]
    fn inline_bearer_tokens_are_masked() {
        let out = redact_text("Authorization: Bearer abcdefghijklmnop", usize::MAX, None);
        assert_eq!(out, "Authorization: Bearer ***REDACTED***");
        let out = redact_text("client_secret=hunter2hunter2&x=1", usize::MAX, None);
        assert_eq!(out, "client_secret=***REDACTED***&x=1");
    }

    #[test]
    fn long_strings_are_truncated_on_char_boundary() {
        let out = redact_text("ééééé", 3, None);
        assert_eq!(out, "é...");
    }

    #[test]
    fn extra_secrets_are_masked() {
        let secrets = vec!["tenant-secret-value".to_string()];
        let out = redact_text("got tenant-secret-value back", usize::MAX, Some(&secrets));
        assert_eq!(out, "got ***REDACTED*** back");
    }
}
