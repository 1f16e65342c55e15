use crate::utils::error::Result;
use serde::Serialize;

/// 每次執行只輸出一個 JSON 值到 stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_has_single_error_field() {
        let body = error_body("boom");
        assert_eq!(body, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn test_error_body_preserves_message_verbatim() {
        let body = error_body("Usage: auto_route \"<objective>\"");
        assert_eq!(
            body["error"].as_str().unwrap(),
            "Usage: auto_route \"<objective>\""
        );
    }
}
