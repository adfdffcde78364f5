use serde::Serialize;
use serde_json::Value;

// ============================================================================
// API Response Envelope
// ============================================================================
//
// Every endpoint answers with the same envelope:
// {success, message?, data?, errors?, meta?}
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
            meta: None,
        }
    }

    pub fn ok_with_message(message: &str, data: Value) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            errors: None,
            meta: None,
        }
    }

    pub fn ok_with_meta(data: Value, meta: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
            meta: Some(meta),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
            meta: None,
        }
    }

    pub fn validation_failed(errors: Value) -> Self {
        Self {
            success: false,
            message: Some("Validation failed".to_string()),
            data: None,
            errors: Some(errors),
            meta: None,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_omits_absent_fields() {
        let response = ApiResponse::ok(json!({"id": "abc"}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], "abc");
        assert!(value.get("message").is_none());
        assert!(value.get("errors").is_none());
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let response = ApiResponse::error("User not found");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "User not found");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_validation_envelope_carries_field_errors() {
        let response = ApiResponse::validation_failed(json!({"email": ["invalid"]}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Validation failed");
        assert_eq!(value["errors"]["email"][0], "invalid");
    }
}
