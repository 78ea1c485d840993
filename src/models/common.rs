use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"success", "data", "message", "error"}`: the body of every response.
/// Handlers build it with `json!`; the bot's backend client decodes it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_envelope_without_data() {
        let body = r#"{"success":false,"error":{"code":"NOT_FOUND","message":"User not found"}}"#;
        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!parsed.success);
        assert!(parsed.data.is_none());
        assert_eq!(parsed.error.unwrap().message, "User not found");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Session {
        session_id: i32,
    }

    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> ApiResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_decode_envelope_for_any_payload() {
        let parsed: ApiResponse<Session> = decode(r#"{"success":true,"data":{"session_id":9}}"#);
        assert_eq!(parsed.data, Some(Session { session_id: 9 }));

        let parsed: ApiResponse<Session> = decode(r#"{"success":true,"message":"ok"}"#);
        assert!(parsed.data.is_none());
        assert_eq!(parsed.message.as_deref(), Some("ok"));
    }
}
