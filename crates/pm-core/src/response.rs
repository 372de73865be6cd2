//! The response envelope returned by every ProjectManager endpoint.
//!
//! Responses carry a `success` flag alongside either `data` or an `error`
//! object. [`ApiResponse::into_result`] collapses the envelope into a
//! [`Result`] so callers branch with `match` instead of inspecting flags.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Envelope wrapping the payload of an API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the call succeeded; `None` when the body carried no flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Whether the API attached an error.
    #[serde(default)]
    pub has_error: bool,
    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// HTTP status name echoed by the API (e.g. `OK`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
}

/// Error object inside an [`ApiResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Diagnostic detail intended for developers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_error: Option<String>,
    /// Further messages, e.g. one per invalid field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Convert the envelope into a [`Result`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the API flagged the call as failed, or
    /// [`Error::ParseError`] when the body is not a complete envelope.
    pub fn into_result(self) -> Result<T> {
        let Some(success) = self.success else {
            return Err(Error::ParseError(
                "Response did not contain a `success` flag".to_string(),
            ));
        };

        if !success || self.has_error {
            let message = self
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "The API reported a failure without a message".to_string());
            return Err(Error::Api { message });
        }

        self.data
            .ok_or_else(|| Error::ParseError("Successful response contained no data".to_string()))
    }
}

/// Extract `error.message` from a raw error body, if the body is an envelope.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_data() {
        let envelope: ApiResponse<Vec<u32>> = serde_json::from_value(json!({
            "success": true,
            "hasError": false,
            "data": [1, 2, 3],
            "statusCode": "OK"
        }))
        .unwrap();

        assert_eq!(envelope.into_result().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn failure_envelope_yields_api_error() {
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_value(json!({
            "success": false,
            "hasError": true,
            "error": { "message": "unauthorized", "technicalError": "token expired" }
        }))
        .unwrap();

        assert_eq!(
            envelope.into_result().unwrap_err(),
            Error::Api {
                message: "unauthorized".to_string()
            }
        );
    }

    #[test]
    fn failure_without_message_gets_placeholder() {
        let envelope: ApiResponse<u32> =
            serde_json::from_value(json!({ "success": false })).unwrap();

        let err = envelope.into_result().unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert!(!err.message().is_empty());
    }

    #[test]
    fn success_without_data_is_parse_error() {
        let envelope: ApiResponse<u32> =
            serde_json::from_value(json!({ "success": true })).unwrap();

        assert!(matches!(
            envelope.into_result().unwrap_err(),
            Error::ParseError(_)
        ));
    }

    #[test]
    fn missing_success_flag_is_parse_error() {
        let envelope: ApiResponse<u32> = serde_json::from_value(json!({ "data": 7 })).unwrap();

        assert!(matches!(
            envelope.into_result().unwrap_err(),
            Error::ParseError(_)
        ));
    }

    #[test]
    fn missing_data_does_not_need_default() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Profile {
            name: String,
        }

        let envelope: ApiResponse<Profile> =
            serde_json::from_value(json!({ "success": false, "error": { "message": "nope" } }))
                .unwrap();
        assert!(envelope.data.is_none());

        let envelope: ApiResponse<Profile> =
            serde_json::from_value(json!({ "success": true, "data": { "name": "Jane" } }))
                .unwrap();
        assert_eq!(
            envelope.into_result().unwrap(),
            Profile {
                name: "Jane".to_string()
            }
        );
    }

    #[test]
    fn error_message_reads_envelope() {
        let body = r#"{"success":false,"error":{"message":"Invalid bearer token"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid bearer token"));
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
    }
}
