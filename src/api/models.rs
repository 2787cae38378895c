//! Webhook request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::template::Payload;

/// Body of `POST /webhook/{host}`
#[derive(Debug, Default, Deserialize)]
pub struct WebhookRequest {
    /// Selects the host template; missing or empty falls back to `default`
    #[serde(default)]
    pub message_type: Option<String>,

    /// Values available to the template as `{{.key}}`
    #[serde(default)]
    pub data: Option<Map<String, Value>>,

    /// Free-text message, exposed as `{{.message}}`
    #[serde(default)]
    pub message: Option<String>,
}

impl WebhookRequest {
    pub fn message_type(&self) -> &str {
        self.message_type.as_deref().unwrap_or_default()
    }

    /// Flatten the request into a template payload.
    ///
    /// A non-empty `message` overwrites `data.message`, and `host` is always
    /// set to the host the webhook was posted to.
    pub fn into_payload(self, host: &str) -> Payload {
        let mut payload = self.data.map(Payload::from_json_map).unwrap_or_default();

        if let Some(message) = self.message.filter(|m| !m.is_empty()) {
            payload.insert("message", message);
        }

        payload.insert("host", host);
        payload
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    pub host: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub delivered_to: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PayloadValue;
    use serde_json::json;

    fn parse(body: Value) -> WebhookRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_minimal_body() {
        let request = parse(json!({}));
        assert_eq!(request.message_type(), "");

        let payload = request.into_payload("ci");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("host"), Some(&PayloadValue::from("ci")));
    }

    #[test]
    fn test_data_is_flattened() {
        let payload = parse(json!({
            "message_type": "deploy",
            "data": {"version": "1.2.3", "build": 7}
        }))
        .into_payload("ci");

        assert_eq!(payload.get("version"), Some(&PayloadValue::from("1.2.3")));
        assert_eq!(payload.get("build"), Some(&PayloadValue::Integer(7)));
    }

    #[test]
    fn test_message_overwrites_data_message() {
        let payload = parse(json!({
            "data": {"message": "from data"},
            "message": "from body"
        }))
        .into_payload("ci");

        assert_eq!(payload.get("message"), Some(&PayloadValue::from("from body")));
    }

    #[test]
    fn test_empty_message_keeps_data_message() {
        let payload = parse(json!({
            "data": {"message": "from data"},
            "message": ""
        }))
        .into_payload("ci");

        assert_eq!(payload.get("message"), Some(&PayloadValue::from("from data")));
    }

    #[test]
    fn test_host_is_always_injected() {
        let payload = parse(json!({"data": {"host": "spoofed"}})).into_payload("ci");
        assert_eq!(payload.get("host"), Some(&PayloadValue::from("ci")));
    }

    #[test]
    fn test_null_fields_accepted() {
        let request = parse(json!({"message_type": null, "data": null, "message": null}));
        assert_eq!(request.message_type(), "");
        assert!(request.data.is_none());
        assert!(request.message.is_none());
    }

    #[test]
    fn test_wrong_field_types_rejected() {
        assert!(serde_json::from_value::<WebhookRequest>(json!({"data": "text"})).is_err());
        assert!(serde_json::from_value::<WebhookRequest>(json!({"message_type": 5})).is_err());
    }

    #[test]
    fn test_response_uses_type_key() {
        let response = WebhookResponse {
            status: "Message sent successfully".to_string(),
            host: "ci".to_string(),
            message_type: "deploy".to_string(),
            delivered_to: 2,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "deploy");
    }
}
