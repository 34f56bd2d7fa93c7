use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized view of one inference response.
///
/// `results`, `analysis` and `objects` are `None` when the payload did not
/// carry them, which is different from carrying an empty value. `status`
/// is `"unknown"` when the key is missing and `None` when it is explicitly null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub status: Option<String>,
    pub confidence: Option<Value>,
    pub predictions: Value,
    pub detections: Value,
    pub labels: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Value>,
    pub metadata: Value,
    pub raw_response: Value,
}

impl Insights {
    /// Extracts the recognized fields and keeps the untouched payload.
    /// A payload that is not a JSON object yields all defaults.
    pub fn from_payload(payload: Value) -> Self {
        let empty = Map::new();
        let fields = payload.as_object().unwrap_or(&empty);
        let present = |key: &str| fields.get(key).cloned();
        let or_default = |key: &str, default: Value| fields.get(key).cloned().unwrap_or(default);

        let status = match fields.get("status") {
            None => Some("unknown".to_string()),
            Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            status,
            confidence: present("confidence").filter(|v| !v.is_null()),
            predictions: or_default("predictions", Value::Array(Vec::new())),
            detections: or_default("detections", Value::Array(Vec::new())),
            labels: or_default("labels", Value::Array(Vec::new())),
            results: present("results"),
            analysis: present("analysis"),
            objects: present("objects"),
            metadata: or_default("metadata", Value::Object(Map::new())),
            raw_response: payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let payload = json!({"status": "success", "confidence": 0.87, "labels": ["cat", "dog"]});
        let insights = Insights::from_payload(payload.clone());
        assert_eq!(insights.status.as_deref(), Some("success"));
        assert_eq!(insights.confidence, Some(json!(0.87)));
        assert_eq!(insights.labels, json!(["cat", "dog"]));
        assert_eq!(insights.predictions, json!([]));
        assert_eq!(insights.detections, json!([]));
        assert_eq!(insights.metadata, json!({}));
        assert_eq!(insights.results, None);
        assert_eq!(insights.analysis, None);
        assert_eq!(insights.objects, None);
        assert_eq!(insights.raw_response, payload);
    }

    #[test]
    fn optional_sections_are_copied_only_when_present() {
        let insights = Insights::from_payload(json!({"results": {}, "objects": []}));
        assert_eq!(insights.results, Some(json!({})));
        assert_eq!(insights.objects, Some(json!([])));
        assert_eq!(insights.analysis, None);
        assert_eq!(insights.status.as_deref(), Some("unknown"));
    }

    #[test]
    fn non_object_payload_is_kept_as_raw_response() {
        let insights = Insights::from_payload(json!([1, 2, 3]));
        assert_eq!(insights.status.as_deref(), Some("unknown"));
        assert_eq!(insights.confidence, None);
        assert_eq!(insights.raw_response, json!([1, 2, 3]));
    }

    #[test]
    fn non_string_status_is_kept_as_text() {
        let insights = Insights::from_payload(json!({"status": 200, "confidence": null}));
        assert_eq!(insights.status.as_deref(), Some("200"));
        assert_eq!(insights.confidence, None);
    }

    #[test]
    fn null_status_is_not_reported() {
        let insights = Insights::from_payload(json!({"status": null, "labels": ["cat"]}));
        assert_eq!(insights.status, None);
    }
}
