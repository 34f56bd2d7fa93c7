use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use super::section::{display_text, Section, Table};
use crate::error::PresentationError;
use crate::inference::Insights;

/// How a payload field looks, so every rule matches on it exhaustively.
#[derive(Debug, Clone, Copy)]
enum Shape<'a> {
    Absent,
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> Shape<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None => Shape::Absent,
            Some(Value::Object(map)) => Shape::Mapping(map),
            Some(Value::Array(items)) => Shape::Sequence(items),
            Some(scalar) => Shape::Scalar(scalar),
        }
    }

    /// Missing, null, false, zero, "" and empty containers all count as empty.
    fn is_empty(&self) -> bool {
        match self {
            Shape::Absent => true,
            Shape::Mapping(map) => map.is_empty(),
            Shape::Sequence(items) => items.is_empty(),
            Shape::Scalar(Value::Null) => true,
            Shape::Scalar(Value::Bool(b)) => !b,
            Shape::Scalar(Value::Number(n)) => n.as_f64() == Some(0.0),
            Shape::Scalar(Value::String(s)) => s.is_empty(),
            Shape::Scalar(_) => false,
        }
    }
}

/// Borrowed view of the recognized fields, whatever they came from.
struct Fields<'a> {
    status: Option<&'a Value>,
    confidence: Option<&'a Value>,
    predictions: Option<&'a Value>,
    detections: Option<&'a Value>,
    labels: Option<&'a Value>,
    results: Option<&'a Value>,
    analysis: Option<&'a Value>,
    objects: Option<&'a Value>,
    metadata: Option<&'a Value>,
    raw_response: Option<&'a Value>,
}

impl<'a> Fields<'a> {
    fn from_value(value: &'a Value) -> Result<Self, PresentationError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Err(PresentationError::NotAMapping { found: "null" }),
            Value::Bool(_) => return Err(PresentationError::NotAMapping { found: "a boolean" }),
            Value::Number(_) => return Err(PresentationError::NotAMapping { found: "a number" }),
            Value::String(_) => return Err(PresentationError::NotAMapping { found: "a string" }),
            Value::Array(_) => return Err(PresentationError::NotAMapping { found: "a sequence" }),
        };
        Ok(Self {
            status: map.get("status"),
            confidence: map.get("confidence"),
            predictions: map.get("predictions"),
            detections: map.get("detections"),
            labels: map.get("labels"),
            results: map.get("results"),
            analysis: map.get("analysis"),
            objects: map.get("objects"),
            metadata: map.get("metadata"),
            raw_response: map.get("raw_response"),
        })
    }
}

/// Turns insights into display sections. Stateless; the same input always
/// renders to the same sections.
pub struct Presenter;

impl Presenter {
    pub fn render(insights: &Insights, snapshot: Option<&Path>) -> Vec<Section> {
        let status = insights.status.clone().map(Value::String);
        let fields = Fields {
            status: status.as_ref(),
            confidence: insights.confidence.as_ref(),
            predictions: Some(&insights.predictions),
            detections: Some(&insights.detections),
            labels: Some(&insights.labels),
            results: insights.results.as_ref(),
            analysis: insights.analysis.as_ref(),
            objects: insights.objects.as_ref(),
            metadata: Some(&insights.metadata),
            raw_response: Some(&insights.raw_response),
        };
        Self::render_fields(&fields, snapshot)
    }

    /// Renders an arbitrary payload shaped like insights. Anything that is not
    /// a mapping becomes a single validation-error section.
    pub fn render_value(value: &Value, snapshot: Option<&Path>) -> Vec<Section> {
        match Fields::from_value(value) {
            Ok(fields) => Self::render_fields(&fields, snapshot),
            Err(e) => {
                warn!("Refusing to render insights: {}", e);
                vec![Section::ValidationError(e.to_string())]
            }
        }
    }

    fn render_fields(fields: &Fields<'_>, snapshot: Option<&Path>) -> Vec<Section> {
        let mut sections = Vec::new();

        if let Some(path) = snapshot {
            sections.push(Section::Caption(format!("From snapshot: {}", path.display())));
        }

        let status = Shape::of(fields.status);
        if !status.is_empty() {
            if let Some(value) = fields.status {
                let status = display_text(value);
                sections.push(Section::Status {
                    success: status == "success",
                    status,
                });
            }
        }

        match Shape::of(fields.confidence) {
            Shape::Absent | Shape::Scalar(Value::Null) => {}
            Shape::Scalar(Value::Number(n)) => match n.as_f64() {
                Some(fraction) => sections.push(Section::Confidence(format!("{:.2}%", fraction * 100.0))),
                None => sections.push(Section::Confidence(n.to_string())),
            },
            Shape::Scalar(other) => sections.push(Section::Confidence(display_text(other))),
            Shape::Mapping(_) | Shape::Sequence(_) => {
                if let Some(value) = fields.confidence {
                    sections.push(Section::Confidence(display_text(value)));
                }
            }
        }

        Self::push_table(&mut sections, "Predictions", "prediction", fields.predictions);
        Self::push_table(&mut sections, "Detections", "detection", fields.detections);

        match Shape::of(fields.labels) {
            shape if shape.is_empty() => {}
            Shape::Sequence(labels) => sections.push(Section::Text {
                title: "Labels",
                text: labels.iter().map(display_text).collect::<Vec<_>>().join(", "),
            }),
            Shape::Mapping(_) | Shape::Scalar(_) | Shape::Absent => {
                if let Some(value) = fields.labels {
                    sections.push(Section::Text {
                        title: "Labels",
                        text: display_text(value),
                    });
                }
            }
        }

        Self::push_structured(&mut sections, "Results", fields.results);
        Self::push_structured(&mut sections, "Analysis", fields.analysis);
        Self::push_table(&mut sections, "Objects", "object", fields.objects);

        let metadata = Shape::of(fields.metadata);
        if !metadata.is_empty() {
            if let Some(value) = fields.metadata {
                sections.push(Section::Json {
                    title: "Metadata",
                    value: value.clone(),
                });
            }
        }

        sections.push(Section::RawResponse(
            fields
                .raw_response
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        ));
        sections
    }

    /// Sequences become tables, non-mapping items wrapped as `{key: text}`.
    fn push_table(
        sections: &mut Vec<Section>,
        title: &'static str,
        key: &str,
        value: Option<&Value>,
    ) {
        match Shape::of(value) {
            shape if shape.is_empty() => {}
            Shape::Sequence(items) => {
                let rows: Vec<Map<String, Value>> = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => map.clone(),
                        other => {
                            let mut row = Map::new();
                            row.insert(key.to_string(), Value::String(display_text(other)));
                            row
                        }
                    })
                    .collect();
                sections.push(Section::Table {
                    title,
                    table: Table::from_rows(&rows),
                });
            }
            Shape::Mapping(_) | Shape::Scalar(_) | Shape::Absent => {
                if let Some(value) = value {
                    sections.push(Section::Text {
                        title,
                        text: display_text(value),
                    });
                }
            }
        }
    }

    fn push_structured(sections: &mut Vec<Section>, title: &'static str, value: Option<&Value>) {
        match Shape::of(value) {
            shape if shape.is_empty() => {}
            Shape::Mapping(_) | Shape::Sequence(_) => {
                if let Some(value) = value {
                    sections.push(Section::Json {
                        title,
                        value: value.clone(),
                    });
                }
            }
            Shape::Scalar(scalar) => sections.push(Section::Text {
                title,
                text: display_text(scalar),
            }),
            Shape::Absent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn sample() -> Insights {
        Insights::from_payload(json!({"status": "success", "confidence": 0.87, "labels": ["cat", "dog"]}))
    }

    #[test]
    fn labels_and_confidence_render_as_text() {
        let sections = Presenter::render(&sample(), None);
        assert_eq!(
            sections,
            vec![
                Section::Status {
                    success: true,
                    status: "success".to_string()
                },
                Section::Confidence("87.00%".to_string()),
                Section::Text {
                    title: "Labels",
                    text: "cat, dog".to_string()
                },
                Section::RawResponse(
                    json!({"status": "success", "confidence": 0.87, "labels": ["cat", "dog"]})
                ),
            ]
        );
    }

    #[test]
    fn rendering_twice_is_identical() {
        let insights = Insights::from_payload(json!({
            "status": "partial",
            "predictions": [{"label": "cat", "score": 0.5}, "dog"],
            "metadata": {"model": "v2"},
            "results": {"count": 2},
        }));
        let path = PathBuf::from("snapshots/snapshot_20240101_120000.jpg");
        let first = Presenter::render(&insights, Some(&path));
        let second = Presenter::render(&insights, Some(&path));
        assert_eq!(first, second);
    }

    #[test]
    fn sections_follow_fixed_order() {
        let payload = json!({
            "raw_response": {"k": 1},
            "metadata": {"model": "v2"},
            "objects": ["chair"],
            "analysis": "clear",
            "results": [1, 2],
            "labels": ["a"],
            "detections": [{"x": 1}],
            "predictions": ["p"],
            "confidence": 0.5,
            "status": "degraded",
        });
        let path = PathBuf::from("snapshots/snapshot_20240101_120000.jpg");
        let sections = Presenter::render_value(&payload, Some(&path));
        let kinds: Vec<String> = sections
            .iter()
            .map(|s| match s {
                Section::Caption(_) => "caption".to_string(),
                Section::Status { success, .. } => format!("status:{}", success),
                Section::Confidence(c) => format!("confidence:{}", c),
                Section::RawResponse(_) => "raw".to_string(),
                other => other.title().unwrap_or_default().to_string(),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "caption",
                "status:false",
                "confidence:50.00%",
                "Predictions",
                "Detections",
                "Labels",
                "Results",
                "Analysis",
                "Objects",
                "Metadata",
                "raw",
            ]
        );
        assert_eq!(
            sections[0],
            Section::Caption("From snapshot: snapshots/snapshot_20240101_120000.jpg".to_string())
        );
        assert_eq!(sections[10], Section::RawResponse(json!({"k": 1})));
    }

    #[test]
    fn scalar_items_are_wrapped_by_field_name() {
        let insights = Insights::from_payload(json!({
            "predictions": ["cat", 3],
            "detections": [{"label": "dog"}],
            "objects": [true],
        }));
        let sections = Presenter::render(&insights, None);
        let tables: Vec<(&str, &Table)> = sections
            .iter()
            .filter_map(|s| match s {
                Section::Table { title, table } => Some((*title, table)),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].0, "Predictions");
        assert_eq!(tables[0].1.columns, vec!["prediction".to_string()]);
        assert_eq!(
            tables[0].1.rows,
            vec![vec!["cat".to_string()], vec!["3".to_string()]]
        );
        assert_eq!(tables[1].1.columns, vec!["label".to_string()]);
        assert_eq!(tables[2].1.columns, vec!["object".to_string()]);
        assert_eq!(tables[2].1.rows, vec![vec!["true".to_string()]]);
    }

    #[test]
    fn empty_fields_are_skipped_but_raw_response_stays() {
        let sections = Presenter::render_value(
            &json!({"status": "", "labels": [], "metadata": {}, "results": null, "analysis": 0}),
            None,
        );
        assert_eq!(sections, vec![Section::RawResponse(json!({}))]);
    }

    #[test]
    fn non_numeric_confidence_and_scalar_results_render_as_text() {
        let sections = Presenter::render_value(
            &json!({"confidence": "high", "results": "42 objects", "labels": "cat"}),
            None,
        );
        assert!(sections.contains(&Section::Confidence("high".to_string())));
        assert!(sections.contains(&Section::Text {
            title: "Results",
            text: "42 objects".to_string()
        }));
        assert!(sections.contains(&Section::Text {
            title: "Labels",
            text: "cat".to_string()
        }));
    }

    #[test]
    fn non_mapping_input_yields_only_a_validation_error() {
        let sections = Presenter::render_value(&json!(["not", "a", "mapping"]), None);
        assert_eq!(sections.len(), 1);
        assert!(matches!(&sections[0], Section::ValidationError(msg) if msg.contains("sequence")));
    }

    #[test]
    fn zero_confidence_is_still_shown() {
        let insights = Insights::from_payload(json!({"confidence": 0}));
        let sections = Presenter::render(&insights, None);
        assert!(sections.contains(&Section::Confidence("0.00%".to_string())));
    }

    #[test]
    fn null_status_renders_no_status_line() {
        let insights = Insights::from_payload(json!({"status": null, "labels": ["cat"]}));
        let sections = Presenter::render(&insights, None);
        assert!(!sections
            .iter()
            .any(|s| matches!(s, Section::Status { .. })));

        let missing = Presenter::render(&Insights::from_payload(json!({})), None);
        assert_eq!(
            missing[0],
            Section::Status {
                success: false,
                status: "unknown".to_string()
            }
        );
    }
}
