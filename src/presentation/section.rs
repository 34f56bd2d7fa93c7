use serde_json::{Map, Value};

/// One display block produced by the presenter, in render order.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// `From snapshot: <path>`
    Caption(String),
    Status { success: bool, status: String },
    /// Already formatted, e.g. `87.00%`.
    Confidence(String),
    Table { title: &'static str, table: Table },
    Text { title: &'static str, text: String },
    Json { title: &'static str, value: Value },
    /// Always present, shown collapsed.
    RawResponse(Value),
    ValidationError(String),
}

impl Section {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Section::Table { title, .. } | Section::Text { title, .. } | Section::Json { title, .. } => {
                Some(*title)
            }
            Section::RawResponse(_) => Some("View Raw API Response"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Columns are the union of row keys in first-seen order; missing cells are blank.
    pub fn from_rows(rows: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).map(display_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }
}

/// Strings print bare, everything else as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_columns_are_union_of_keys() {
        let rows: Vec<Map<String, Value>> = vec![
            json!({"label": "cat", "score": 0.9}).as_object().unwrap().clone(),
            json!({"label": "dog", "box": [1, 2]}).as_object().unwrap().clone(),
        ];
        let table = Table::from_rows(&rows);
        assert_eq!(table.columns.len(), 3);
        let label = table.columns.iter().position(|c| c == "label").unwrap();
        let boxed = table.columns.iter().position(|c| c == "box").unwrap();
        assert_eq!(table.rows[0][label], "cat");
        assert_eq!(table.rows[0][boxed], "");
        assert_eq!(table.rows[1][boxed], "[1,2]");
    }
}
