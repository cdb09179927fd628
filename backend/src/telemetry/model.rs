//! Wire model of the telemetry query response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Custom deserializer that renders every cell as text.
///
/// The query projects its value column through `tostring`, but numeric and
/// null cells still show up in practice. Numbers keep their decimal text;
/// null becomes an empty string and is rejected later by the row parser.
fn deserialize_cells<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<Vec<Value>>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}

/// Column descriptor returned alongside the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

/// One result table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, deserialize_with = "deserialize_cells")]
    pub rows: Vec<Vec<String>>,
}

/// Container for the response body: `{ tables: [ { rows: [[..], ..] } ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TablesResult {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl TablesResult {
    /// Build a single-table result from string rows.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            tables: vec![Table {
                rows,
                ..Default::default()
            }],
        }
    }

    /// Rows of the first table; an empty set when there are no tables.
    pub fn into_primary_rows(self) -> Vec<Vec<String>> {
        self.tables
            .into_iter()
            .next()
            .map(|table| table.rows)
            .unwrap_or_default()
    }
}
