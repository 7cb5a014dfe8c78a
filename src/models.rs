//! Data models shared by the aggregator, the history log and the HTTP layer.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ---

/// One mood observation posted by the tracker.
///
/// `expression` is the category label; every field of the original object
/// (including `expression`) is kept in its original order so the history log
/// can write it back unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Observation {
    // ---
    expression: String,
    fields: Map<String, Value>,
}

impl Observation {
    // ---
    /// Observation carrying only an `expression` field.
    pub fn new(expression: impl Into<String>) -> Self {
        // ---
        let expression = expression.into();
        let mut fields = Map::new();
        fields.insert("expression".into(), Value::String(expression.clone()));
        Observation { expression, fields }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// All fields of the observation, in submission order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for Observation {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        // ---
        let expression = match fields.get("expression") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(format!("'expression' must be a string, got {}", other));
            }
            None => return Err("observation is missing 'expression'".to_string()),
        };
        Ok(Observation { expression, fields })
    }
}

/// Category → percentage, in first-occurrence order of the categories.
///
/// Serialized as a JSON object whose key order follows the vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(pub Vec<(String, f64)>);

impl Distribution {
    // ---
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, pct)| *pct)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, pct)| (label.as_str(), *pct))
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, pct) in &self.0 {
            map.serialize_entry(label, pct)?;
        }
        map.end()
    }
}

/// Outcome of analysing one observation batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    // ---
    pub total_samples: usize,
    /// Dominant category, upper-cased.
    pub dominant_mood: String,
    pub report_message: String,
    pub pie_chart_data: Distribution,
    pub csv_saved_path: String,
}
