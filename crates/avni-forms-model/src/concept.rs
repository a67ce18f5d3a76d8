//! Concepts and coded answers

use crate::{DataType, KeyValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed question definition.
///
/// Concepts belong to the concept library. Form elements hold them through
/// `Arc<Concept>` and copy on write when an inline concept is edited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_absolute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_absolute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_normal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_normal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_values: Vec<KeyValue>,
    #[serde(default)]
    pub voided: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Concept {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            data_type,
            ..Self::default()
        }
    }

    /// Answers that have not been deleted, in display order
    pub fn live_answers(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter().filter(|a| !a.voided)
    }

    pub fn key_value(&self, key: &str) -> Option<&Value> {
        self.key_values.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
    }

    /// Insert or replace a concept-level key value
    pub fn set_key_value(&mut self, key: &str, value: Value) {
        match self.key_values.iter_mut().find(|kv| kv.key == key) {
            Some(kv) => kv.value = value,
            None => self.key_values.push(KeyValue::new(key, value)),
        }
    }

    /// Renumber answer `order` after answers were moved
    pub fn renumber_answers(&mut self) {
        for (index, answer) in self.answers.iter_mut().enumerate() {
            answer.order = index as f64;
        }
    }
}

/// An answer of a coded concept
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub voided: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub abnormal: bool,
    #[serde(default)]
    pub order: f64,
    /// Hidden on this form element; derived from the element's
    /// `ExcludedAnswers` attribute and written back to it on save
    #[serde(skip)]
    pub excluded: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Answer {
    pub fn new(name: impl Into<String>, order: usize) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            order: order as f64,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_concept_deserialize_keeps_unknown_fields() {
        let concept: Concept = serde_json::from_value(json!({
            "uuid": "c-1",
            "name": "Blood group",
            "dataType": "Coded",
            "active": true,
            "answers": [
                {"uuid": "a-1", "name": "A+", "order": 0.0},
                {"uuid": "a-2", "name": "B+", "order": 1.0, "voided": true}
            ]
        }))
        .unwrap();

        assert_eq!(concept.data_type, DataType::Coded);
        assert_eq!(concept.extra.get("active"), Some(&json!(true)));
        assert_eq!(concept.live_answers().count(), 1);

        let back = serde_json::to_value(&concept).unwrap();
        assert_eq!(back["active"], json!(true));
        assert!(back["answers"][0].get("excluded").is_none());
    }

    #[test]
    fn test_set_key_value_upserts() {
        let mut concept = Concept::new("Village", DataType::Location);
        concept.set_key_value("lowestAddressLevelTypeUUIDs", json!(["x"]));
        concept.set_key_value("lowestAddressLevelTypeUUIDs", json!(["y"]));

        assert_eq!(concept.key_values.len(), 1);
        assert_eq!(concept.key_value("lowestAddressLevelTypeUUIDs"), Some(&json!(["y"])));
    }
}
