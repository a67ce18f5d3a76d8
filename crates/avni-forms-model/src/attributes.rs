//! Form element attribute bag
//!
//! On the wire a form element's attributes are an ordered list of
//! `{key, value}` pairs. In memory the attributes the designer understands
//! are held in a variant keyed by the concept data type, so a Video element
//! cannot carry `maxHeight` and an Image element cannot carry
//! `durationOptions`. Every other key is kept verbatim in [`ElementAttributes::other`].

use crate::DataType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DURATION_OPTIONS: &str = "durationOptions";
pub const EXCLUDED_ANSWERS: &str = "ExcludedAnswers";
pub const MAX_HEIGHT: &str = "maxHeight";
pub const MAX_WIDTH: &str = "maxWidth";
pub const DURATION_LIMIT_IN_SECS: &str = "durationLimitInSecs";
pub const REPEATABLE: &str = "repeatable";

/// One attribute as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Attributes only legal for particular data types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypedAttributes {
    #[default]
    Plain,
    /// Date and Duration
    Temporal { duration_options: Option<Vec<String>> },
    Coded { excluded_answers: Option<Vec<String>> },
    Image {
        max_height: Option<Value>,
        max_width: Option<Value>,
    },
    Video { duration_limit_in_secs: Option<Value> },
    QuestionGroup { repeatable: Option<Value> },
}

impl TypedAttributes {
    fn empty_for(data_type: &DataType) -> Self {
        match data_type {
            DataType::Date | DataType::Duration => Self::Temporal {
                duration_options: None,
            },
            DataType::Coded => Self::Coded {
                excluded_answers: None,
            },
            DataType::Image => Self::Image {
                max_height: None,
                max_width: None,
            },
            DataType::Video => Self::Video {
                duration_limit_in_secs: None,
            },
            DataType::QuestionGroup => Self::QuestionGroup { repeatable: None },
            _ => Self::Plain,
        }
    }

    /// Store `value` under `key` if this variant owns the key and the value
    /// has the expected shape. Hands the value back otherwise.
    fn claim(&mut self, key: &str, value: Value) -> Option<Value> {
        match (self, key) {
            (Self::Temporal { duration_options }, DURATION_OPTIONS) => match string_list(&value) {
                Some(list) => {
                    *duration_options = Some(list);
                    None
                }
                None => Some(value),
            },
            (Self::Coded { excluded_answers }, EXCLUDED_ANSWERS) => match string_list(&value) {
                Some(list) => {
                    *excluded_answers = Some(list);
                    None
                }
                None => Some(value),
            },
            (Self::Image { max_height, .. }, MAX_HEIGHT) => {
                *max_height = Some(value);
                None
            }
            (Self::Image { max_width, .. }, MAX_WIDTH) => {
                *max_width = Some(value);
                None
            }
            (Self::Video { duration_limit_in_secs }, DURATION_LIMIT_IN_SECS) => {
                *duration_limit_in_secs = Some(value);
                None
            }
            (Self::QuestionGroup { repeatable }, REPEATABLE) => {
                *repeatable = Some(value);
                None
            }
            _ => Some(value),
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        match (self, key) {
            (Self::Temporal { duration_options }, DURATION_OPTIONS) => {
                duration_options.as_ref().map(|l| string_list_value(l))
            }
            (Self::Coded { excluded_answers }, EXCLUDED_ANSWERS) => {
                excluded_answers.as_ref().map(|l| string_list_value(l))
            }
            (Self::Image { max_height, .. }, MAX_HEIGHT) => max_height.clone(),
            (Self::Image { max_width, .. }, MAX_WIDTH) => max_width.clone(),
            (Self::Video { duration_limit_in_secs }, DURATION_LIMIT_IN_SECS) => {
                duration_limit_in_secs.clone()
            }
            (Self::QuestionGroup { repeatable }, REPEATABLE) => repeatable.clone(),
            _ => None,
        }
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        let current = self.get(key);
        match (self, key) {
            (Self::Temporal { duration_options }, DURATION_OPTIONS) => *duration_options = None,
            (Self::Coded { excluded_answers }, EXCLUDED_ANSWERS) => *excluded_answers = None,
            (Self::Image { max_height, .. }, MAX_HEIGHT) => *max_height = None,
            (Self::Image { max_width, .. }, MAX_WIDTH) => *max_width = None,
            (Self::Video { duration_limit_in_secs }, DURATION_LIMIT_IN_SECS) => {
                *duration_limit_in_secs = None
            }
            (Self::QuestionGroup { repeatable }, REPEATABLE) => *repeatable = None,
            _ => {}
        }
        current
    }

    fn pairs(&self) -> Vec<KeyValue> {
        let entries: Vec<(&str, Option<Value>)> = match self {
            Self::Plain => vec![],
            Self::Temporal { .. } => vec![(DURATION_OPTIONS, self.get(DURATION_OPTIONS))],
            Self::Coded { .. } => vec![(EXCLUDED_ANSWERS, self.get(EXCLUDED_ANSWERS))],
            Self::Image { .. } => vec![
                (MAX_HEIGHT, self.get(MAX_HEIGHT)),
                (MAX_WIDTH, self.get(MAX_WIDTH)),
            ],
            Self::Video { .. } => vec![(DURATION_LIMIT_IN_SECS, self.get(DURATION_LIMIT_IN_SECS))],
            Self::QuestionGroup { .. } => vec![(REPEATABLE, self.get(REPEATABLE))],
        };
        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| KeyValue::new(key, v)))
            .collect()
    }
}

/// Attributes of one form element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementAttributes {
    pub typed: TypedAttributes,
    /// Keys not owned by the typed variant, in wire order
    pub other: IndexMap<String, Value>,
}

impl ElementAttributes {
    /// Build the in-memory bag for an element of the given data type.
    /// A key appearing twice keeps its last value.
    pub fn from_pairs(data_type: &DataType, pairs: impl IntoIterator<Item = KeyValue>) -> Self {
        let mut attributes = Self {
            typed: TypedAttributes::empty_for(data_type),
            other: IndexMap::new(),
        };
        for KeyValue { key, value } in pairs {
            attributes.set(key, value);
        }
        attributes
    }

    /// Collapse back to wire pairs
    pub fn to_pairs(&self) -> Vec<KeyValue> {
        let mut pairs: Vec<KeyValue> = self
            .other
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();
        pairs.extend(self.typed.pairs());
        pairs
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.typed.get(key).or_else(|| self.other.get(key).cloned())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.typed.claim(&key, value) {
            None => {
                self.other.shift_remove(&key);
            }
            Some(value) => {
                self.typed.remove(&key);
                self.other.insert(key, value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.typed
            .remove(key)
            .or_else(|| self.other.shift_remove(key))
    }

    pub fn len(&self) -> usize {
        self.other.len() + self.typed.pairs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-home every attribute under a new data type, e.g. after the
    /// element's concept was replaced
    pub fn retype(&mut self, data_type: &DataType) {
        *self = Self::from_pairs(data_type, self.to_pairs());
    }

    pub fn duration_options(&self) -> Option<&[String]> {
        match &self.typed {
            TypedAttributes::Temporal { duration_options } => duration_options.as_deref(),
            _ => None,
        }
    }

    pub fn duration_options_mut(&mut self) -> Option<&mut Option<Vec<String>>> {
        match &mut self.typed {
            TypedAttributes::Temporal { duration_options } => Some(duration_options),
            _ => None,
        }
    }

    pub fn excluded_answers(&self) -> Option<&[String]> {
        match &self.typed {
            TypedAttributes::Coded { excluded_answers } => excluded_answers.as_deref(),
            _ => None,
        }
    }

    pub fn excluded_answers_mut(&mut self) -> Option<&mut Option<Vec<String>>> {
        match &mut self.typed {
            TypedAttributes::Coded { excluded_answers } => Some(excluded_answers),
            _ => None,
        }
    }

    /// `repeatable` read the way a loose boolean check reads it
    pub fn is_repeatable(&self) -> bool {
        self.get(REPEATABLE).as_ref().is_some_and(is_truthy)
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn string_list_value(list: &[String]) -> Value {
    Value::Array(list.iter().cloned().map(Value::String).collect())
}

/// Truthiness of a loosely typed attribute value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A value that is absent from the UI's point of view: null or empty text
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Read an integer the lenient way form inputs are read: numbers are
/// truncated, text is read up to the first non-digit after an optional sign.
/// Returns `None` when no digits lead the text. Values beyond the `i64`
/// range saturate.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, rest) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let digits: Vec<i64> = rest
                .chars()
                .map_while(|c| c.to_digit(10))
                .map(i64::from)
                .collect();
            if digits.is_empty() {
                return None;
            }
            let value = digits.iter().fold(0i64, |acc, &d| {
                let acc = acc.saturating_mul(10);
                if negative {
                    acc.saturating_sub(d)
                } else {
                    acc.saturating_add(d)
                }
            });
            Some(value)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_typed_keys_are_claimed_per_data_type() {
        let pairs = vec![
            KeyValue::new(MAX_HEIGHT, json!(200)),
            KeyValue::new("editable", json!(false)),
        ];

        let image = ElementAttributes::from_pairs(&DataType::Image, pairs.clone());
        assert!(matches!(image.typed, TypedAttributes::Image { max_height: Some(_), .. }));
        assert_eq!(image.other.len(), 1);

        let text = ElementAttributes::from_pairs(&DataType::Text, pairs);
        assert_eq!(text.typed, TypedAttributes::Plain);
        assert_eq!(text.other.len(), 2);
        assert_eq!(text.get(MAX_HEIGHT), Some(json!(200)));
    }

    #[test]
    fn test_malformed_typed_value_stays_in_other() {
        let attrs = ElementAttributes::from_pairs(
            &DataType::Duration,
            vec![KeyValue::new(DURATION_OPTIONS, json!("years"))],
        );
        assert_eq!(attrs.duration_options(), None);
        assert_eq!(attrs.get(DURATION_OPTIONS), Some(json!("years")));
    }

    #[test]
    fn test_set_moves_between_typed_and_other() {
        let mut attrs = ElementAttributes::from_pairs(&DataType::Coded, vec![]);
        attrs.set(EXCLUDED_ANSWERS, json!("bad"));
        assert_eq!(attrs.other.len(), 1);

        attrs.set(EXCLUDED_ANSWERS, json!(["Yes"]));
        assert!(attrs.other.is_empty());
        assert_eq!(attrs.excluded_answers(), Some(&["Yes".to_string()][..]));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_retype_keeps_every_pair() {
        let mut attrs = ElementAttributes::from_pairs(
            &DataType::Date,
            vec![
                KeyValue::new(DURATION_OPTIONS, json!(["days"])),
                KeyValue::new("unique", json!(true)),
            ],
        );
        attrs.retype(&DataType::Text);

        assert_eq!(attrs.typed, TypedAttributes::Plain);
        assert_eq!(attrs.get(DURATION_OPTIONS), Some(json!(["days"])));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_empty_bag_has_no_pairs() {
        let attrs = ElementAttributes::from_pairs(&DataType::Video, vec![]);
        assert!(attrs.is_empty());
        assert_eq!(attrs.to_pairs(), vec![]);
    }

    #[rstest]
    #[case(json!("-5"), Some(-5))]
    #[case(json!("5"), Some(5))]
    #[case(json!(" 12px"), Some(12))]
    #[case(json!(-3.7), Some(-3))]
    #[case(json!("-99999999999999999999"), Some(i64::MIN))]
    #[case(json!("99999999999999999999"), Some(i64::MAX))]
    #[case(json!(""), None)]
    #[case(json!("abc"), None)]
    #[case(json!(null), None)]
    fn test_lenient_int(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(lenient_int(&value), expected);
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(null), false)]
    #[case(json!(""), false)]
    #[case(json!("MultiSelect"), true)]
    #[case(json!(0), false)]
    fn test_truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }
}
