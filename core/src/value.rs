//! The untyped record value tree.
//!
//! Trackers travel through the engine as a [`Record`]: a string, an ordered
//! sequence of records, or an ordered string-keyed map of records. Records
//! arrive already decoded from JSON or YAML; scalars that are not strings
//! (null, booleans, numbers) are coerced to their string rendering at the
//! decode boundary so the engine only ever deals with the three shapes above.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A loosely-typed tracker value: string, sequence, or ordered map.
///
/// Map entries keep insertion order, which is load-bearing: field emission
/// order and `FOR_EACH_OBJECT` entity order are structural guarantees of the
/// reconciliation engine.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::Record;
///
/// let record: Record = serde_json::from_str(r#"{"Time": "09:00", "Topics": ["a", "b"]}"#).unwrap();
/// assert_eq!(record.get("Time").and_then(Record::as_str), Some("09:00"));
/// assert_eq!(record.get("Topics").and_then(Record::as_seq).map(|t| t.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// A scalar value, always carried as a string.
    Str(String),
    /// An ordered sequence of records.
    Seq(Vec<Record>),
    /// An ordered string-keyed mapping of records.
    Map(IndexMap<String, Record>),
}

impl Record {
    /// Creates an empty map record.
    pub fn empty_map() -> Self {
        Record::Map(IndexMap::new())
    }

    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Record::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is a sequence.
    pub fn as_seq(&self) -> Option<&[Record]> {
        match self {
            Record::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Record>> {
        match self {
            Record::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this record is a string.
    pub fn is_str(&self) -> bool {
        matches!(self, Record::Str(_))
    }

    /// Whether this record is a sequence.
    pub fn is_seq(&self) -> bool {
        matches!(self, Record::Seq(_))
    }

    /// Whether this record is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Record::Map(_))
    }

    /// Looks up a key in a map record; `None` for any other shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_tracker_core::Record;
    ///
    /// let record = Record::from(serde_json::json!({"Location": "Pier 39"}));
    /// assert_eq!(record.get("Location").and_then(Record::as_str), Some("Pier 39"));
    /// assert_eq!(record.get("Weather"), None);
    /// assert_eq!(Record::from("plain").get("Location"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&Record> {
        match self {
            Record::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Truthiness used by template conditionals.
    ///
    /// Strings are falsy when empty, `"false"`, or `"0"` — the images of the
    /// falsy JSON scalars under the decode-boundary coercion. Sequences and
    /// maps are always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Record::Str(s) => !(s.is_empty() || s == "false" || s == "0"),
            Record::Seq(_) | Record::Map(_) => true,
        }
    }

    /// Deep-merges `source` into `self`.
    ///
    /// Map entries merge recursively with `source` winning on conflicts;
    /// strings and sequences replace whatever they land on. Merging anything
    /// into a non-map replaces it wholesale.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_tracker_core::Record;
    ///
    /// let mut base = Record::from(serde_json::json!({"a": {"x": "1"}, "b": "keep"}));
    /// base.deep_merge(&Record::from(serde_json::json!({"a": {"y": "2"}})));
    /// assert_eq!(base, Record::from(serde_json::json!({"a": {"x": "1", "y": "2"}, "b": "keep"})));
    /// ```
    pub fn deep_merge(&mut self, source: &Record) {
        match (&mut *self, source) {
            (Record::Map(target), Record::Map(incoming)) => {
                for (key, value) in incoming {
                    if value.is_map() {
                        let slot = target.entry(key.clone()).or_insert_with(Record::empty_map);
                        if !slot.is_map() {
                            *slot = Record::empty_map();
                        }
                        slot.deep_merge(value);
                    } else {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
            (slot, value) => *slot = value.clone(),
        }
    }

    /// Recursively removes empty maps and empty sequences from map entries.
    ///
    /// Used to clean the extras tree before it is attached to a reconciled
    /// tracker. Strings pass through unchanged.
    #[must_use]
    pub fn prune_empty(self) -> Record {
        match self {
            Record::Map(map) => {
                let mut pruned = IndexMap::new();
                for (key, value) in map {
                    let value = value.prune_empty();
                    match &value {
                        Record::Map(m) if m.is_empty() => {}
                        Record::Seq(s) if s.is_empty() => {}
                        _ => {
                            pruned.insert(key, value);
                        }
                    }
                }
                Record::Map(pruned)
            }
            Record::Seq(items) => Record::Seq(items.into_iter().map(Record::prune_empty).collect()),
            other => other,
        }
    }

    /// Renders this record as compact JSON.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Record::Str(value.to_string())
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Record::Str(value)
    }
}

impl From<Vec<Record>> for Record {
    fn from(value: Vec<Record>) -> Self {
        Record::Seq(value)
    }
}

impl From<Vec<&str>> for Record {
    fn from(value: Vec<&str>) -> Self {
        Record::Seq(value.into_iter().map(Record::from).collect())
    }
}

impl From<IndexMap<String, Record>> for Record {
    fn from(value: IndexMap<String, Record>) -> Self {
        Record::Map(value)
    }
}

impl From<serde_json::Value> for Record {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Record::Str(String::new()),
            serde_json::Value::Bool(b) => Record::Str(b.to_string()),
            serde_json::Value::Number(n) => Record::Str(n.to_string()),
            serde_json::Value::String(s) => Record::Str(s),
            serde_json::Value::Array(items) => {
                Record::Seq(items.into_iter().map(Record::from).collect())
            }
            serde_json::Value::Object(map) => {
                Record::Map(map.into_iter().map(|(k, v)| (k, Record::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, scalar, sequence, or map")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Record, E> {
                Ok(Record::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Record, E> {
                Ok(Record::Str(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Record, E> {
                Ok(Record::Str(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Record, E> {
                Ok(Record::Str(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Record, E> {
                Ok(Record::Str(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Record, E> {
                Ok(Record::Str(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Record, E> {
                Ok(Record::Str(String::new()))
            }

            fn visit_none<E: de::Error>(self) -> Result<Record, E> {
                Ok(Record::Str(String::new()))
            }

            fn visit_some<D2: Deserializer<'de>>(
                self,
                deserializer: D2,
            ) -> Result<Record, D2::Error> {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Record, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Record::Seq(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
                let mut entries = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, Record>()? {
                    entries.insert(key, value);
                }
                Ok(Record::Map(entries))
            }
        }

        deserializer.deserialize_any(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_coercion_on_decode() {
        let record: Record = serde_json::from_str(r#"{"n": 42, "b": true, "x": null}"#).unwrap();
        assert_eq!(record.get("n"), Some(&Record::Str("42".to_string())));
        assert_eq!(record.get("b"), Some(&Record::Str("true".to_string())));
        assert_eq!(record.get("x"), Some(&Record::Str(String::new())));
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let record: Record = serde_json::from_str(r#"{"z": "1", "a": "2", "m": "3"}"#).unwrap();
        let keys: Vec<&str> = record.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_deep_merge_source_wins_on_conflicts() {
        let mut base = Record::from(serde_json::json!({"a": {"x": "old", "keep": "1"}}));
        base.deep_merge(&Record::from(serde_json::json!({"a": {"x": "new"}})));
        assert_eq!(
            base,
            Record::from(serde_json::json!({"a": {"x": "new", "keep": "1"}}))
        );
    }

    #[test]
    fn test_deep_merge_replaces_non_map_target() {
        let mut base = Record::from(serde_json::json!({"a": "scalar"}));
        base.deep_merge(&Record::from(serde_json::json!({"a": {"x": "1"}})));
        assert_eq!(base, Record::from(serde_json::json!({"a": {"x": "1"}})));
    }

    #[test]
    fn test_prune_empty_drops_empty_branches() {
        let record = Record::from(serde_json::json!({
            "keep": "v",
            "empty_map": {},
            "nested": {"inner": {}},
            "empty_seq": []
        }));
        assert_eq!(
            record.prune_empty(),
            Record::from(serde_json::json!({"keep": "v"}))
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(Record::from("yes").is_truthy());
        assert!(!Record::from("").is_truthy());
        assert!(!Record::from("false").is_truthy());
        assert!(!Record::from("0").is_truthy());
        assert!(Record::Seq(Vec::new()).is_truthy());
        assert!(Record::empty_map().is_truthy());
    }

    #[test]
    fn test_serialize_round_trip() {
        let record = Record::from(serde_json::json!({"a": ["1", "2"], "b": {"c": "d"}}));
        let text = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(record, back);
    }
}
