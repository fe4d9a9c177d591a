use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use num_format::{Locale, ToFormattedString};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// An ordered set of named values; the shape of a filter, projection, pipeline stage or record.
pub type Document = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    I16(i16),
    I32(i32),
    I64(i64),
    U32(u32),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    Uuid(uuid::Uuid),
    /// Hex encoded 12 byte object identifier
    ObjectId(String),
    Array(Vec<Value>),
    Map(Document),
}

impl Value {
    /// Render the value for tabular display; integers are grouped by the locale and nested
    /// values are rendered as compact JSON.
    #[must_use]
    pub fn to_formatted_string(&self, locale: &Locale) -> String {
        match self {
            Value::I16(value) => value.to_formatted_string(locale),
            Value::I32(value) => value.to_formatted_string(locale),
            Value::I64(value) => value.to_formatted_string(locale),
            Value::U32(value) => value.to_formatted_string(locale),
            _ => self.to_string(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::U32(_)
                | Value::F32(_)
                | Value::F64(_)
                | Value::Decimal(_)
        )
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    /// Truthiness the way projection documents use it: `{name: 1, _id: 0}`
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::I16(value) => *value != 0,
            Value::I32(value) => *value != 0,
            Value::I64(value) => *value != 0,
            Value::U32(value) => *value != 0,
            Value::F32(value) => *value != 0.0,
            Value::F64(value) => *value != 0.0,
            Value::Decimal(value) => !value.is_zero(),
            Value::String(value) => !value.is_empty(),
            _ => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) | Value::ObjectId(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I16(value) => Some(i64::from(*value)),
            Value::I32(value) => Some(i64::from(*value)),
            Value::I64(value) => Some(*value),
            Value::U32(value) => Some(i64::from(*value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Document> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Bytes(bytes) => write!(f, "{}", STANDARD.encode(bytes)),
            Value::I16(value) => write!(f, "{value}"),
            Value::I32(value) => write!(f, "{value}"),
            Value::I64(value) => write!(f, "{value}"),
            Value::U32(value) => write!(f, "{value}"),
            Value::F32(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::String(value) | Value::ObjectId(value) => write!(f, "{value}"),
            Value::Date(value) => write!(f, "{value}"),
            Value::Time(value) => write!(f, "{value}"),
            Value::DateTime(value) => write!(f, "{value}"),
            Value::Uuid(value) => write!(f, "{value}"),
            Value::Array(_) | Value::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(value) => serializer.serialize_bool(value),
            Value::Bytes(ref value) => serializer.serialize_str(&STANDARD.encode(value)),
            Value::I16(value) => serializer.serialize_i16(value),
            Value::I32(value) => serializer.serialize_i32(value),
            Value::I64(value) => serializer.serialize_i64(value),
            Value::U32(value) => serializer.serialize_u32(value),
            Value::F32(value) => serializer.serialize_f32(value),
            Value::F64(value) => serializer.serialize_f64(value),
            Value::Decimal(value) => serializer.serialize_str(&value.to_string()),
            Value::String(ref value) | Value::ObjectId(ref value) => {
                serializer.serialize_str(value)
            }
            Value::Date(value) => serializer.serialize_str(&value.to_string()),
            Value::Time(value) => serializer.serialize_str(&value.to_string()),
            Value::DateTime(value) => serializer.serialize_str(&value.to_string()),
            Value::Uuid(value) => serializer.serialize_str(&value.to_string()),
            Value::Array(ref values) => {
                let mut sequence = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    sequence.serialize_element(value)?;
                }
                sequence.end()
            }
            Value::Map(ref values) => {
                let mut map = serializer.serialize_map(Some(values.len()))?;
                for (key, value) in values {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<Option<Value>> for Value {
    fn from(value: Option<Value>) -> Self {
        value.unwrap_or(Value::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::I16(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::U32(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Value::I64(value),
            Err(_) => Value::Decimal(Decimal::from(value)),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(value: chrono::NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(value: chrono::NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(value: chrono::NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Map(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(value) => {
                if let Some(value) = value.as_i64() {
                    Value::I64(value)
                } else if let Some(value) = value.as_u64() {
                    Value::from(value)
                } else {
                    Value::F64(value.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(value) => Value::String(value),
            serde_json::Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(values) => Value::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::I64(42).to_string(), "42");
        assert_eq!(Value::F64(1.5).to_string(), "1.5");
        assert_eq!(Value::String("foo".to_string()).to_string(), "foo");
        assert_eq!(
            Value::ObjectId("5f1d7f0b2c8b4a0012345678".to_string()).to_string(),
            "5f1d7f0b2c8b4a0012345678"
        );
        assert_eq!(Value::Bytes(b"foo".to_vec()).to_string(), "Zm9v");
    }

    #[test]
    fn test_display_nested() {
        let mut map = Document::new();
        map.insert("a".to_string(), Value::I64(1));
        map.insert(
            "b".to_string(),
            Value::Array(vec![Value::from("x"), Value::Null]),
        );
        assert_eq!(Value::Map(map).to_string(), r#"{"a":1,"b":["x",null]}"#);
    }

    #[test]
    fn test_to_formatted_string() {
        let locale = Locale::en;
        assert_eq!(Value::I64(12345).to_formatted_string(&locale), "12,345");
        assert_eq!(Value::U32(1000).to_formatted_string(&locale), "1,000");
        assert_eq!(Value::from("12345").to_formatted_string(&locale), "12345");
    }

    #[test]
    fn test_is_numeric() {
        assert!(Value::I16(1).is_numeric());
        assert!(Value::F32(1.0).is_numeric());
        assert!(Value::Decimal(Decimal::from_str("1.25").unwrap_or_default()).is_numeric());
        assert!(!Value::from("1").is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn test_is_truthy() {
        assert!(Value::I64(1).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::I64(0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_serialize() -> anyhow::Result<()> {
        let mut map = Document::new();
        map.insert("_id".to_string(), Value::ObjectId("abc".to_string()));
        map.insert(
            "date".to_string(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default()),
        );
        map.insert(
            "time".to_string(),
            Value::Time(NaiveTime::from_hms_opt(1, 2, 3).unwrap_or_default()),
        );
        map.insert("bytes".to_string(), Value::Bytes(b"foo".to_vec()));
        let json = serde_json::to_string(&Value::Map(map))?;
        assert_eq!(
            json,
            r#"{"_id":"abc","date":"2024-01-02","time":"01:02:03","bytes":"Zm9v"}"#
        );
        Ok(())
    }

    #[test]
    fn test_from_serde_json() {
        let json = serde_json::json!({"a": [1, 2.5, "x"], "b": null, "c": true});
        let value = Value::from(json);
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(
            map.get("a"),
            Some(&Value::Array(vec![
                Value::I64(1),
                Value::F64(2.5),
                Value::from("x")
            ]))
        );
        assert_eq!(map.get("b"), Some(&Value::Null));
        assert_eq!(map.get("c"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_from_u64() {
        assert_eq!(Value::from(42u64), Value::I64(42));
        assert!(matches!(Value::from(u64::MAX), Value::Decimal(_)));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("foo").as_str(), Some("foo"));
        assert_eq!(Value::I32(7).as_i64(), Some(7));
        assert_eq!(Value::Null.as_i64(), None);
        assert!(Value::Map(Document::new()).as_map().is_some());
        assert!(Value::Array(vec![]).is_nested());
    }
}
