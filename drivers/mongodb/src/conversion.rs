use bson::oid::ObjectId;
use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document as BsonDocument};
use chrono::NaiveTime;
use dbsh_driver::{Document, Value};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

/// Convert a BSON value to a shell value
pub(crate) fn bson_to_value(bson: &Bson) -> Value {
    match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(value) => Value::Bool(*value),
        Bson::Int32(value) => Value::I32(*value),
        Bson::Int64(value) => Value::I64(*value),
        Bson::Double(value) => Value::F64(*value),
        Bson::String(value) | Bson::Symbol(value) | Bson::JavaScriptCode(value) => {
            Value::String(value.clone())
        }
        Bson::ObjectId(oid) => Value::ObjectId(oid.to_hex()),
        Bson::DateTime(date_time) => Value::DateTime(date_time.to_chrono().naive_utc()),
        Bson::Binary(binary) => match binary.subtype {
            BinarySubtype::Uuid | BinarySubtype::UuidOld => {
                match uuid::Uuid::from_slice(&binary.bytes) {
                    Ok(uuid) => Value::Uuid(uuid),
                    Err(_) => Value::Bytes(binary.bytes.clone()),
                }
            }
            _ => Value::Bytes(binary.bytes.clone()),
        },
        Bson::Array(values) => Value::Array(values.iter().map(bson_to_value).collect()),
        Bson::Document(document) => Value::Map(bson_to_document(document)),
        Bson::Decimal128(decimal) => {
            let text = decimal.to_string();
            match Decimal::from_str(&text) {
                Ok(decimal) => Value::Decimal(decimal),
                Err(_) => Value::String(text),
            }
        }
        Bson::RegularExpression(regex) => {
            Value::String(format!("/{}/{}", regex.pattern, regex.options))
        }
        Bson::JavaScriptCodeWithScope(code) => Value::String(code.code.clone()),
        Bson::Timestamp(timestamp) => {
            let mut document = Document::new();
            document.insert("t".to_string(), Value::U32(timestamp.time));
            document.insert("i".to_string(), Value::U32(timestamp.increment));
            Value::Map(document)
        }
        Bson::MaxKey => Value::String("MaxKey".to_string()),
        Bson::MinKey => Value::String("MinKey".to_string()),
        Bson::DbPointer(_) => Value::String("DBPointer".to_string()),
    }
}

pub(crate) fn bson_to_document(document: &BsonDocument) -> Document {
    document
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_value(value)))
        .collect()
}

/// Convert a shell value to a BSON value.  `{"$oid": "..."}` documents become object ids.
pub(crate) fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(value) => Bson::Boolean(*value),
        Value::Bytes(bytes) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.clone(),
        }),
        Value::I16(value) => Bson::Int32(i32::from(*value)),
        Value::I32(value) => Bson::Int32(*value),
        Value::I64(value) => Bson::Int64(*value),
        Value::U32(value) => Bson::Int64(i64::from(*value)),
        Value::F32(value) => Bson::Double(f64::from(*value)),
        Value::F64(value) => Bson::Double(*value),
        Value::Decimal(value) => match value.to_f64() {
            Some(value) => Bson::Double(value),
            None => Bson::String(value.to_string()),
        },
        Value::String(value) => Bson::String(value.clone()),
        Value::Date(date) => {
            let date_time = date.and_time(NaiveTime::default()).and_utc();
            Bson::DateTime(bson::DateTime::from_chrono(date_time))
        }
        Value::Time(time) => Bson::String(time.to_string()),
        Value::DateTime(date_time) => {
            Bson::DateTime(bson::DateTime::from_chrono(date_time.and_utc()))
        }
        Value::Uuid(uuid) => Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }),
        Value::ObjectId(hex) => match ObjectId::parse_str(hex) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(hex.clone()),
        },
        Value::Array(values) => Bson::Array(values.iter().map(value_to_bson).collect()),
        Value::Map(document) => {
            if let Some(oid) = extended_object_id(document) {
                return Bson::ObjectId(oid);
            }
            Bson::Document(document_to_bson(document))
        }
    }
}

pub(crate) fn document_to_bson(document: &Document) -> BsonDocument {
    let mut bson_document = BsonDocument::new();
    for (key, value) in document {
        bson_document.insert(key.clone(), value_to_bson(value));
    }
    bson_document
}

fn extended_object_id(document: &Document) -> Option<ObjectId> {
    if document.len() != 1 {
        return None;
    }
    let hex = document.get("$oid")?.as_str()?;
    ObjectId::parse_str(hex).ok()
}

/// Name of the BSON type as used by the `$type` query operator
pub(crate) fn bson_type_name(bson: &Bson) -> &'static str {
    match bson {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::Binary(_) => "binData",
        Bson::Undefined => "undefined",
        Bson::ObjectId(_) => "objectId",
        Bson::Boolean(_) => "bool",
        Bson::DateTime(_) => "date",
        Bson::Null => "null",
        Bson::RegularExpression(_) => "regex",
        Bson::DbPointer(_) => "dbPointer",
        Bson::JavaScriptCode(_) => "javascript",
        Bson::Symbol(_) => "symbol",
        Bson::JavaScriptCodeWithScope(_) => "javascriptWithScope",
        Bson::Int32(_) => "int",
        Bson::Timestamp(_) => "timestamp",
        Bson::Int64(_) => "long",
        Bson::Decimal128(_) => "decimal",
        Bson::MinKey => "minKey",
        Bson::MaxKey => "maxKey",
    }
}
