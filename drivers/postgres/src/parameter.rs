use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dbsh_driver::Error::ConversionError;
use dbsh_driver::{Result, Value};
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// A statement parameter converted to the type the server reported for its placeholder
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Parameter {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Json(serde_json::Value),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl Parameter {
    /// Convert a value for a placeholder of the given type
    ///
    /// # Errors
    /// * If the value cannot be represented as the type
    pub(crate) fn convert(value: &Value, parameter_type: &Type) -> Result<Parameter> {
        if value.is_null() {
            return Ok(Parameter::Null);
        }

        let parameter = match *parameter_type {
            Type::BOOL => match value {
                Value::Bool(value) => Parameter::Bool(*value),
                Value::String(text) => Parameter::Bool(parse(text, parameter_type)?),
                _ => return Err(mismatch(value, parameter_type)),
            },
            Type::INT2 => Parameter::I16(i16::try_from(integer(value, parameter_type)?)?),
            Type::INT4 => Parameter::I32(i32::try_from(integer(value, parameter_type)?)?),
            Type::INT8 => Parameter::I64(integer(value, parameter_type)?),
            Type::FLOAT4 => Parameter::F32(float(value, parameter_type)? as f32),
            Type::FLOAT8 => Parameter::F64(float(value, parameter_type)?),
            Type::NUMERIC => Parameter::Decimal(decimal(value, parameter_type)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Parameter::String(value.to_string())
            }
            Type::JSON | Type::JSONB => Parameter::Json(serde_json::to_value(value)?),
            Type::UUID => match value {
                Value::Uuid(uuid) => Parameter::Uuid(*uuid),
                Value::String(text) => Parameter::Uuid(parse(text, parameter_type)?),
                _ => return Err(mismatch(value, parameter_type)),
            },
            Type::DATE => match value {
                Value::Date(date) => Parameter::Date(*date),
                Value::DateTime(date_time) => Parameter::Date(date_time.date()),
                Value::String(text) => Parameter::Date(parse(text, parameter_type)?),
                _ => return Err(mismatch(value, parameter_type)),
            },
            Type::TIME => match value {
                Value::Time(time) => Parameter::Time(*time),
                Value::String(text) => Parameter::Time(parse(text, parameter_type)?),
                _ => return Err(mismatch(value, parameter_type)),
            },
            Type::TIMESTAMP => Parameter::Timestamp(timestamp(value, parameter_type)?),
            Type::TIMESTAMPTZ => Parameter::TimestampTz(timestamp(value, parameter_type)?.and_utc()),
            Type::BYTEA => match value {
                Value::Bytes(bytes) => Parameter::Bytes(bytes.clone()),
                Value::String(text) => Parameter::Bytes(text.as_bytes().to_vec()),
                _ => return Err(mismatch(value, parameter_type)),
            },
            _ => {
                return Err(ConversionError(format!(
                    "parameters of type {parameter_type} are not supported"
                )));
            }
        };
        Ok(parameter)
    }
}

impl ToSql for Parameter {
    fn to_sql(
        &self,
        parameter_type: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Parameter::Null => Ok(IsNull::Yes),
            Parameter::Bool(value) => value.to_sql(parameter_type, out),
            Parameter::I16(value) => value.to_sql(parameter_type, out),
            Parameter::I32(value) => value.to_sql(parameter_type, out),
            Parameter::I64(value) => value.to_sql(parameter_type, out),
            Parameter::F32(value) => value.to_sql(parameter_type, out),
            Parameter::F64(value) => value.to_sql(parameter_type, out),
            Parameter::Decimal(value) => value.to_sql(parameter_type, out),
            Parameter::String(value) => value.to_sql(parameter_type, out),
            Parameter::Json(value) => value.to_sql(parameter_type, out),
            Parameter::Uuid(value) => value.to_sql(parameter_type, out),
            Parameter::Date(value) => value.to_sql(parameter_type, out),
            Parameter::Time(value) => value.to_sql(parameter_type, out),
            Parameter::Timestamp(value) => value.to_sql(parameter_type, out),
            Parameter::TimestampTz(value) => value.to_sql(parameter_type, out),
            Parameter::Bytes(value) => value.to_sql(parameter_type, out),
        }
    }

    fn accepts(_parameter_type: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn mismatch(value: &Value, parameter_type: &Type) -> dbsh_driver::Error {
    ConversionError(format!("cannot convert {value} to {parameter_type}"))
}

fn parse<T: FromStr>(text: &str, parameter_type: &Type) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| ConversionError(format!("cannot convert '{text}' to {parameter_type}")))
}

fn integer(value: &Value, parameter_type: &Type) -> Result<i64> {
    match value {
        Value::String(text) => parse(text, parameter_type),
        Value::Bool(value) => Ok(i64::from(*value)),
        value => value
            .as_i64()
            .ok_or_else(|| mismatch(value, parameter_type)),
    }
}

fn float(value: &Value, parameter_type: &Type) -> Result<f64> {
    match value {
        Value::F32(value) => Ok(f64::from(*value)),
        Value::F64(value) => Ok(*value),
        Value::Decimal(value) => parse(&value.to_string(), parameter_type),
        Value::String(text) => parse(text, parameter_type),
        value => value
            .as_i64()
            .map(|value| value as f64)
            .ok_or_else(|| mismatch(value, parameter_type)),
    }
}

fn decimal(value: &Value, parameter_type: &Type) -> Result<Decimal> {
    match value {
        Value::Decimal(value) => Ok(*value),
        Value::F32(value) => parse(&value.to_string(), parameter_type),
        Value::F64(value) => parse(&value.to_string(), parameter_type),
        Value::String(text) => parse(text, parameter_type),
        value => value
            .as_i64()
            .map(Decimal::from)
            .ok_or_else(|| mismatch(value, parameter_type)),
    }
}

/// Timestamps are accepted as RFC 3339 text, `YYYY-MM-DD HH:MM:SS[.fff]` text or dates
fn timestamp(value: &Value, parameter_type: &Type) -> Result<NaiveDateTime> {
    match value {
        Value::DateTime(date_time) => Ok(*date_time),
        Value::Date(date) => Ok(date.and_time(NaiveTime::default())),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
                return Ok(date_time.naive_utc());
            }
            if let Ok(date_time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
                return Ok(date_time);
            }
            if let Ok(date_time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(date_time);
            }
            let date: NaiveDate = parse(text, parameter_type)?;
            Ok(date.and_time(NaiveTime::default()))
        }
        _ => Err(mismatch(value, parameter_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null() -> anyhow::Result<()> {
        assert_eq!(Parameter::convert(&Value::Null, &Type::INT4)?, Parameter::Null);
        Ok(())
    }

    #[test]
    fn test_integers() -> anyhow::Result<()> {
        assert_eq!(
            Parameter::convert(&Value::I64(42), &Type::INT2)?,
            Parameter::I16(42)
        );
        assert_eq!(
            Parameter::convert(&Value::from("42"), &Type::INT4)?,
            Parameter::I32(42)
        );
        assert_eq!(
            Parameter::convert(&Value::I32(7), &Type::INT8)?,
            Parameter::I64(7)
        );
        assert!(Parameter::convert(&Value::I64(i64::MAX), &Type::INT2).is_err());
        assert!(Parameter::convert(&Value::from("forty"), &Type::INT4).is_err());
        Ok(())
    }

    #[test]
    fn test_floats_and_numeric() -> anyhow::Result<()> {
        assert_eq!(
            Parameter::convert(&Value::I64(2), &Type::FLOAT8)?,
            Parameter::F64(2.0)
        );
        assert_eq!(
            Parameter::convert(&Value::F64(1.5), &Type::FLOAT4)?,
            Parameter::F32(1.5)
        );
        assert_eq!(
            Parameter::convert(&Value::from("12.50"), &Type::NUMERIC)?,
            Parameter::Decimal(Decimal::new(1250, 2))
        );
        assert_eq!(
            Parameter::convert(&Value::I64(3), &Type::NUMERIC)?,
            Parameter::Decimal(Decimal::from(3))
        );
        Ok(())
    }

    #[test]
    fn test_text() -> anyhow::Result<()> {
        assert_eq!(
            Parameter::convert(&Value::from("foo"), &Type::TEXT)?,
            Parameter::String("foo".to_string())
        );
        assert_eq!(
            Parameter::convert(&Value::I64(5), &Type::VARCHAR)?,
            Parameter::String("5".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_bool() -> anyhow::Result<()> {
        assert_eq!(
            Parameter::convert(&Value::Bool(true), &Type::BOOL)?,
            Parameter::Bool(true)
        );
        assert_eq!(
            Parameter::convert(&Value::from("false"), &Type::BOOL)?,
            Parameter::Bool(false)
        );
        assert!(Parameter::convert(&Value::I64(1), &Type::BOOL).is_err());
        Ok(())
    }

    #[test]
    fn test_json() -> anyhow::Result<()> {
        let mut document = dbsh_driver::Document::new();
        document.insert("a".to_string(), Value::I64(1));
        assert_eq!(
            Parameter::convert(&Value::Map(document), &Type::JSONB)?,
            Parameter::Json(serde_json::json!({"a": 1}))
        );
        Ok(())
    }

    #[test]
    fn test_dates_and_times() -> anyhow::Result<()> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or(anyhow::anyhow!("date"))?;
        let date_time = date
            .and_hms_opt(12, 30, 0)
            .ok_or(anyhow::anyhow!("date time"))?;

        assert_eq!(
            Parameter::convert(&Value::from("2024-01-31"), &Type::DATE)?,
            Parameter::Date(date)
        );
        assert_eq!(
            Parameter::convert(&Value::from("2024-01-31 12:30:00"), &Type::TIMESTAMP)?,
            Parameter::Timestamp(date_time)
        );
        assert_eq!(
            Parameter::convert(&Value::from("2024-01-31T12:30:00Z"), &Type::TIMESTAMPTZ)?,
            Parameter::TimestampTz(date_time.and_utc())
        );
        assert_eq!(
            Parameter::convert(&Value::Date(date), &Type::TIMESTAMP)?,
            Parameter::Timestamp(date.and_time(NaiveTime::default()))
        );
        assert!(Parameter::convert(&Value::from("yesterday"), &Type::DATE).is_err());
        Ok(())
    }

    #[test]
    fn test_uuid() -> anyhow::Result<()> {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8")?;
        assert_eq!(
            Parameter::convert(&Value::from(uuid.to_string()), &Type::UUID)?,
            Parameter::Uuid(uuid)
        );
        Ok(())
    }

    #[test]
    fn test_unsupported_type() {
        let result = Parameter::convert(&Value::I64(1), &Type::INTERVAL);
        assert!(result.is_err());
    }
}
