use crate::error::{MysqlError, MysqlResult};
use serde_json::{Map, Value};
use sqlx::mysql::{MySqlRow, MySqlTypeInfo};
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Convert a MySQL row into a JSON object keyed by column name.
pub fn convert_row(row: &MySqlRow) -> MysqlResult<Value> {
    let mut obj = Map::with_capacity(row.len());
    for column in row.columns() {
        let idx = column.ordinal();
        let value = extract_column(row, idx, column.type_info())?;
        obj.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(obj))
}

fn extract_column(row: &MySqlRow, idx: usize, type_info: &MySqlTypeInfo) -> MysqlResult<Value> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_info.name() {
        "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" => {
            let v: i8 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as i64))
        }
        "SMALLINT" => {
            let v: i16 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as i64))
        }
        "INT" | "MEDIUMINT" => {
            let v: i32 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as i64))
        }
        "BIGINT" => {
            let v: i64 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v))
        }
        "TINYINT UNSIGNED" => {
            let v: u8 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as u64))
        }
        "SMALLINT UNSIGNED" => {
            let v: u16 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as u64))
        }
        "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => {
            let v: u32 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as u64))
        }
        "BIGINT UNSIGNED" => {
            let v: u64 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v))
        }
        "FLOAT" => {
            let v: f32 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from_f64(v as f64).ok_or_else(|| {
                MysqlError::ExecutionFailed("Invalid f32 value".to_string())
            })?)
        }
        "DOUBLE" => {
            let v: f64 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from_f64(v).ok_or_else(|| {
                MysqlError::ExecutionFailed("Invalid f64 value".to_string())
            })?)
        }
        // NEWDECIMAL is textual on the wire, so the unchecked string decode
        // is the lossless path here
        "DECIMAL" => Value::String(row.try_get_unchecked::<String, _>(idx)?),
        "YEAR" => {
            let v: u16 = row.try_get(idx)?;
            Value::Number(serde_json::Number::from(v as u64))
        }
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            Value::String(row.try_get::<String, _>(idx)?)
        }
        "DATETIME" => {
            let ts = row.try_get::<chrono::NaiveDateTime, _>(idx)?;
            Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        "TIMESTAMP" => {
            let ts = row.try_get::<chrono::DateTime<chrono::Utc>, _>(idx)?;
            Value::String(ts.to_rfc3339())
        }
        "DATE" => {
            let date = row.try_get::<chrono::NaiveDate, _>(idx)?;
            Value::String(date.to_string())
        }
        "TIME" => {
            let time = row.try_get::<chrono::NaiveTime, _>(idx)?;
            Value::String(time.format("%H:%M:%S%.f").to_string())
        }
        "JSON" => row.try_get::<Value, _>(idx)?,
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            let bytes: Vec<u8> = row.try_get(idx)?;
            Value::String(bytes_to_hex(&bytes))
        }
        _ => match row.try_get_unchecked::<String, _>(idx) {
            Ok(text) => Value::String(text),
            Err(_) => {
                let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
                Value::String(bytes_to_hex(&bytes))
            }
        },
    };

    Ok(value)
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push_str("0x");
    for byte in bytes {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}
