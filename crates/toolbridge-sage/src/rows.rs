use crate::error::SageResult;
use serde_json::{Map, Value};
use tiberius::{ColumnData, FromSql, Row};

/// Convert an MSSQL row into a JSON object keyed by column name.
pub fn convert_row(row: &Row) -> SageResult<Value> {
    let mut obj = Map::with_capacity(row.columns().len());
    for (column, data) in row.cells() {
        obj.insert(column.name().to_string(), cell_to_json(data)?);
    }
    Ok(Value::Object(obj))
}

fn cell_to_json(data: &ColumnData<'static>) -> SageResult<Value> {
    let value = match data {
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::U8(v) => v.map(|n| Value::Number(serde_json::Number::from(n as i64))),
        ColumnData::I16(v) => v.map(|n| Value::Number(serde_json::Number::from(n as i64))),
        ColumnData::I32(v) => v.map(|n| Value::Number(serde_json::Number::from(n as i64))),
        ColumnData::I64(v) => v.map(|n| Value::Number(serde_json::Number::from(n))),
        ColumnData::F32(v) => {
            v.and_then(|n| serde_json::Number::from_f64(n as f64)).map(Value::Number)
        }
        ColumnData::F64(v) => v.and_then(serde_json::Number::from_f64).map(Value::Number),
        // DECIMAL/NUMERIC/MONEY render textually so precision survives
        ColumnData::Numeric(v) => v.map(|n| Value::String(n.to_string())),
        ColumnData::String(v) => v.as_deref().map(|s| Value::String(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| Value::String(g.to_string())),
        ColumnData::Binary(v) => v.as_deref().map(|b| Value::String(bytes_to_hex(b))),
        ColumnData::Xml(v) => v.as_deref().map(|x| Value::String(x.to_string())),
        ColumnData::Date(_) => {
            chrono::NaiveDate::from_sql(data)?.map(|d| Value::String(d.to_string()))
        }
        ColumnData::Time(_) => chrono::NaiveTime::from_sql(data)?
            .map(|t| Value::String(t.format("%H:%M:%S%.f").to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            chrono::NaiveDateTime::from_sql(data)?
                .map(|ts| Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        }
        ColumnData::DateTimeOffset(_) => chrono::DateTime::<chrono::Utc>::from_sql(data)?
            .map(|ts| Value::String(ts.to_rfc3339())),
    };

    Ok(value.unwrap_or(Value::Null))
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::borrow::Cow;

    #[test]
    fn scalar_cells_map_to_json() {
        assert_eq!(cell_to_json(&ColumnData::I32(Some(7))).unwrap(), json!(7));
        assert_eq!(cell_to_json(&ColumnData::Bit(Some(true))).unwrap(), json!(true));
        assert_eq!(cell_to_json(&ColumnData::F64(Some(1.5))).unwrap(), json!(1.5));
        assert_eq!(
            cell_to_json(&ColumnData::String(Some(Cow::Borrowed("SALES_LEDGER")))).unwrap(),
            json!("SALES_LEDGER")
        );
    }

    #[test]
    fn null_cells_map_to_json_null() {
        assert_eq!(cell_to_json(&ColumnData::I64(None)).unwrap(), Value::Null);
        assert_eq!(cell_to_json(&ColumnData::String(None)).unwrap(), Value::Null);
        assert_eq!(cell_to_json(&ColumnData::Numeric(None)).unwrap(), Value::Null);
    }

    #[test]
    fn numeric_keeps_scale_as_text() {
        let numeric = tiberius::numeric::Numeric::new_with_scale(123456, 2);
        assert_eq!(cell_to_json(&ColumnData::Numeric(Some(numeric))).unwrap(), json!("1234.56"));
    }

    #[test]
    fn guid_renders_hyphenated() {
        let cell = ColumnData::Guid(Some(tiberius::Uuid::nil()));
        assert_eq!(
            cell_to_json(&cell).unwrap(),
            json!("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn binary_renders_as_hex() {
        let cell = ColumnData::Binary(Some(Cow::Owned(vec![0xde, 0xad, 0x01])));
        assert_eq!(cell_to_json(&cell).unwrap(), json!("0xdead01"));
    }
}
