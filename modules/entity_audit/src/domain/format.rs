//! Rendering of column values into audit trail strings

use super::schema::ValueFormat;
use base64::Engine;
use chrono::SecondsFormat;
use sea_orm::Value;

/// Recorded in place of values of properties audited with hidden changes
pub const HIDDEN_VALUE_PLACEHOLDER: &str = "*****";

/// Render a value; SQL NULL renders as `None`
pub fn format_value(value: &Value, format: ValueFormat) -> Option<String> {
    match format {
        ValueFormat::Standard => format_standard(value),
        ValueFormat::Decimals(places) => {
            format_decimals(value, places).or_else(|| format_standard(value))
        }
        ValueFormat::DateTime(pattern) => {
            format_datetime(value, pattern).or_else(|| format_standard(value))
        }
        ValueFormat::Custom(render) => render(value),
    }
}

fn format_standard(value: &Value) -> Option<String> {
    match value {
        Value::Bool(v) => v.map(|b| b.to_string()),
        Value::TinyInt(v) => v.map(|n| n.to_string()),
        Value::SmallInt(v) => v.map(|n| n.to_string()),
        Value::Int(v) => v.map(|n| n.to_string()),
        Value::BigInt(v) => v.map(|n| n.to_string()),
        Value::TinyUnsigned(v) => v.map(|n| n.to_string()),
        Value::SmallUnsigned(v) => v.map(|n| n.to_string()),
        Value::Unsigned(v) => v.map(|n| n.to_string()),
        Value::BigUnsigned(v) => v.map(|n| n.to_string()),
        Value::Float(v) => v.map(|n| n.to_string()),
        Value::Double(v) => v.map(|n| n.to_string()),
        Value::Char(v) => v.map(|c| c.to_string()),
        Value::String(v) => v.as_ref().map(|s| s.to_string()),
        Value::Bytes(v) => v
            .as_ref()
            .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes.as_slice())),
        Value::Json(v) => v.as_ref().map(|json| json.to_string()),
        Value::Uuid(v) => v.as_ref().map(|id| id.to_string()),
        Value::Decimal(v) => v.as_ref().map(|d| d.to_string()),
        Value::ChronoDate(v) => v.as_ref().map(|d| d.format("%Y-%m-%d").to_string()),
        Value::ChronoTime(v) => v.as_ref().map(|t| t.format("%H:%M:%S%.f").to_string()),
        Value::ChronoDateTime(v) => v
            .as_ref()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::ChronoDateTimeUtc(v) => v
            .as_ref()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::ChronoDateTimeLocal(v) => v
            .as_ref()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        Value::ChronoDateTimeWithTimeZone(v) => v
            .as_ref()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        #[allow(unreachable_patterns)]
        other => Some(format!("{:?}", other)),
    }
}

fn format_decimals(value: &Value, places: usize) -> Option<String> {
    match value {
        Value::Float(Some(n)) => Some(format!("{:.*}", places, n)),
        Value::Double(Some(n)) => Some(format!("{:.*}", places, n)),
        Value::Decimal(Some(d)) => Some(format!("{:.*}", places, d)),
        _ => None,
    }
}

fn format_datetime(value: &Value, pattern: &str) -> Option<String> {
    match value {
        Value::ChronoDate(Some(d)) => Some(d.format(pattern).to_string()),
        Value::ChronoDateTime(Some(dt)) => Some(dt.format(pattern).to_string()),
        Value::ChronoDateTimeUtc(Some(dt)) => Some(dt.format(pattern).to_string()),
        Value::ChronoDateTimeLocal(Some(dt)) => Some(dt.format(pattern).to_string()),
        Value::ChronoDateTimeWithTimeZone(Some(dt)) => Some(dt.format(pattern).to_string()),
        _ => None,
    }
}

/// Integer view of a key value
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::TinyInt(v) => v.map(i64::from),
        Value::SmallInt(v) => v.map(i64::from),
        Value::Int(v) => v.map(i64::from),
        Value::BigInt(v) => *v,
        Value::TinyUnsigned(v) => v.map(i64::from),
        Value::SmallUnsigned(v) => v.map(i64::from),
        Value::Unsigned(v) => v.map(i64::from),
        Value::BigUnsigned(v) => v.and_then(|n| i64::try_from(n).ok()),
        _ => None,
    }
}
