pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Render a scalar for human-facing output. Decimal strings carrying more
/// than 2 places (full-precision schedule values) are rounded to 2.
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) if d.scale() > 2 => finbuddy_core::format_money(d),
            _ => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The first array of objects in `map`, preferring `schedule`.
pub fn primary_rows(map: &serde_json::Map<String, Value>) -> Option<(&str, &Vec<Value>)> {
    let is_rows = |v: &Value| matches!(v, Value::Array(a) if a.first().map_or(false, Value::is_object));

    if let Some(schedule) = map.get("schedule") {
        if let Value::Array(arr) = schedule {
            if is_rows(schedule) {
                return Some(("schedule", arr));
            }
        }
    }
    map.iter().find_map(|(k, v)| match v {
        Value::Array(arr) if is_rows(v) => Some((k.as_str(), arr)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_scalar_rounds_long_decimals() {
        assert_eq!(display_scalar(&json!("3541.666666666666666")), "3541.67");
        assert_eq!(display_scalar(&json!("4339.12")), "4339.12");
        assert_eq!(display_scalar(&json!("years")), "years");
        assert_eq!(display_scalar(&json!(240)), "240");
        assert_eq!(display_scalar(&Value::Null), "");
    }

    #[test]
    fn test_primary_rows_prefers_schedule() {
        let map = json!({
            "balance_series": [{"month": 1}],
            "schedule": [{"month": 1, "interest": "1"}],
        });
        let (key, rows) = primary_rows(map.as_object().unwrap()).unwrap();
        assert_eq!(key, "schedule");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_primary_rows_none_for_scalars() {
        let map = json!({"emi": "10", "tags": ["a"]});
        assert!(primary_rows(map.as_object().unwrap()).is_none());
    }
}
