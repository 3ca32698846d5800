use serde_json::{Map, Value};
use std::io;

use super::{display_scalar, primary_rows};

/// Write output as CSV to stdout.
///
/// A result holding a table (a schedule, a list of options, a series) is
/// written as that table; anything else becomes two-column field/value.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => match primary_rows(map) {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&display_scalar(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        if val.is_array() || val.is_object() {
            continue;
        }
        let _ = wtr.write_record([key.as_str(), &display_scalar(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&display_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .map(|(k, _)| k.as_str())
        .collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(display_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render_rows(arr: &[Value]) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, arr);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_rows_skip_nested_columns_and_round() {
        let rows = vec![json!({"balance": "99.999", "month": 1, "nested": {"a": 1}})];
        assert_eq!(render_rows(&rows), "balance,month\n100.00,1\n");
    }

    #[test]
    fn test_fields_skip_tables() {
        let map = json!({"emi": "10.00", "schedule": [{"month": 1}]});
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_fields(&mut wtr, map.as_object().unwrap());
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text, "field,value\nemi,10.00\n");
    }
}
