use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_scalar, primary_rows};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                println!("{}", fields_table(map));
            }
        }
        Value::Array(arr) => {
            println!("{}", rows_table(arr));
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_sections(None, res_map),
        Value::Array(arr) => println!("{}", rows_table(arr)),
        other => println!("{}", display_scalar(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalar fields first, then one section per nested object, then the
/// main table (schedule, options, series).
fn print_sections(title: Option<&str>, map: &Map<String, Value>) {
    if let Some(t) = title {
        println!("\n{}:", t);
    }
    println!("{}", fields_table(map));

    for (key, val) in map {
        if let Value::Object(nested) = val {
            print_sections(Some(key), nested);
        }
    }

    if let Some((key, rows)) = primary_rows(map) {
        println!("\n{} ({} rows):", key, rows.len());
        println!("{}", rows_table(rows));
    }
}

fn fields_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Object(_) => continue,
            Value::Array(arr) if arr.first().map_or(false, Value::is_object) => {
                builder.push_record([key.clone(), format!("[{} rows]", arr.len())]);
            }
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(display_scalar).collect();
                builder.push_record([key.clone(), items.join(", ")]);
            }
            _ => builder.push_record([key.clone(), display_scalar(val)]),
        }
    }
    builder.build()
}

fn rows_table(arr: &[Value]) -> Table {
    let mut builder = Builder::default();

    match arr.first() {
        Some(Value::Object(first)) => {
            let headers: Vec<String> = first
                .iter()
                .filter(|(_, v)| !v.is_array() && !v.is_object())
                .map(|(k, _)| k.clone())
                .collect();
            builder.push_record(headers.clone());

            for item in arr {
                if let Value::Object(map) = item {
                    let row: Vec<String> = headers
                        .iter()
                        .map(|h| map.get(h.as_str()).map(display_scalar).unwrap_or_default())
                        .collect();
                    builder.push_record(row);
                }
            }
        }
        Some(_) => {
            builder.push_record(["value"]);
            for item in arr {
                builder.push_record([display_scalar(item)]);
            }
        }
        None => builder.push_record(["(empty)"]),
    }

    builder.build()
}
