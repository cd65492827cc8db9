use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Arrays of objects become one row per item; a single object becomes
/// key/value rows; nested arrays in an object are rendered as their own
/// table under the key.
fn render_table(value: &Value) -> anyhow::Result<String> {
    let prefs = ui::prefs();
    let options = table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    };

    match value {
        Value::Array(items) => Ok(array_table(items, options)),
        Value::Object(map) => {
            let mut scalars = Vec::new();
            let mut sections = Vec::new();
            for (key, value) in map {
                match value {
                    Value::Array(items) => {
                        sections.push(format!("{key}:\n{}", array_table(items, options)));
                    }
                    Value::Object(inner) => {
                        for (inner_key, inner_value) in inner {
                            scalars.push(vec![format!("{key}.{inner_key}"), cell(inner_value)]);
                        }
                    }
                    scalar => scalars.push(vec![key.clone(), cell(scalar)]),
                }
            }
            let mut parts = Vec::new();
            if !scalars.is_empty() {
                parts.push(table::render_table(&["key", "value"], &scalars, options));
            }
            parts.extend(sections);
            Ok(parts.join("\n\n"))
        }
        scalar => Ok(table::render_table(&["value"], &[vec![cell(scalar)]], options)),
    }
}

fn array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    // Column order follows the first object, then any keys seen later.
    let mut headers: Vec<&str> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        let rows: Vec<Vec<String>> = items.iter().map(|v| vec![cell(v)]).collect();
        return table::render_table(&["value"], &rows, options);
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|h| item.get(*h).map_or_else(|| String::from("-"), cell))
                .collect()
        })
        .collect();
    table::render_table(&headers, &rows, options)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
