//! Rendering of extracted outputs as text or JSON.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{error::Error, extract::OutputMap, plain::UNKNOWN_SENTINEL};

/// How an unknown value is shown in text output.
pub const UNKNOWN_DISPLAY: &str = "[unknown]";

const INDENT: &str = "    ";
const OUTPUT_HEADER: &str = "OUTPUT";
const VALUE_HEADER: &str = "VALUE";

/// Renders either the whole output map or the single output named by
/// `selector`.
///
/// Text listings are sorted by key so repeated runs produce identical bytes.
/// JSON documents keep the recorded order. Rendered output always ends with a
/// newline.
pub fn present(outputs: &OutputMap, selector: Option<&str>, as_json: bool) -> Result<String, Error> {
    match selector {
        Some(name) => {
            let value = outputs.get(name).ok_or_else(|| Error::UnknownOutput {
                name: name.to_string(),
            })?;
            if as_json {
                pretty_json(value)
            } else {
                Ok(format!("{}\n", stringify(value)))
            }
        }
        None if as_json => pretty_json(outputs),
        None => Ok(listing(outputs)),
    }
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Single-line text form of one value: strings verbatim, everything else as
/// compact JSON.
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) if s == UNKNOWN_SENTINEL => UNKNOWN_DISPLAY.to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn listing(outputs: &OutputMap) -> String {
    let mut rendered = format!("Current stack outputs ({}):\n", outputs.len());
    if outputs.is_empty() {
        rendered.push_str(INDENT);
        rendered.push_str("No output values currently in this stack\n");
        return rendered;
    }

    let mut keys: Vec<&String> = outputs.keys().collect();
    keys.sort();
    let width = keys
        .iter()
        .map(|key| key.chars().count())
        .chain(std::iter::once(OUTPUT_HEADER.len()))
        .max()
        .unwrap_or_default();

    // Writing into a String cannot fail.
    let _ = writeln!(rendered, "{INDENT}{OUTPUT_HEADER:<width$}  {VALUE_HEADER}");
    for key in keys {
        let _ = writeln!(rendered, "{INDENT}{key:<width$}  {}", stringify(&outputs[key.as_str()]));
    }
    rendered
}
