//! Unit file types and rendering
//!
//! Typed .service and .slice units, rendered to INI-style text, plus the
//! parser used to read that text back.

mod parser;
mod service;
mod slice;
mod unit;

pub use parser::{first_value, parse_file, parse_with_sections, ParseError, ParsedFile, ParsedSection};
pub use service::*;
pub use slice::SliceUnit;
pub use unit::Unit;

/// Directives whose value is a command split over continuation lines
const COMMAND_KEYS: &[&str] = &["ExecStart", "ExecStop", "ExecStopPost"];

/// Whether `value` can be written after `Key=` without starting a new
/// line or joining the next one
pub fn is_single_line_value(value: &str) -> bool {
    !value.chars().any(char::is_control) && !value.ends_with('\\')
}

/// Render comment lines followed by each non-empty section, in order
fn render(comments: &[String], sections: &[(&str, Vec<(&'static str, String)>)]) -> String {
    let mut text = String::new();

    if !comments.is_empty() {
        text.push_str("#\n");
        for line in comments {
            text.push_str("#  ");
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("#\n\n");
    }

    for (name, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        text.push('[');
        text.push_str(name);
        text.push_str("]\n");
        for (key, value) in entries {
            text.push_str(key);
            text.push('=');
            text.push_str(value);
            text.push('\n');
        }
        text.push('\n');
    }

    text
}

/// Check every directive value of `unit`, then read the rendered text
/// back and check the sections the unit type requires
pub fn verify(unit: &Unit, text: &str) -> Result<ParsedFile, ParseError> {
    for (_, entries) in unit.sections() {
        for (key, value) in entries {
            let valid = if COMMAND_KEYS.contains(&key) {
                value.split(" \\\n  ").all(is_single_line_value)
            } else {
                is_single_line_value(&value)
            };
            if !valid {
                return Err(ParseError::InvalidValue {
                    key: key.to_string(),
                    value,
                });
            }
        }
    }
    parse_with_sections(text, unit.required_sections())
}
