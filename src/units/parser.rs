//! INI-style unit file parser
//!
//! Parses systemd unit files into structured data. Used to check that
//! generated text reads back the way a service manager would read it.

use std::collections::HashMap;

/// A section contains key-value pairs, where each key can have multiple values
/// The u32 is the order the value appeared (for stable ordering)
pub type ParsedSection = HashMap<String, Vec<(u32, String)>>;

/// A parsed unit file is a map of section names to their contents
pub type ParsedFile = HashMap<String, ParsedSection>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Section '{0}' appears more than once")]
    DuplicateSection(String),

    #[error("Required section '{0}' is missing")]
    MissingSection(String),

    #[error("Line continues past the end of the file: {0}")]
    UnterminatedContinuation(String),

    #[error("Value of {key} must be one line without a trailing backslash: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Join lines ending in a backslash with the line that follows
fn join_continuations(content: &str) -> Result<Vec<String>, ParseError> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim();
        let (body, continues) = match line.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (line, false),
        };

        let joined = match pending.take() {
            Some(mut acc) => {
                if !body.is_empty() {
                    acc.push(' ');
                    acc.push_str(body);
                }
                acc
            }
            None => body.to_string(),
        };

        if continues {
            pending = Some(joined);
        } else {
            lines.push(joined);
        }
    }

    match pending {
        Some(rest) => Err(ParseError::UnterminatedContinuation(rest)),
        None => Ok(lines),
    }
}

/// Parse a unit file from a string
pub fn parse_file(content: &str) -> Result<ParsedFile, ParseError> {
    let mut sections = HashMap::new();
    let lines = join_continuations(content)?;

    let mut lines_iter = lines.iter().map(String::as_str).peekable();

    // Skip lines before the first section
    while lines_iter.peek().map_or(false, |l| !l.starts_with('[')) {
        lines_iter.next();
    }

    // Get first section name
    let Some(first_section) = lines_iter.next() else {
        return Ok(sections); // Empty file
    };

    let mut current_section_name = first_section.to_string();
    let mut current_section_lines = Vec::new();

    for line in lines_iter {
        if line.starts_with('[') {
            // New section - store current one
            if sections.contains_key(&current_section_name) {
                return Err(ParseError::DuplicateSection(current_section_name));
            }
            sections.insert(
                current_section_name.clone(),
                parse_section(&current_section_lines),
            );
            current_section_name = line.to_string();
            current_section_lines.clear();
        } else {
            current_section_lines.push(line);
        }
    }

    // Insert last section
    if sections.contains_key(&current_section_name) {
        return Err(ParseError::DuplicateSection(current_section_name));
    }
    sections.insert(current_section_name, parse_section(&current_section_lines));

    Ok(sections)
}

/// Parse text and require each of the named sections to be present
pub fn parse_with_sections(content: &str, required: &[&str]) -> Result<ParsedFile, ParseError> {
    let parsed = parse_file(content)?;
    for section in required {
        if !parsed.contains_key(*section) {
            return Err(ParseError::MissingSection(section.to_string()));
        }
    }
    Ok(parsed)
}

/// Keys that accept space-separated multiple values
const SPACE_SEPARATED_KEYS: &[&str] = &[
    "AFTER", "BEFORE", "REQUIRES", "WANTS", "PARTOF", "WANTEDBY", "REQUIREDBY",
];

/// Parse a single section's lines into key-value pairs
fn parse_section(lines: &[&str]) -> ParsedSection {
    let mut entries: ParsedSection = HashMap::new();
    let mut entry_number = 0u32;

    for line in lines {
        // Skip comments and empty lines
        if line.starts_with('#') || line.starts_with(';') || line.is_empty() {
            continue;
        }

        // Find the = separator
        let Some(pos) = line.find('=') else {
            continue;
        };

        let (name, value) = line.split_at(pos);
        let value = value[1..].trim();
        let name = name.trim().to_uppercase();

        let values: Vec<String> = if SPACE_SEPARATED_KEYS.contains(&name.as_str()) {
            value.split_whitespace().map(|s| s.to_string()).collect()
        } else {
            vec![value.to_string()]
        };

        let vec = entries.entry(name).or_default();
        for v in values {
            if !v.is_empty() {
                vec.push((entry_number, v));
                entry_number += 1;
            }
        }
    }

    entries
}

/// First value of `key` in `section`, if present
pub fn first_value<'a>(parsed: &'a ParsedFile, section: &str, key: &str) -> Option<&'a str> {
    parsed
        .get(section)?
        .get(&key.to_uppercase())?
        .iter()
        .min_by_key(|(order, _)| *order)
        .map(|(_, v)| v.as_str())
}
