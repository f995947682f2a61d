//! Line-oriented dotenv decoding and encoding.

use super::FlatMap;

/// Decodes dotenv text into a flat map.
///
/// Blank lines and `#` comments are skipped. A single leading `export `
/// token is stripped. Keys are restricted to identifier characters;
/// non-matching lines are ignored. Double-quoted values have their quotes
/// stripped and `\"` unescaped; single-quoted values are stripped verbatim;
/// anything else is taken literally.
pub fn decode(text: &str) -> FlatMap {
    let mut env = FlatMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = match line.strip_prefix("export") {
            Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
            _ => line,
        };

        let Some(eq) = line.find('=') else { continue };
        let key = line[..eq].trim_end();
        if !is_identifier(key) {
            continue;
        }

        let raw = line[eq + 1..].trim_start();
        env.insert(key.to_string(), unquote(raw));
    }

    env
}

/// Encodes a flat map as dotenv text, one `KEY=VALUE` line per pair in
/// iteration order.
pub fn encode(data: &FlatMap) -> String {
    let mut out = String::new();
    for (key, value) in data {
        out.push_str(key);
        out.push('=');
        out.push_str(&escape_value(value));
        out.push('\n');
    }
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].replace("\\\"", "\"")
    } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

/// Quotes a value when it contains whitespace, a quote character, or `#`.
/// Empty values render as `""` so the line survives a re-parse.
fn escape_value(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }
    let needs_quoting = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '#'));
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
