//! Decoding secret text into flat maps and encoding maps back to text.

pub mod dotenv;
pub mod json;
pub mod yaml;

use crate::{Format, Result};

/// The universal currency between decoders, encoders, and the merge step:
/// a single-level string-to-string map with deterministic iteration order.
pub type FlatMap = std::collections::BTreeMap<String, String>;

/// Decodes raw text into a flat map using the given format.
pub fn decode(text: &str, format: Format) -> Result<FlatMap> {
    match format {
        Format::Dotenv => Ok(dotenv::decode(text)),
        Format::Json => json::decode(text),
        Format::Yaml => yaml::decode(text),
    }
}

/// Serializes a flat map into text using the given format.
pub fn encode(data: &FlatMap, format: Format) -> Result<String> {
    match format {
        Format::Dotenv => Ok(dotenv::encode(data)),
        Format::Json => json::encode(data),
        Format::Yaml => yaml::encode(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatMap {
        let mut m = FlatMap::new();
        m.insert("FOO".into(), "bar".into());
        m.insert("BAZ".into(), "qux".into());
        m
    }

    #[test]
    fn test_roundtrip_all_formats() {
        for format in [Format::Dotenv, Format::Json, Format::Yaml] {
            let data = sample();
            let text = encode(&data, format).unwrap();
            let back = decode(&text, format).unwrap();
            assert_eq!(back, data, "round-trip failed for {format}");
        }
    }

    #[test]
    fn test_dotenv_decode_idempotent_on_normalized_text() {
        let text = "FOO=bar\nBAR=baz\n";
        let once = decode(text, Format::Dotenv).unwrap();
        let again = decode(&encode(&once, Format::Dotenv).unwrap(), Format::Dotenv).unwrap();
        assert_eq!(once, again);
    }
}
