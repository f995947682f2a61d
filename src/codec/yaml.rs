//! YAML decoding with anchor/alias rejection, and standard encoding.

use super::{json, FlatMap};
use crate::Result;
use anyhow::anyhow;

/// Parses a YAML document and flattens it into a flat map.
///
/// Anchors and aliases are rejected before parsing: alias expansion can
/// amplify a small document into enormous memory use. Plain scalars,
/// dates, and other native scalar types decode to their string form.
pub fn decode(text: &str) -> Result<FlatMap> {
    reject_anchors_and_aliases(text)?;

    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    let mut out = FlatMap::new();
    json::flatten(&to_json(value), None, &mut out);
    Ok(out)
}

/// Serializes a flat map as a YAML document.
pub fn encode(data: &FlatMap) -> Result<String> {
    Ok(serde_yaml::to_string(data)?)
}

/// Walks the document's parse events and rejects anchor declarations and
/// alias references. Event-level detection leaves `&`/`*` characters
/// inside scalars alone; only real node markers count.
fn reject_anchors_and_aliases(text: &str) -> Result<()> {
    use yaml_rust2::parser::{Event, Parser};

    let mut parser = Parser::new_from_str(text);
    loop {
        let (event, _) = parser
            .next_token()
            .map_err(|e| anyhow!("invalid YAML: {e}"))?;
        match event {
            Event::Alias(_) => {
                return Err(anyhow!("YAML anchors and aliases are not allowed").into());
            }
            Event::Scalar(_, _, aid, ..)
            | Event::SequenceStart(aid, ..)
            | Event::MappingStart(aid, ..)
                if aid > 0 =>
            {
                return Err(anyhow!("YAML anchors and aliases are not allowed").into());
            }
            Event::StreamEnd => return Ok(()),
            _ => {}
        }
    }
}

fn to_json(value: serde_yaml::Value) -> serde_json::Value {
    use serde_json::Value as J;
    use serde_yaml::Value as Y;

    match value {
        Y::Null => J::Null,
        Y::Bool(b) => J::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                J::from(i)
            } else if let Some(u) = n.as_u64() {
                J::from(u)
            } else {
                serde_json::Number::from_f64(n.as_f64().unwrap_or(0.0))
                    .map(J::Number)
                    .unwrap_or(J::Null)
            }
        }
        Y::String(s) => J::String(s),
        Y::Sequence(items) => J::Array(items.into_iter().map(to_json).collect()),
        Y::Mapping(map) => J::Object(
            map.into_iter()
                .map(|(k, v)| (key_to_string(k), to_json(v)))
                .collect(),
        ),
        Y::Tagged(tagged) => to_json(tagged.value),
    }
}

fn key_to_string(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Y;
    match key {
        Y::String(s) => s,
        Y::Bool(b) => b.to_string(),
        Y::Number(n) => n.to_string(),
        Y::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
