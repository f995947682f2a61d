//! Content format identification and inference from item/field names.

use crate::{OpdotenvError, Result};
use std::str::FromStr;

/// Serialization format of a secret's text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Line-oriented `KEY=VALUE` pairs
    Dotenv,
    /// JSON document, flattened on decode
    Json,
    /// YAML document, flattened on decode
    Yaml,
}

impl Format {
    /// Infers a format from an item or field name.
    ///
    /// Matching is substring/suffix based so titles like
    /// "Project .env.production" are recognized. Priority order:
    ///
    /// 1. name contains `.env` anywhere -> [`Format::Dotenv`]
    /// 2. name ends with `.json` -> [`Format::Json`]
    /// 3. name ends with `.yaml` or `.yml` -> [`Format::Yaml`]
    /// 4. otherwise `None`
    ///
    /// # Example
    ///
    /// ```
    /// use opdotenv::Format;
    ///
    /// assert_eq!(Format::infer(".env.production"), Some(Format::Dotenv));
    /// assert_eq!(Format::infer("config.json"), Some(Format::Json));
    /// assert_eq!(Format::infer("Plain Item"), None);
    /// ```
    pub fn infer(name: &str) -> Option<Format> {
        if name.contains(".env") {
            Some(Format::Dotenv)
        } else if name.ends_with(".json") {
            Some(Format::Json)
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Some(Format::Yaml)
        } else {
            None
        }
    }

    /// Returns true if the name carries a recognizable format extension.
    pub fn matches_format_pattern(name: &str) -> bool {
        Format::infer(name).is_some()
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dotenv => write!(f, "dotenv"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for Format {
    type Err = OpdotenvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dotenv" => Ok(Format::Dotenv),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(OpdotenvError::UnsupportedFormat(other.to_string())),
        }
    }
}
