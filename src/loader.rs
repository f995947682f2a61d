//! Fetch, decode, and merge secrets into a caller-supplied map.

use crate::item::Item;
use crate::{codec, Address, FlatMap, Format, Result, SecretBackend, Source};
use tracing::debug;

/// Options controlling a [`load`] call.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field to fetch. `None` means fetch all item fields without decoding.
    pub field_name: Option<String>,
    /// Decoder for the fetched field text (default dotenv).
    pub field_type: Format,
    /// Whether decoded keys replace existing keys in the target map.
    pub overwrite: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            field_name: None,
            field_type: Format::Dotenv,
            overwrite: true,
        }
    }
}

impl LoadOptions {
    /// Options for fetching and decoding one field.
    pub fn field(name: impl Into<String>, field_type: Format) -> Self {
        Self {
            field_name: Some(name.into()),
            field_type,
            overwrite: true,
        }
    }

    /// Disables overwriting of keys already present in the target map.
    pub fn keep_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }
}

/// Resolves one secret address and merges the result into `target`.
///
/// With a field name, the field's text is fetched via [`SecretBackend::read`]
/// and decoded with the configured format. Without one, the full item is
/// fetched and every non-notes field becomes a key/value pair, undecoded.
///
/// Returns the decoded (pre-merge) map so callers can inspect exactly what
/// was resolved.
///
/// # Example
///
/// ```no_run
/// use opdotenv::{factory, loader, Config, FlatMap, Format};
/// use opdotenv::loader::LoadOptions;
///
/// # async fn run() -> opdotenv::Result<()> {
/// let backend = factory::create(&Config::from_env())?;
/// let mut env = FlatMap::new();
/// let opts = LoadOptions::field("notesPlain", Format::Dotenv);
/// loader::load(&*backend, "op://Prod/.env.production", &opts, &mut env).await?;
/// # Ok(())
/// # }
/// ```
pub async fn load(
    backend: &dyn SecretBackend,
    path: &str,
    options: &LoadOptions,
    target: &mut FlatMap,
) -> Result<FlatMap> {
    let data = match &options.field_name {
        Some(field_name) => {
            load_field(backend, path, field_name, options.field_type).await?
        }
        None => load_all_fields(backend, path).await?,
    };

    debug!(path, keys = data.len(), "resolved secret source");
    merge(target, &data, options.overwrite);
    Ok(data)
}

/// Resolves a parsed [`Source`] descriptor.
///
/// Descriptors without a field type fall back to the default dotenv
/// decoding when they do carry a field name.
pub async fn load_source(
    backend: &dyn SecretBackend,
    source: &Source,
    target: &mut FlatMap,
    overwrite: bool,
) -> Result<FlatMap> {
    let options = LoadOptions {
        field_name: source.field_name.clone(),
        field_type: source.field_type.unwrap_or(Format::Dotenv),
        overwrite,
    };
    load(backend, &source.path, &options, target).await
}

async fn load_field(
    backend: &dyn SecretBackend,
    path: &str,
    field_name: &str,
    field_type: Format,
) -> Result<FlatMap> {
    let field_path = build_field_path(path, field_name);
    let text = backend.read(&field_path).await?;
    codec::decode(&text, field_type)
}

async fn load_all_fields(backend: &dyn SecretBackend, path: &str) -> Result<FlatMap> {
    let addr = Address::parse(path)?;
    let raw_json = backend.get_item(&addr.item, Some(&addr.vault)).await?;

    // A malformed item representation means "no fields", never an error:
    // the common cause is an unexpected but non-fatal absence of fields.
    let item: Item = serde_json::from_str(&raw_json).unwrap_or_default();

    let mut data = FlatMap::new();
    for field in &item.fields {
        if field.purpose.as_deref() == Some(crate::item::NOTES_PURPOSE) {
            continue;
        }
        let key = match &field.label {
            Some(label) => label.trim().to_string(),
            None => field.id.clone(),
        };
        if key.is_empty() {
            continue;
        }
        let value = field.value.clone().unwrap_or_default();
        if value.trim().is_empty() {
            continue;
        }
        data.insert(key, value);
    }
    Ok(data)
}

/// Appends the field segment unless the address already ends with it.
fn build_field_path(path: &str, field_name: &str) -> String {
    if path.ends_with(&format!("/{field_name}")) {
        path.to_string()
    } else {
        format!("{path}/{field_name}")
    }
}

fn merge(target: &mut FlatMap, data: &FlatMap, overwrite: bool) {
    for (key, value) in data {
        if !overwrite && target.contains_key(key) {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}
