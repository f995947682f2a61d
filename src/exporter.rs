//! Serialize a map and write it back to the secret backend.

use crate::{codec, Address, FlatMap, Format, Result, SecretBackend};
use tracing::debug;

/// Exports `data` to the item addressed by `path`.
///
/// Item names carrying a recognizable format extension (`.env.*`, `.json`,
/// `.yaml`, `.yml`) become secure notes: the map is encoded with the
/// resolved format (explicit override, else inferred from the item name,
/// else dotenv) and written as the note text. Any other item name becomes
/// discrete item fields, and `field_type` has no effect on that branch.
///
/// # Example
///
/// ```no_run
/// use opdotenv::{exporter, factory, Config, FlatMap};
///
/// # async fn run() -> opdotenv::Result<()> {
/// let backend = factory::create(&Config::from_env())?;
/// let mut data = FlatMap::new();
/// data.insert("FOO".into(), "bar".into());
/// exporter::export(&*backend, "op://Prod/.env.test", &data, None).await?;
/// # Ok(())
/// # }
/// ```
pub async fn export(
    backend: &dyn SecretBackend,
    path: &str,
    data: &FlatMap,
    field_type: Option<Format>,
) -> Result<()> {
    let (vault, item) = Address::parse_vault_item(path)?;

    // the item segment may carry a trailing field token; only the leading
    // name decides the export shape
    let item_name = item.split('/').next().unwrap_or(&item);

    if Format::matches_format_pattern(item_name) {
        let format = field_type
            .or_else(|| Format::infer(item_name))
            .unwrap_or(Format::Dotenv);
        let content = codec::encode(data, format)?;
        debug!(path, %format, "exporting secure note");
        backend.create_note(&vault, item_name, &content).await
    } else {
        debug!(path, fields = data.len(), "exporting item fields");
        backend
            .create_or_update_fields(&vault, item_name, data)
            .await
    }
}
