//! Secret backend talking to a 1Password Connect server over HTTP.

use crate::config::HttpConfig;
use crate::item::{Field, Item, LOGIN_CATEGORY, NOTES_PURPOSE, SECURE_NOTE_CATEGORY};
use crate::validation::{validate_base_url, validate_request_path, validate_token};
use crate::{Address, FlatMap, OpdotenvError, Result, SecretBackend};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Fixed delay before the single transport retry.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Backend that calls the Connect REST API.
///
/// Vault-name-to-id lookups are cached for the lifetime of the client
/// instance; nothing else is cached.
pub struct ConnectBackend {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    vault_cache: Mutex<HashMap<String, String>>,
}

impl ConnectBackend {
    /// Creates a Connect backend.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is not http/https or the token is empty.
    pub fn new(base_url: &str, access_token: &str, http: HttpConfig) -> Result<Self> {
        let base_url = validate_base_url(base_url)?;
        validate_token(access_token)?;

        let client = reqwest::Client::builder()
            .connect_timeout(http.connect_timeout)
            .timeout(http.read_timeout)
            .build()?;

        Ok(Self {
            http: client,
            base_url,
            access_token: access_token.to_string(),
            vault_cache: Mutex::new(HashMap::new()),
        })
    }

    async fn api_request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        validate_request_path(path)?;
        debug!(%method, path, "connect api request");

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = send_with_retry(request).await?;
        handle_response(response, path).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.api_request(reqwest::Method::GET, path, None).await
    }

    async fn list_vaults(&self) -> Result<Vec<Value>> {
        match self.get("/v1/vaults").await? {
            Value::Array(vaults) => Ok(vaults),
            _ => Ok(Vec::new()),
        }
    }

    /// Resolves a vault name (or id) to its id, consulting the
    /// per-instance cache first.
    async fn vault_id(&self, vault_name: &str) -> Result<String> {
        if let Some(id) = self.vault_cache.lock().await.get(vault_name) {
            return Ok(id.clone());
        }

        let vaults = self.list_vaults().await?;
        let vault = vaults
            .iter()
            .find(|v| v["name"] == vault_name || v["id"] == vault_name)
            .ok_or_else(|| OpdotenvError::NotFound(format!("Vault '{vault_name}' not found")))?;

        let id = vault["id"].as_str().unwrap_or_default().to_string();
        self.vault_cache
            .lock()
            .await
            .insert(vault_name.to_string(), id.clone());
        Ok(id)
    }

    /// Finds an item by title (or id) in a vault and fetches its full
    /// representation, fields included. Returns `None` when absent.
    async fn item_by_title_in_vault(&self, vault_id: &str, title: &str) -> Result<Option<Value>> {
        let items = match self.get(&format!("/v1/vaults/{vault_id}/items")).await? {
            Value::Array(items) => items,
            _ => Vec::new(),
        };

        let summary = items.iter().find(|i| i["title"] == title || i["id"] == title);
        match summary.and_then(|i| i["id"].as_str()) {
            Some(item_id) => {
                let full = self
                    .get(&format!("/v1/vaults/{vault_id}/items/{item_id}"))
                    .await?;
                Ok(Some(full))
            }
            None => Ok(None),
        }
    }

    async fn find_item_in_all_vaults(&self, title: &str) -> Result<Option<Value>> {
        for vault in self.list_vaults().await? {
            let vault_id = vault["id"].as_str().unwrap_or_default();
            if let Some(item) = self.item_by_title_in_vault(vault_id, title).await? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    async fn get_item_value(&self, vault: &str, title: &str) -> Result<Value> {
        let vault_id = self.vault_id(vault).await?;
        self.item_by_title_in_vault(&vault_id, title)
            .await?
            .ok_or_else(|| {
                OpdotenvError::NotFound(format!("Item '{title}' not found in vault '{vault}'"))
            })
    }
}

#[async_trait]
impl SecretBackend for ConnectBackend {
    fn name(&self) -> &str {
        "connect"
    }

    async fn read(&self, address: &str) -> Result<String> {
        let addr = Address::parse(address)?;
        let value = self.get_item_value(&addr.vault, &addr.item).await?;
        let item: Item = serde_json::from_value(value)?;

        let field = match addr.field.as_deref() {
            Some(name) => item.find_field(name),
            None => item.notes_field(),
        };

        Ok(field
            .and_then(|f| f.value.clone())
            .unwrap_or_default())
    }

    async fn get_item(&self, title: &str, vault: Option<&str>) -> Result<String> {
        let item = match vault {
            Some(vault) => self.get_item_value(vault, title).await?,
            None => self
                .find_item_in_all_vaults(title)
                .await?
                .ok_or_else(|| OpdotenvError::NotFound(format!("Item '{title}' not found")))?,
        };
        Ok(serde_json::to_string_pretty(&item)?)
    }

    async fn create_note(&self, vault: &str, title: &str, notes: &str) -> Result<()> {
        let vault_id = self.vault_id(vault).await?;

        let payload = json!({
            "vault": {"id": vault_id},
            "title": title,
            "category": SECURE_NOTE_CATEGORY,
            "fields": [{
                "purpose": NOTES_PURPOSE,
                "value": notes,
            }],
        });

        self.api_request(
            reqwest::Method::POST,
            &format!("/v1/vaults/{vault_id}/items"),
            Some(&payload),
        )
        .await?;
        Ok(())
    }

    async fn create_or_update_fields(
        &self,
        vault: &str,
        item: &str,
        fields: &FlatMap,
    ) -> Result<()> {
        let vault_id = self.vault_id(vault).await?;

        match self.item_by_title_in_vault(&vault_id, item).await? {
            Some(existing) => {
                let existing_item: Item =
                    serde_json::from_value(existing.clone()).unwrap_or_default();
                let item_id = existing_item.id.clone();

                let ops: Vec<Value> = fields
                    .iter()
                    .map(|(label, value)| patch_op(&existing_item, label, value))
                    .collect();

                self.api_request(
                    reqwest::Method::PATCH,
                    &format!("/v1/vaults/{vault_id}/items/{item_id}"),
                    Some(&Value::Array(ops)),
                )
                .await?;
            }
            None => {
                let new_fields: Vec<Value> = fields
                    .iter()
                    .map(|(label, value)| {
                        json!({"type": "CONCEALED", "label": label, "value": value})
                    })
                    .collect();

                let payload = json!({
                    "vault": {"id": vault_id},
                    "title": item,
                    "category": LOGIN_CATEGORY,
                    "fields": new_fields,
                });

                self.api_request(
                    reqwest::Method::POST,
                    &format!("/v1/vaults/{vault_id}/items"),
                    Some(&payload),
                )
                .await?;
            }
        }
        Ok(())
    }
}

/// One JSON-Patch operation per field: `replace` when a field with that
/// label already exists, `add` of a new concealed field otherwise.
fn patch_op(existing: &Item, label: &str, value: &str) -> Value {
    let by_label = existing
        .fields
        .iter()
        .find(|f: &&Field| f.label.as_deref() == Some(label));

    match by_label {
        Some(field) => json!({
            "op": "replace",
            "path": format!("/fields/{}/value", field.id),
            "value": value,
        }),
        None => json!({
            "op": "add",
            "path": "/fields",
            "value": {"type": "CONCEALED", "label": label, "value": value},
        }),
    }
}

/// Sends the request, retrying exactly once after a short fixed delay on
/// a connect timeout, read timeout, or connection reset. A second such
/// failure propagates the transport error unwrapped.
async fn send_with_retry(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let retry = request
        .try_clone()
        .ok_or_else(|| anyhow::anyhow!("request body is not cloneable"))?;

    match request.send().await {
        Ok(response) => Ok(response),
        Err(err) if is_transient(&err) => {
            debug!("transient transport failure, retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            Ok(retry.send().await?)
        }
        Err(err) => Err(err.into()),
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }
    // resets and connect-phase timeouts surface as io errors in the chain;
    // other connect failures (refused, unreachable) are not retried
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::TimedOut
            );
        }
        source = inner.source();
    }
    false
}

/// Maps a response to a value or an error, without ever surfacing the raw
/// body in error text.
async fn handle_response(response: reqwest::Response, path: &str) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();

    match status {
        StatusCode::OK => {
            let body = response.text().await?;
            if body.is_empty() {
                Ok(json!({}))
            } else {
                Ok(serde_json::from_str(&body)?)
            }
        }
        StatusCode::NO_CONTENT => Ok(json!({})),
        StatusCode::UNAUTHORIZED => Err(OpdotenvError::Authorization(
            "unauthorized: invalid or missing access token".to_string(),
        )),
        StatusCode::FORBIDDEN => Err(OpdotenvError::Authorization(
            "forbidden: access denied".to_string(),
        )),
        StatusCode::NOT_FOUND => Err(OpdotenvError::NotFound(path.to_string())),
        _ if status.is_server_error() => {
            let message = extract_safe_error_message(response, "server error").await;
            Err(OpdotenvError::Server {
                status: code,
                message,
            })
        }
        _ => {
            let message = extract_safe_error_message(response, "request failed").await;
            Err(OpdotenvError::Server {
                status: code,
                message,
            })
        }
    }
}

/// Extracts only whitelisted structured fields (`message`, `error`) from
/// a JSON error body; anything else yields the generic fallback so secret
/// material cannot leak through error channels.
async fn extract_safe_error_message(response: reqwest::Response, fallback: &str) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|parsed| {
            parsed["message"]
                .as_str()
                .or_else(|| parsed["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string())
}
