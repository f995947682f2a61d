//! Secret backend driven by the `op` command-line tool.

use crate::item::SECURE_NOTE_CLI_CATEGORY;
use crate::source::NOTES_PLAIN_FIELD;
use crate::{FlatMap, OpdotenvError, Result, SecretBackend};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Backend that shells out to the 1Password CLI.
///
/// Every operation is a subprocess invocation with an argument vector,
/// never a shell command line, so argument values cannot be interpreted
/// by a shell.
pub struct OpCliBackend {
    binary: String,
}

impl OpCliBackend {
    /// Creates a CLI backend, optionally with an overridden executable path.
    pub fn new(binary: Option<String>) -> Self {
        Self {
            binary: binary.unwrap_or_else(|| "op".to_string()),
        }
    }

    /// Runs the binary and captures stdout.
    ///
    /// When the argument vector requested JSON output (`--format json`)
    /// and stdout parses as JSON, the output is returned as success even
    /// on a non-zero exit status: some `op` releases emit a valid payload
    /// alongside a non-zero status in edge cases.
    ///
    /// On failure the error carries only the command name and exit code.
    /// Captured output may contain secret values and is never surfaced.
    async fn capture(&self, args: &[&str]) -> Result<String> {
        debug!(command = %self.binary, op = args.first().copied().unwrap_or(""), "running op command");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OpdotenvError::CliNotInstalled(format!("{} command not found", self.binary))
                } else {
                    OpdotenvError::Io(e)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        let wants_json = args.windows(2).any(|w| w == ["--format", "json"]);
        if wants_json && serde_json::from_str::<serde_json::Value>(&stdout).is_ok() {
            return Ok(stdout);
        }

        if !output.status.success() {
            return Err(OpdotenvError::CommandFailed {
                command: self.binary.clone(),
                code: output.status.code().unwrap_or(-1),
            });
        }

        Ok(stdout)
    }

    /// Checks item existence by exit status only; output is discarded.
    async fn item_exists(&self, item: &str, vault: &str) -> Result<bool> {
        let status = Command::new(&self.binary)
            .args(["item", "get", item, "--vault", vault])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OpdotenvError::CliNotInstalled(format!("{} command not found", self.binary))
                } else {
                    OpdotenvError::Io(e)
                }
            })?;

        Ok(status.success())
    }
}

#[async_trait]
impl SecretBackend for OpCliBackend {
    fn name(&self) -> &str {
        "op-cli"
    }

    async fn read(&self, address: &str) -> Result<String> {
        if !address.starts_with("op://") {
            return Err(OpdotenvError::AddressFormat(address.to_string()));
        }
        let out = self.capture(&["read", address]).await?;
        Ok(out.trim().to_string())
    }

    async fn get_item(&self, title: &str, vault: Option<&str>) -> Result<String> {
        let mut args = vec!["item", "get", title, "--format", "json"];
        if let Some(vault) = vault {
            args.extend(["--vault", vault]);
        }
        self.capture(&args).await
    }

    async fn create_note(&self, vault: &str, title: &str, notes: &str) -> Result<()> {
        let assignment = format!("{NOTES_PLAIN_FIELD}={notes}");
        self.capture(&[
            "item",
            "create",
            "--category",
            SECURE_NOTE_CLI_CATEGORY,
            "--title",
            title,
            "--vault",
            vault,
            &assignment,
        ])
        .await?;
        Ok(())
    }

    async fn create_or_update_fields(
        &self,
        vault: &str,
        item: &str,
        fields: &FlatMap,
    ) -> Result<()> {
        if self.item_exists(item, vault).await? {
            // edit field-by-field so unrelated existing fields survive
            for (key, value) in fields {
                let assignment = format!("{key}={value}");
                self.capture(&["item", "edit", item, "--vault", vault, "--set", &assignment])
                    .await?;
            }
        } else {
            let assignments: Vec<String> =
                fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let mut args = vec!["item", "create", "--title", item, "--vault", vault];
            for assignment in &assignments {
                args.extend(["--set", assignment.as_str()]);
            }
            self.capture(&args).await?;
        }
        Ok(())
    }
}
