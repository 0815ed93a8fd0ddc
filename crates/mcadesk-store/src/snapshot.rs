use std::path::Path;

use anyhow::{Context, Result};
use mcadesk_core::{Communication, Deal, Document, Note, Task};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted session state: the collections the board last saw, in the
/// browser session layout (`deals`, `documents`, `communications`, `tasks`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub communications: Vec<Communication>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// Top-level keys not modelled here. Written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("snapshot {} is not valid", path.display()))?;
    Ok(snapshot)
}

pub async fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let serialized = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, serialized)
        .await
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}
