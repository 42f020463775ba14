//! Lookup context cache
//!
//! Zone lookups resolve against live DNS infrastructure; their results are
//! stable and worth memoizing so that synth and plan do not need network
//! access on every run. The cache lives in `.siteflow/context.json` and is
//! advisory — deleting it only forces a fresh lookup.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteflow_core::HostedZoneRef;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const CONTEXT_VERSION: u32 = 1;
const CONTEXT_DIR: &str = ".siteflow";
const CONTEXT_FILE: &str = "context.json";
const CONTEXT_BACKUP: &str = "context.json.backup";

/// Cached lookup results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupContext {
    /// Context file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Hosted zones by apex domain
    pub zones: BTreeMap<String, HostedZoneRef>,
}

impl Default for LookupContext {
    fn default() -> Self {
        Self {
            version: CONTEXT_VERSION,
            updated_at: Utc::now(),
            zones: BTreeMap::new(),
        }
    }
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(&self, domain_name: &str) -> Option<&HostedZoneRef> {
        self.zones.get(&normalize(domain_name))
    }

    pub fn set_zone(&mut self, zone: HostedZoneRef) {
        self.zones.insert(normalize(&zone.name), zone);
        self.updated_at = Utc::now();
    }
}

fn normalize(domain_name: &str) -> String {
    domain_name.trim_end_matches('.').to_ascii_lowercase()
}

/// Reads and writes the context file under a project root
pub struct ContextStore {
    project_root: PathBuf,
}

impl ContextStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn context_dir(&self) -> PathBuf {
        self.project_root.join(CONTEXT_DIR)
    }

    fn context_path(&self) -> PathBuf {
        self.context_dir().join(CONTEXT_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.context_dir().join(CONTEXT_BACKUP)
    }

    async fn ensure_context_dir(&self) -> Result<()> {
        let dir = self.context_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created context directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the cached context, or an empty one if none exists
    pub async fn load(&self) -> Result<LookupContext> {
        let path = self.context_path();
        if !path.exists() {
            tracing::debug!("Context file not found, returning empty context");
            return Ok(LookupContext::new());
        }

        let content = fs::read_to_string(&path).await?;
        let context: LookupContext = serde_json::from_str(&content)?;

        if context.version > CONTEXT_VERSION {
            return Err(EngineError::ContextError(format!(
                "Context file version {} is newer than supported version {}",
                context.version, CONTEXT_VERSION
            )));
        }

        tracing::debug!("Loaded context with {} zones", context.zones.len());
        Ok(context)
    }

    /// Save the context, keeping the previous file as a backup
    pub async fn save(&self, context: &LookupContext) -> Result<()> {
        self.ensure_context_dir().await?;

        let path = self.context_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created context backup");
        }

        let content = serde_json::to_string_pretty(context)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved context with {} zones", context.zones.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_context_save_load() {
        let temp_dir = tempdir().unwrap();
        let store = ContextStore::new(temp_dir.path());

        let mut context = LookupContext::new();
        context.set_zone(HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "example.com"));

        store.save(&context).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.zones.len(), 1);
        let zone = loaded.zone("example.com").unwrap();
        assert_eq!(zone.id, "Z0362963BNKBMPFIYIVW");
    }

    #[tokio::test]
    async fn test_empty_context() {
        let temp_dir = tempdir().unwrap();
        let store = ContextStore::new(temp_dir.path());

        let context = store.load().await.unwrap();
        assert!(context.zones.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_is_case_and_dot_insensitive() {
        let temp_dir = tempdir().unwrap();
        let store = ContextStore::new(temp_dir.path());

        let mut context = LookupContext::new();
        context.set_zone(HostedZoneRef::new("Z0362963BNKBMPFIYIVW", "Example.COM."));
        store.save(&context).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded.zone("example.com").is_some());
        assert!(loaded.zone("example.com.").is_some());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let store = ContextStore::new(temp_dir.path());

        let mut context = LookupContext::new();
        context.set_zone(HostedZoneRef::new("Z1", "one.example"));
        store.save(&context).await.unwrap();
        context.set_zone(HostedZoneRef::new("Z2", "two.example"));
        store.save(&context).await.unwrap();

        assert!(temp_dir.path().join(".siteflow/context.json.backup").exists());
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.zones.len(), 2);
    }
}
