use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{domain::ChatId, errors::Error, ports::RegistryPort, Result};

/// Roster persisted as a JSON array of chat ids.
///
/// Insertion order is kept. Every `list()` reads the file again; writes are
/// serialized in-process and land through a temp file + rename.
pub struct JsonFileRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Vec<ChatId>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.fail("unable to read", e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| self.fail("unable to decode", e))
    }

    async fn write(&self, roster: &[ChatId]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| self.fail("unable to create directory for", e))?;
        }

        let json = serde_json::to_vec_pretty(roster).map_err(|e| self.fail("unable to encode", e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.fail("unable to write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.fail("unable to replace", e))?;
        Ok(())
    }

    fn fail(&self, what: &str, e: impl std::fmt::Display) -> Error {
        Error::registry_at(&self.path, what, e)
    }
}

#[async_trait]
impl RegistryPort for JsonFileRegistry {
    async fn list(&self) -> Result<Vec<ChatId>> {
        self.read().await
    }

    async fn add(&self, chat_id: ChatId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut roster = self.read().await?;
        if roster.contains(&chat_id) {
            debug!(%chat_id, "chat already registered");
            return Ok(());
        }
        roster.push(chat_id);
        self.write(&roster).await
    }

    async fn remove(&self, chat_id: ChatId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut roster = self.read().await?;
        let before = roster.len();
        roster.retain(|c| *c != chat_id);
        if roster.len() == before {
            debug!(%chat_id, "chat was not registered");
            return Ok(());
        }
        self.write(&roster).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}/registry.json"))
    }

    #[tokio::test]
    async fn missing_file_is_empty_roster() {
        let reg = JsonFileRegistry::new(tmp("gurupa-reg-missing"));
        assert!(reg.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_keeps_order_and_is_idempotent() {
        let path = tmp("gurupa-reg-add");
        let reg = JsonFileRegistry::new(&path);
        reg.add(ChatId(2)).await.unwrap();
        reg.add(ChatId(1)).await.unwrap();
        reg.add(ChatId(2)).await.unwrap();
        assert_eq!(reg.list().await.unwrap(), vec![ChatId(2), ChatId(1)]);

        // A fresh handle sees the same roster.
        let again = JsonFileRegistry::new(&path);
        assert_eq!(again.list().await.unwrap(), vec![ChatId(2), ChatId(1)]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let path = tmp("gurupa-reg-remove");
        let reg = JsonFileRegistry::new(&path);
        reg.add(ChatId(1)).await.unwrap();
        reg.add(ChatId(42)).await.unwrap();
        reg.remove(ChatId(42)).await.unwrap();
        reg.remove(ChatId(42)).await.unwrap();
        reg.remove(ChatId(7)).await.unwrap();
        assert_eq!(reg.list().await.unwrap(), vec![ChatId(1)]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_registry_error() {
        let path = tmp("gurupa-reg-corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let reg = JsonFileRegistry::new(&path);
        assert!(matches!(reg.list().await, Err(Error::Registry(_))));
        assert!(matches!(reg.add(ChatId(1)).await, Err(Error::Registry(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
