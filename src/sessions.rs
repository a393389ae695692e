//! Saved chats, kept as one JSON document in the client's data directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::chat::Message;
use crate::constants;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChat {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub user_budget: String,
    #[serde(default)]
    pub batch_cooking: bool,
    #[serde(default)]
    pub equipment: String,
}

/// Puts `chat` first, dropping any older entry with the same id and anything past the cap.
pub fn upsert(chats: &mut Vec<SavedChat>, chat: SavedChat) {
    chats.retain(|existing| existing.id != chat.id);
    chats.insert(0, chat);
    chats.truncate(constants::MAX_SAVED_CHATS);
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    chats: Vec<SavedChat>,
}

impl SessionStore {
    /// Reads the store once. A missing file is an empty store; an unreadable
    /// one is logged and treated as empty so the client can still start.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let chats = match Self::load(&path) {
            Ok(chats) => chats,
            Err(e) => {
                error!("Error loading saved chats from {}: {}", path.display(), e);
                Vec::new()
            }
        };
        debug!(count = chats.len(), "Loaded saved chats");
        Self { path, chats }
    }

    pub fn load(path: &Path) -> Result<Vec<SavedChat>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recently saved first.
    pub fn chats(&self) -> &[SavedChat] {
        &self.chats
    }

    pub fn get(&self, id: &str) -> Option<&SavedChat> {
        self.chats.iter().find(|chat| chat.id == id)
    }

    pub fn save(&mut self, chat: SavedChat) -> Result<(), StoreError> {
        debug!(id = %chat.id, title = %chat.title, "Saving chat");
        upsert(&mut self.chats, chat);
        self.persist()
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.chats.len();
        self.chats.retain(|chat| chat.id != id);
        if self.chats.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(%id, "Deleted saved chat");
        self.persist()
    }

    // Rewrites the whole record; the rename keeps a crash from leaving half a file.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.chats)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Speaker;

    fn chat(id: &str) -> SavedChat {
        SavedChat {
            id: id.to_string(),
            title: format!("chat {}", id),
            timestamp: Utc::now(),
            messages: vec![Message::greeting(), Message::new(Speaker::User, "Vegetarian")],
            user_budget: String::new(),
            batch_cooking: false,
            equipment: String::new(),
        }
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        let mut chats = vec![chat("a"), chat("b")];
        let mut updated = chat("b");
        updated.title = "renamed".to_string();
        upsert(&mut chats, updated);
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, "b");
        assert_eq!(chats[0].title, "renamed");
        assert_eq!(chats[1].id, "a");
    }

    #[test]
    fn test_upsert_caps_and_evicts_oldest() {
        let mut chats = Vec::new();
        for i in 0..12 {
            upsert(&mut chats, chat(&i.to_string()));
        }
        assert_eq!(chats.len(), constants::MAX_SAVED_CHATS);
        assert_eq!(chats[0].id, "11");
        assert!(chats.iter().all(|c| c.id != "0" && c.id != "1"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(chat("x")).unwrap();
        assert!(json.get("userBudget").is_some());
        assert!(json.get("batchCooking").is_some());
        assert_eq!(json["messages"][1]["role"], "user");
    }
}
