use chrono::Utc;
use tracing::{debug, info, warn};

use crate::chat::Conversation;
use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::quick_replies::{Panel, QuickReply};
use crate::relay_client::{read_frames, RelayClient};
use crate::sessions::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, or a reply was still streaming.
    Ignored,
    Replied,
    /// The apology message was appended instead of a reply.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAction {
    Submitted(TurnOutcome),
    OpenedPanel(Panel),
}

/// The chat client: one conversation, the saved chats, and the relay it talks to.
pub struct ChatClient {
    conversation: Conversation,
    store: SessionStore,
    relay: RelayClient,
}

impl ChatClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_parts(
            Conversation::new(),
            SessionStore::open(config.store_path()),
            RelayClient::new(config.chat_endpoint()),
        )
    }

    pub fn with_parts(conversation: Conversation, store: SessionStore, relay: RelayClient) -> Self {
        Self {
            conversation,
            store,
            relay,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Runs one full turn. `on_fragment` sees each streamed piece of the reply as it arrives.
    pub async fn submit<F>(&mut self, input: &str, mut on_fragment: F) -> TurnOutcome
    where
        F: FnMut(&str),
    {
        if self.conversation.begin_turn(input).is_none() {
            return TurnOutcome::Ignored;
        }

        let transcript = self.conversation.transcript();
        let outcome = match self.relay.send(&transcript).await {
            Ok(response) => {
                let reply_id = self.conversation.start_reply();
                let conversation = &mut self.conversation;
                let streamed = read_frames(response, |text| {
                    conversation.append_to(&reply_id, text);
                    on_fragment(text);
                })
                .await;
                match streamed {
                    Ok(()) => TurnOutcome::Replied,
                    Err(e) => {
                        warn!("Chat stream broke off: {}", e);
                        self.conversation.push_apology();
                        TurnOutcome::Failed
                    }
                }
            }
            Err(e) => {
                warn!("Chat error: {}", e);
                self.conversation.push_apology();
                TurnOutcome::Failed
            }
        };

        self.conversation.finish_turn();
        outcome
    }

    /// Panel suggestions open locally; everything else is sent as a turn.
    pub async fn choose<F>(&mut self, reply: &QuickReply, on_fragment: F) -> ReplyAction
    where
        F: FnMut(&str),
    {
        match reply {
            QuickReply::Show(_, panel) => {
                self.open_panel(*panel);
                ReplyAction::OpenedPanel(*panel)
            }
            QuickReply::Send(text) => ReplyAction::Submitted(self.submit(text, on_fragment).await),
        }
    }

    pub fn open_panel(&mut self, panel: Panel) {
        self.conversation.open_panel(panel);
    }

    pub fn close_panel(&mut self, panel: Panel) {
        self.conversation.close_panel(panel);
    }

    /// Stores the active conversation if it has gone past the greeting.
    /// Returns the id it was stored under.
    pub fn save_current(&mut self) -> Result<Option<String>, StoreError> {
        let Some(chat) = self.conversation.snapshot(Utc::now()) else {
            return Ok(None);
        };
        let id = chat.id.clone();
        self.store.save(chat)?;
        self.conversation.set_current_chat_id(id.clone());
        Ok(Some(id))
    }

    /// Handles an auto-save tick for `revision`. A tick for an older revision
    /// is stale: the conversation changed since, and a fresh quiet period is running.
    pub fn autosave(&mut self, revision: u64) -> Result<Option<String>, StoreError> {
        if revision != self.conversation.revision() {
            debug!(revision, current = self.conversation.revision(), "Skipping stale auto-save");
            return Ok(None);
        }
        self.save_current()
    }

    pub fn new_chat(&mut self) -> Result<(), StoreError> {
        self.save_current()?;
        self.conversation.reset();
        info!("Started a new chat");
        Ok(())
    }

    /// Saves the active conversation, then switches to the stored chat `id`.
    /// The target is taken before saving, since that save may evict it from a
    /// full store; it goes back in first on its next save.
    pub fn load_chat(&mut self, id: &str) -> Result<(), StoreError> {
        let chat = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.save_current()?;
        self.conversation.restore(&chat);
        info!(%id, "Loaded saved chat");
        Ok(())
    }

    pub fn delete_chat(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id)
    }
}
