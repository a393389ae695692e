// Conversation state owned by the chat client: the transcript, the
// preferences guessed from the survey answers, and which panels are open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::constants;
use crate::llm_interaction::{ChatMessage, Role};
use crate::quick_replies::{quick_replies, Panel, QuickReply};
use crate::sessions::SavedChat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Speaker,
    pub content: String,
}

impl Message {
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            role,
            content: content.into(),
        }
    }

    pub fn greeting() -> Self {
        Self {
            id: constants::GREETING_ID.to_string(),
            role: Speaker::Assistant,
            content: constants::GREETING.to_string(),
        }
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond clock, bumped so two ids handed out in the same millisecond differ.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

/// Survey answers picked up from the user's replies. Empty strings mean "not known yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub user_budget: String,
    pub batch_cooking: bool,
    pub equipment: String,
}

impl Preferences {
    /// Updates the flags from a user turn. `prior_user_turns` counts the user
    /// messages already in the transcript before this one.
    pub fn observe(&mut self, prior_user_turns: usize, text: &str) {
        let lower = text.to_lowercase();
        if prior_user_turns == 1 && text.contains('$') && self.user_budget.is_empty() {
            self.user_budget = text.to_string();
        }
        if prior_user_turns == 2 && lower.contains("kitchen") && self.equipment.is_empty() {
            self.equipment = text.to_string();
        }
        if lower.contains("batch") || lower.contains("yes") {
            self.batch_cooking = true;
        }
    }

    /// Short labels shown next to the chat header.
    pub fn badges(&self) -> Vec<String> {
        let mut badges = Vec::new();
        if let Some(word) = self.user_budget.split(' ').next().filter(|w| !w.is_empty()) {
            badges.push(word.to_string());
        }
        if self.batch_cooking {
            badges.push("Batch".to_string());
        }
        if let Some(word) = self.equipment.split(' ').next().filter(|w| !w.is_empty()) {
            badges.push(word.to_string());
        }
        badges
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panels {
    pub storage_tips: bool,
    pub leftover_tips: bool,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    preferences: Preferences,
    current_chat_id: Option<String>,
    loading: bool,
    panels: Panels,
    revision: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
            preferences: Preferences::default(),
            current_chat_id: None,
            loading: false,
            panels: Panels::default(),
            revision: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    pub fn set_current_chat_id(&mut self, id: String) {
        self.current_chat_id = Some(id);
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn panels(&self) -> Panels {
        self.panels
    }

    /// Bumped on every change to the transcript or preferences.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn user_turn_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Speaker::User).count()
    }

    /// Starts a turn: records the user message and enters the loading state.
    /// Returns `None` for blank input or while a reply is still streaming.
    pub fn begin_turn(&mut self, input: &str) -> Option<Message> {
        let text = input.trim();
        if text.is_empty() || self.loading {
            return None;
        }
        let message = Message::new(Speaker::User, text);
        let prior = self.user_turn_count();
        // The transcript keeps the trimmed text; preferences record the input as typed.
        self.preferences.observe(prior, input);
        self.messages.push(message.clone());
        self.loading = true;
        self.touch();
        Some(message)
    }

    /// The role/content pairs sent to the relay.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|m| ChatMessage::new(m.role.into(), m.content.clone()))
            .collect()
    }

    /// Appends an empty assistant message to stream into and returns its id.
    pub fn start_reply(&mut self) -> String {
        let message = Message::new(Speaker::Assistant, "");
        let id = message.id.clone();
        self.messages.push(message);
        self.touch();
        id
    }

    /// Appends a streamed fragment to the message with `id`. Unknown ids are ignored.
    pub fn append_to(&mut self, id: &str, fragment: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content.push_str(fragment);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn push_apology(&mut self) {
        self.messages
            .push(Message::new(Speaker::Assistant, constants::CLIENT_APOLOGY));
        self.touch();
    }

    pub fn finish_turn(&mut self) {
        self.loading = false;
    }

    /// Suggestions for the next answer; hidden while a reply is loading.
    pub fn quick_replies(&self) -> Vec<QuickReply> {
        if self.loading {
            return Vec::new();
        }
        let last = self.messages.last().map(|m| m.content.as_str()).unwrap_or("");
        quick_replies(self.user_turn_count(), last)
    }

    pub fn open_panel(&mut self, panel: Panel) {
        match panel {
            Panel::StorageTips => self.panels.storage_tips = true,
            Panel::LeftoverTips => self.panels.leftover_tips = true,
        }
    }

    pub fn close_panel(&mut self, panel: Panel) {
        match panel {
            Panel::StorageTips => self.panels.storage_tips = false,
            Panel::LeftoverTips => self.panels.leftover_tips = false,
        }
    }

    /// Only conversations past the greeting are worth keeping.
    pub fn is_saveable(&self) -> bool {
        self.messages.len() > 1
    }

    pub fn title(&self) -> String {
        match self.messages.iter().find(|m| m.role == Speaker::User) {
            Some(first) => {
                let mut chars = first.content.chars();
                let head: String = chars.by_ref().take(constants::TITLE_MAX_CHARS).collect();
                if chars.next().is_some() {
                    format!("{}...", head)
                } else {
                    head
                }
            }
            None => "New Chat".to_string(),
        }
    }

    /// Captures the conversation for storage, reusing the current id when there is one.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<SavedChat> {
        if !self.is_saveable() {
            return None;
        }
        Some(SavedChat {
            id: self.current_chat_id.clone().unwrap_or_else(next_id),
            title: self.title(),
            timestamp: now,
            messages: self.messages.clone(),
            user_budget: self.preferences.user_budget.clone(),
            batch_cooking: self.preferences.batch_cooking,
            equipment: self.preferences.equipment.clone(),
        })
    }

    /// Replaces the whole state with a stored chat.
    pub fn restore(&mut self, chat: &SavedChat) {
        self.messages = chat.messages.clone();
        self.preferences = Preferences {
            user_budget: chat.user_budget.clone(),
            batch_cooking: chat.batch_cooking,
            equipment: chat.equipment.clone(),
        };
        self.current_chat_id = Some(chat.id.clone());
        self.loading = false;
        self.touch();
    }

    /// Back to a fresh greeting with nothing known about the user.
    pub fn reset(&mut self) {
        let revision = self.revision;
        *self = Self::new();
        self.revision = revision;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(conversation: &mut Conversation, reply: &str) {
        let id = conversation.start_reply();
        conversation.append_to(&id, reply);
        conversation.finish_turn();
    }

    #[test]
    fn test_new_conversation_starts_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].id, "1");
        assert_eq!(conversation.messages()[0].role, Speaker::Assistant);
        assert!(!conversation.is_saveable());
    }

    #[test]
    fn test_budget_only_from_second_turn_with_currency() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("I have $5").unwrap();
        answer(&mut conversation, "What's your budget?");
        assert_eq!(conversation.preferences().user_budget, "");

        conversation.begin_turn("Budget ($3-5/day)").unwrap();
        assert_eq!(conversation.preferences().user_budget, "Budget ($3-5/day)");
    }

    #[test]
    fn test_second_turn_without_currency_leaves_budget_unset() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("Vegetarian").unwrap();
        answer(&mut conversation, "Budget?");
        conversation.begin_turn("cheap please").unwrap();
        assert_eq!(conversation.preferences().user_budget, "");
    }

    #[test]
    fn test_budget_keeps_input_as_typed() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("Vegetarian").unwrap();
        answer(&mut conversation, "Budget?");
        conversation.begin_turn("  Budget ($3-5/day) ").unwrap();
        assert_eq!(conversation.preferences().user_budget, "  Budget ($3-5/day) ");
        assert_eq!(conversation.messages().last().unwrap().content, "Budget ($3-5/day)");
    }

    #[test]
    fn test_equipment_from_third_turn() {
        let mut conversation = Conversation::new();
        for reply in ["Vegetarian", "Budget ($3-5/day)"] {
            conversation.begin_turn(reply).unwrap();
            answer(&mut conversation, "ok");
        }
        conversation.begin_turn("Basic Kitchen").unwrap();
        assert_eq!(conversation.preferences().equipment, "Basic Kitchen");
    }

    #[test]
    fn test_batch_flag_sticks() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("YES please").unwrap();
        answer(&mut conversation, "ok");
        assert!(conversation.preferences().batch_cooking);
        conversation.begin_turn("No, fresh daily").unwrap();
        assert!(conversation.preferences().batch_cooking);
    }

    #[test]
    fn test_begin_turn_rejects_blank_and_while_loading() {
        let mut conversation = Conversation::new();
        assert!(conversation.begin_turn("   ").is_none());
        conversation.begin_turn("Vegetarian").unwrap();
        assert!(conversation.is_loading());
        assert!(conversation.begin_turn("again").is_none());
        assert_eq!(conversation.user_turn_count(), 1);
    }

    #[test]
    fn test_append_to_targets_placeholder_by_id() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("Vegetarian").unwrap();
        let id = conversation.start_reply();
        assert!(conversation.append_to(&id, "Perfect! "));
        assert!(conversation.append_to(&id, "Budget? "));
        assert!(!conversation.append_to("missing", "x"));
        assert_eq!(conversation.messages().last().unwrap().content, "Perfect! Budget? ");
    }

    #[test]
    fn test_transcript_maps_roles() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("Vegetarian").unwrap();
        let transcript = conversation.transcript();
        assert_eq!(transcript[0].role, Role::Assistant);
        assert_eq!(transcript[1], ChatMessage::new(Role::User, "Vegetarian"));
    }

    #[test]
    fn test_title_truncates_long_first_message() {
        let mut conversation = Conversation::new();
        conversation
            .begin_turn("Vegetarian but I also eat eggs on weekends")
            .unwrap();
        assert_eq!(conversation.title(), "Vegetarian but I also eat eggs...");

        let mut short = Conversation::new();
        short.begin_turn("Vegetarian").unwrap();
        assert_eq!(short.title(), "Vegetarian");
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut conversation = Conversation::new();
        assert!(conversation.snapshot(Utc::now()).is_none());
        conversation.begin_turn("Vegetarian").unwrap();
        answer(&mut conversation, "Budget?");
        conversation.begin_turn("Budget ($3-5/day)").unwrap();
        answer(&mut conversation, "Equipment?");

        let saved = conversation.snapshot(Utc::now()).unwrap();
        assert_eq!(saved.user_budget, "Budget ($3-5/day)");
        assert_eq!(saved.messages.len(), 5);

        let mut other = Conversation::new();
        other.restore(&saved);
        assert_eq!(other.messages(), conversation.messages());
        assert_eq!(other.preferences(), conversation.preferences());
        assert_eq!(other.current_chat_id(), Some(saved.id.as_str()));
    }

    #[test]
    fn test_reset_clears_preferences_and_id() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("yes").unwrap();
        conversation.set_current_chat_id("42".to_string());
        conversation.open_panel(Panel::StorageTips);
        let before = conversation.revision();
        conversation.reset();
        assert!(!conversation.preferences().batch_cooking);
        assert_eq!(conversation.current_chat_id(), None);
        assert_eq!(conversation.panels(), Panels::default());
        assert_eq!(conversation.messages().len(), 1);
        assert!(conversation.revision() > before);
    }

    #[test]
    fn test_badges() {
        let prefs = Preferences {
            user_budget: "Budget ($3-5/day)".to_string(),
            batch_cooking: true,
            equipment: "Basic kitchen".to_string(),
        };
        assert_eq!(prefs.badges(), vec!["Budget", "Batch", "Basic"]);
        assert!(Preferences::default().badges().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
        assert!(b.parse::<i64>().unwrap() > a.parse::<i64>().unwrap());
    }
}
