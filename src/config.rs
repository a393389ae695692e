use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// Everything the relay needs to answer `/api/chat`.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Checked when a request arrives, not at startup.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub chunk_delay: Duration,
    /// Directory holding a prebuilt web client, served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: constants::OPENAI_API_BASE.clone(),
            model: constants::STUDYCHEF_MODEL.clone(),
            max_tokens: constants::MAX_OUTPUT_TOKENS,
            temperature: constants::TEMPERATURE,
            chunk_delay: constants::CHUNK_DELAY,
            static_dir: None,
        }
    }
}

impl RelayConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// Settings for the terminal chat client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub relay_url: String,
    pub data_dir: PathBuf,
    pub autosave_quiet: Duration,
}

impl ClientConfig {
    pub fn new(relay_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        Self {
            relay_url: relay_url.unwrap_or_else(|| constants::STUDYCHEF_RELAY_URL.clone()),
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            autosave_quiet: constants::AUTOSAVE_QUIET_PERIOD,
        }
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}{}", self.relay_url.trim_end_matches('/'), constants::CHAT_ROUTE)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(constants::SAVED_CHATS_FILE)
    }
}

/// Platform data directory, falling back to the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("studychef"))
        .unwrap_or_else(|| PathBuf::from(".studychef"))
}
