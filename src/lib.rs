pub mod autosave;
pub mod chat;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod llm_interaction;
pub mod quick_replies;
pub mod relay_client;
pub mod sessions;
pub mod ui;
pub mod web_server;
