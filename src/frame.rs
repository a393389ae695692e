//! Line framing used on the relay's response body.
//!
//! Every frame is one line: a channel tag, a colon, a JSON payload and `\n`.
//! Tag `0` carries text; other tags are reserved and skipped by readers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const TEXT_TAG: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
}

impl Frame {
    pub fn encode(&self) -> String {
        match self {
            Frame::Text(content) => {
                let payload = TextPayload {
                    content: content.clone(),
                };
                // Serializing a struct of one String cannot fail.
                let json = serde_json::to_string(&payload).unwrap_or_default();
                format!("{}:{}\n", TEXT_TAG, json)
            }
        }
    }

    /// Decodes one line (with or without its newline). Lines with an unknown
    /// tag or a payload that does not parse yield `None`.
    pub fn decode(line: &str) -> Option<Frame> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (tag, json) = line.split_once(':')?;
        match tag {
            TEXT_TAG => serde_json::from_str::<TextPayload>(json)
                .ok()
                .map(|payload| Frame::Text(payload.content)),
            _ => None,
        }
    }
}

/// Splits an answer into the fragments the relay emits: each space-separated
/// word followed by a single space.
pub fn word_fragments(answer: &str) -> Vec<String> {
    answer.split(' ').map(|word| format!("{} ", word)).collect()
}

/// Inverse of [`word_fragments`].
pub fn rejoin_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| {
            let f = f.as_ref();
            f.strip_suffix(' ').unwrap_or(f)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reassembles lines from arbitrarily split body chunks.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns the frames completed by it, in order.
    pub fn push(&mut self, chunk: &Bytes) -> Vec<Frame> {
        self.pending.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(frame) = decode_bytes(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Decodes whatever is left once the body has closed.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        decode_bytes(&rest)
    }
}

fn decode_bytes(line: &[u8]) -> Option<Frame> {
    std::str::from_utf8(line).ok().and_then(Frame::decode)
}
