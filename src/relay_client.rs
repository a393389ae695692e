use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::ClientError;
use crate::frame::{Frame, FrameDecoder};
use crate::llm_interaction::ChatMessage;

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Talks to a running relay's `/api/chat` endpoint.
#[derive(Clone, Debug)]
pub struct RelayClient {
    http: Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts the transcript. Anything but a success status is an error; the
    /// body of a successful response is left unread for [`read_frames`].
    #[instrument(skip(self, messages), fields(turns = messages.len()))]
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<reqwest::Response, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Relay refused the turn");
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

/// Feeds every text frame of the body to `on_text`, in arrival order.
/// Lines that are not text frames are skipped.
pub async fn read_frames<F>(response: reqwest::Response, mut on_text: F) -> Result<(), ClientError>
where
    F: FnMut(&str),
{
    let mut stream = response.bytes_stream();
    let mut decoder = FrameDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for frame in decoder.push(&chunk) {
            match frame {
                Frame::Text(content) => on_text(&content),
            }
        }
    }
    if let Some(Frame::Text(content)) = decoder.finish() {
        on_text(&content);
    }
    Ok(())
}
