//! Talking to the engine server.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{EngineSettings, MoveReply, MoveRequest, SideReply, SideRequest, UndoReply, UndoRequest};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::side::AiSide;

/// The engine server as the client sees it.
#[allow(async_fn_in_trait)]
pub trait GameServer {
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, TransportError>;

    async fn undo(&self, request: &UndoRequest) -> Result<UndoReply, TransportError>;

    async fn engine_settings(&self) -> Result<EngineSettings, TransportError>;

    async fn update_engine_settings(&self, settings: &EngineSettings) -> Result<(), TransportError>;

    async fn ai_side(&self) -> Result<AiSide, TransportError>;

    async fn set_ai_side(&self, side: AiSide) -> Result<AiSide, TransportError>;
}

/// JSON over HTTP.
pub struct HttpGameServer {
    client: Client,
    base_url: String,
}

impl HttpGameServer {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("board-client/0.1")
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.server_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let resp = self.client.get(self.url(path)).send().await?;
        decode(resp, false).await
    }

    /// POST `body` and decode the reply. With `lenient` set, error statuses
    /// still have their body decoded, since the server reports move and
    /// undo failures as JSON with a 4xx/5xx code.
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        lenient: bool,
    ) -> Result<T, TransportError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        decode(resp, lenient).await
    }
}

async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    lenient: bool,
) -> Result<T, TransportError> {
    let status = resp.status();
    let url = resp.url().path().to_string();
    let text = resp.text().await?;
    debug!(%url, status = status.as_u16(), "Server replied");

    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }
    if lenient {
        if let Ok(parsed) = serde_json::from_str(&text) {
            return Ok(parsed);
        }
    }
    Err(TransportError::Status {
        status: status.as_u16(),
        body: text,
    })
}

impl GameServer for HttpGameServer {
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, TransportError> {
        self.post_json("/api/move", request, true).await
    }

    async fn undo(&self, request: &UndoRequest) -> Result<UndoReply, TransportError> {
        self.post_json("/api/undo", request, true).await
    }

    async fn engine_settings(&self) -> Result<EngineSettings, TransportError> {
        self.get_json("/api/engine/settings").await
    }

    async fn update_engine_settings(&self, settings: &EngineSettings) -> Result<(), TransportError> {
        let _: serde_json::Value = self.post_json("/api/engine/settings", settings, false).await?;
        Ok(())
    }

    async fn ai_side(&self) -> Result<AiSide, TransportError> {
        let reply: SideReply = self.get_json("/api/engine/side").await?;
        Ok(reply.ai_side)
    }

    async fn set_ai_side(&self, side: AiSide) -> Result<AiSide, TransportError> {
        let reply: SideReply = self
            .post_json("/api/engine/side", &SideRequest { side }, false)
            .await?;
        Ok(reply.ai_side)
    }
}
