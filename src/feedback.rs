use crate::models::{RelayReply, RelayRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const TRANSPORT_FALLBACK: &str = "AI unavailable right now, but you’re doing great ❤️";
pub const EMPTY_REPLY: &str = "✨ AI replied but no text was returned.";
pub const PENDING_MESSAGE: &str = "Preparing a response…";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
#[error("a feedback request is already in flight")]
pub struct Busy;

/// Outbound leg to the relay endpoint.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, TransportError>;
}

pub struct HttpRelayTransport {
    client: Client,
    url: String,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, TransportError> {
        let reply = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<RelayReply>()
            .await?;
        Ok(reply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayPhase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackStatus {
    pub phase: RelayPhase,
    pub message: Option<String>,
    pub controls_enabled: bool,
}

impl FeedbackStatus {
    fn idle(message: Option<String>) -> Self {
        Self {
            phase: RelayPhase::Idle,
            message,
            controls_enabled: true,
        }
    }

    fn awaiting() -> Self {
        Self {
            phase: RelayPhase::AwaitingResponse,
            message: Some(PENDING_MESSAGE.to_string()),
            controls_enabled: false,
        }
    }
}

#[derive(Clone)]
pub struct FeedbackRelay {
    transport: Arc<dyn RelayTransport>,
    timeout: Duration,
    slot: Arc<Mutex<FeedbackStatus>>,
}

impl FeedbackRelay {
    pub fn new(transport: Arc<dyn RelayTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            slot: Arc::new(Mutex::new(FeedbackStatus::idle(None))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedbackStatus> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> FeedbackStatus {
        self.lock().clone()
    }

    /// Claims the in-flight slot, moving to `AwaitingResponse`.
    pub fn begin(&self) -> Result<InFlight, Busy> {
        let mut slot = self.lock();
        if slot.phase == RelayPhase::AwaitingResponse {
            return Err(Busy);
        }
        *slot = FeedbackStatus::awaiting();
        Ok(InFlight {
            relay: self.clone(),
            settled: false,
        })
    }

    /// Message to show for one request. Every failure, including the timeout,
    /// maps to [`TRANSPORT_FALLBACK`].
    async fn fetch_message(&self, request: &RelayRequest) -> String {
        let outcome = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(reply) => reply
                .reply
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| EMPTY_REPLY.to_string()),
            Err(err) => {
                warn!(error = %err, "feedback relay failed");
                TRANSPORT_FALLBACK.to_string()
            }
        }
    }
}

/// Proof that the slot is claimed. Settling or dropping it returns the relay
/// to `Idle`.
pub struct InFlight {
    relay: FeedbackRelay,
    settled: bool,
}

impl InFlight {
    /// Sends the request on a background task. The handle resolves to the
    /// message that was shown.
    pub fn dispatch(self, request: RelayRequest) -> JoinHandle<String> {
        tokio::spawn(async move {
            let mut guard = self;
            let message = guard.relay.fetch_message(&request).await;
            guard.settle(message.clone());
            message
        })
    }

    fn settle(&mut self, message: String) {
        debug!("feedback settled");
        *self.relay.lock() = FeedbackStatus::idle(Some(message));
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(TRANSPORT_FALLBACK.to_string());
        }
    }
}
