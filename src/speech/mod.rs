//! Speech Bridge Module
//!
//! Contract between the session controller and the platform speech-to-text
//! engine. The bridge is started and stopped by the controller and reports
//! transcripts, state changes and errors back through an [`EventSink`].

pub mod scripted;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use scripted::ScriptedBridge;

/// Listening state reported by the platform engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Listening,
    Idle,
}

/// Event delivered by the speech bridge
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// Latest transcript for the current utterance (partial or final)
    Transcription(String),
    StateChange(BridgeState),
    Error(String),
}

/// Everything the session controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Bridge(BridgeEvent),
    /// The silence timer armed as `generation` ran out
    SilenceElapsed { generation: u64 },
}

/// Handle a bridge uses to report events to the session
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Report the latest transcript; returns false once the session is gone
    pub fn transcription(&self, text: impl Into<String>) -> bool {
        self.send(BridgeEvent::Transcription(text.into()))
    }

    pub fn state_change(&self, state: BridgeState) -> bool {
        self.send(BridgeEvent::StateChange(state))
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.send(BridgeEvent::Error(message.into()))
    }

    fn send(&self, event: BridgeEvent) -> bool {
        self.tx.send(SessionEvent::Bridge(event)).is_ok()
    }
}

/// Trait for platform speech engines
#[async_trait]
pub trait SpeechBridge: Send + Sync {
    /// Ask for microphone / speech permission
    async fn request_permission(&self) -> bool;

    /// Whether speech recognition exists on this device
    fn is_available(&self) -> bool;

    /// Start listening; false when the engine refuses
    async fn start(&self, events: EventSink) -> bool;

    /// Stop listening. Safe to call when not listening.
    async fn stop(&self);

    /// Get the engine name
    fn name(&self) -> &str;
}
