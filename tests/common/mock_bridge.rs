//! Mock Speech Bridge for Testing
//!
//! Keeps the event sink the session hands it so a test can play the part
//! of the platform engine.

use async_trait::async_trait;
use pagetalks::speech::{BridgeState, EventSink, SpeechBridge};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockBridge {
    available: bool,
    permission: bool,
    accepts_start: bool,
    sink: Mutex<Option<EventSink>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            available: true,
            permission: true,
            accepts_start: true,
            sink: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// Device without speech recognition
    pub fn unsupported() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// User declined the permission prompt
    pub fn denied() -> Self {
        Self {
            permission: false,
            ..Self::new()
        }
    }

    /// Engine that refuses every start
    pub fn refusing() -> Self {
        Self {
            accepts_start: false,
            ..Self::new()
        }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn transcription(&self, text: &str) -> bool {
        self.with_sink(|sink| sink.transcription(text))
    }

    pub fn state_change(&self, state: BridgeState) -> bool {
        self.with_sink(|sink| sink.state_change(state))
    }

    pub fn error(&self, message: &str) -> bool {
        self.with_sink(|sink| sink.error(message))
    }

    fn with_sink(&self, send: impl FnOnce(&EventSink) -> bool) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => send(sink),
            None => false,
        }
    }
}

#[async_trait]
impl SpeechBridge for MockBridge {
    async fn request_permission(&self) -> bool {
        self.permission
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn start(&self, events: EventSink) -> bool {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if !self.accepts_start {
            return false;
        }
        *self.sink.lock().unwrap() = Some(events);
        true
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "mock"
    }
}
