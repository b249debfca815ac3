//! Recognition Session Controller
//!
//! Owns one listening turn: starts the speech bridge, tracks the live
//! transcript and its command preview, decides when the user has finished
//! speaking, and hands the final command to the dispatcher.
//!
//! ```text
//! Idle -> Listening -> Processing -> Idle
//!              \-> Error (bridge error; start() again to recover)
//! ```
//!
//! The silence timer measures *user* silence: it is re-armed only when the
//! transcript text actually changes, never by a repeated identical event.

use crate::commands::{Command, CommandParser, VoiceContext};
use crate::config::Config;
use crate::processor::{DispatchResult, Dispatcher};
use crate::speech::{BridgeEvent, BridgeState, EventSink, SessionEvent, SpeechBridge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Idle,
    Listening,
    Processing,
    Error,
}

/// Why a session could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// No speech recognition on this device
    NotSupported,
    PermissionDenied,
    /// The engine refused to start
    Refused,
}

impl Unavailable {
    /// Text the host can show instead of the listening overlay
    pub fn guidance(&self) -> &'static str {
        match self {
            Unavailable::NotSupported => "Speech recognition is not available on this device",
            Unavailable::PermissionDenied => {
                "Allow microphone and speech recognition access to use voice commands"
            }
            Unavailable::Refused => "Speech recognition could not start. Try again",
        }
    }
}

/// Result of [`SessionController::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session is already listening or dispatching
    Busy,
    Unavailable(Unavailable),
}

/// Cancellable one-shot timer that reports through the session channel.
///
/// Each arm gets a new generation; only an expiry carrying the current
/// generation counts.
#[derive(Debug)]
pub struct SilenceTimer {
    duration: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl SilenceTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            generation: 0,
            handle: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of times the timer has been armed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Cancel any pending expiry and start counting again from now
    pub fn arm(&mut self, tx: &mpsc::UnboundedSender<SessionEvent>) {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let deadline = Instant::now() + self.duration;
        let tx = tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(SessionEvent::SilenceElapsed { generation });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether an expiry belongs to the currently armed timer
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_armed() && generation == self.generation
    }
}

impl Drop for SilenceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Drives one recognition session at a time
pub struct SessionController {
    bridge: Arc<dyn SpeechBridge>,
    dispatcher: Dispatcher,
    parser: CommandParser,
    state: RecognitionState,
    context: VoiceContext,
    page_count: u32,
    transcript: String,
    preview: Option<Command>,
    unavailable: Option<Unavailable>,
    last_error: Option<String>,
    timer: SilenceTimer,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    pub fn new(
        bridge: Arc<dyn SpeechBridge>,
        dispatcher: Dispatcher,
        parser: CommandParser,
        silence_timeout: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            bridge,
            dispatcher,
            parser,
            state: RecognitionState::Idle,
            context: VoiceContext::Home,
            page_count: 0,
            transcript: String::new(),
            preview: None,
            unavailable: None,
            last_error: None,
            timer: SilenceTimer::new(silence_timeout),
            events_tx,
            events_rx,
        }
    }

    /// Build a controller with the parser corrections and timeout from config
    pub fn from_config(
        bridge: Arc<dyn SpeechBridge>,
        dispatcher: Dispatcher,
        config: &Config,
    ) -> Self {
        Self::new(
            bridge,
            dispatcher,
            CommandParser::new(&config.voice_corrections),
            config.silence_timeout(),
        )
    }

    /// Swap the capabilities for the next session, e.g. after the host
    /// changed screens
    pub fn set_dispatcher(&mut self, dispatcher: Dispatcher) {
        self.dispatcher = dispatcher;
    }

    pub fn state(&self) -> RecognitionState {
        self.state
    }

    pub fn context(&self) -> VoiceContext {
        self.context
    }

    /// Latest transcript of the current session
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Command the current transcript would dispatch
    pub fn preview(&self) -> Option<&Command> {
        self.preview.as_ref()
    }

    /// Why the last `start()` failed, if it did
    pub fn unavailable(&self) -> Option<Unavailable> {
        self.unavailable
    }

    /// Message of the bridge error that moved the session to `Error`
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// How many times the silence timer has been armed
    pub fn silence_generation(&self) -> u64 {
        self.timer.generation()
    }

    /// Begin listening for a command in `context`.
    ///
    /// Accepted from `Idle` and `Error`. Unavailability is reported in the
    /// outcome and leaves the controller `Idle`.
    pub async fn start(&mut self, context: VoiceContext, page_count: u32) -> StartOutcome {
        if !matches!(self.state, RecognitionState::Idle | RecognitionState::Error) {
            warn!("⚠️ Session already active ({:?}), ignoring start", self.state);
            return StartOutcome::Busy;
        }

        self.reset_turn();
        self.state = RecognitionState::Idle;
        self.last_error = None;
        self.unavailable = None;

        if !self.bridge.is_available() {
            return self.report_unavailable(Unavailable::NotSupported);
        }
        if !self.bridge.request_permission().await {
            return self.report_unavailable(Unavailable::PermissionDenied);
        }

        // Drop anything a previous session left in flight
        while self.events_rx.try_recv().is_ok() {}

        if !self.bridge.start(EventSink::new(self.events_tx.clone())).await {
            return self.report_unavailable(Unavailable::Refused);
        }

        self.context = context;
        self.page_count = page_count;
        self.state = RecognitionState::Listening;
        self.timer.arm(&self.events_tx);

        info!(
            "🎙️ Listening via {} ({:?}, {} pages)",
            self.bridge.name(),
            context,
            page_count
        );
        StartOutcome::Started
    }

    /// Finish the utterance now and dispatch it.
    ///
    /// Returns `None` when no session was listening.
    pub async fn stop(&mut self) -> Option<DispatchResult> {
        if self.state != RecognitionState::Listening {
            debug!("Stop ignored in {:?}", self.state);
            return None;
        }
        Some(self.finalize().await)
    }

    /// Abandon the session without dispatching. Legal in every state.
    pub async fn cancel(&mut self) {
        info!("🛑 Session cancelled");
        self.bridge.stop().await;
        self.reset_turn();
        self.state = RecognitionState::Idle;
    }

    /// React to one event. Returns the dispatch result when the event
    /// finished the session.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Option<DispatchResult> {
        match event {
            SessionEvent::Bridge(BridgeEvent::Transcription(text)) => {
                self.on_transcription(text);
                None
            }
            SessionEvent::Bridge(BridgeEvent::StateChange(BridgeState::Idle)) => {
                if self.state == RecognitionState::Listening {
                    debug!("Bridge stopped listening on its own");
                    Some(self.finalize().await)
                } else {
                    None
                }
            }
            SessionEvent::Bridge(BridgeEvent::StateChange(BridgeState::Listening)) => None,
            SessionEvent::Bridge(BridgeEvent::Error(message)) => {
                self.on_error(message).await;
                None
            }
            SessionEvent::SilenceElapsed { generation } => {
                if self.state == RecognitionState::Listening && self.timer.is_current(generation) {
                    debug!("Silence after '{}'", self.transcript);
                    Some(self.finalize().await)
                } else {
                    debug!("Stale silence timer {} ignored", generation);
                    None
                }
            }
        }
    }

    /// Process events until the current session ends.
    ///
    /// Returns the dispatch result, or `None` when the session ended in
    /// `Error` or was not listening.
    pub async fn run_turn(&mut self) -> Option<DispatchResult> {
        while self.state == RecognitionState::Listening {
            let event = self.events_rx.recv().await?;
            if let Some(result) = self.handle_event(event).await {
                return Some(result);
            }
        }
        None
    }

    fn on_transcription(&mut self, text: String) {
        if self.state != RecognitionState::Listening {
            debug!("Transcript '{}' ignored in {:?}", text, self.state);
            return;
        }
        if text == self.transcript {
            debug!("Repeated transcript, silence timer untouched");
            return;
        }

        self.timer.arm(&self.events_tx);
        let preview = self.parser.parse(&text, self.page_count, self.context);
        debug!("📝 '{}' -> {}", text, preview);
        self.transcript = text;
        self.preview = Some(preview);
    }

    async fn on_error(&mut self, message: String) {
        if !matches!(self.state, RecognitionState::Listening | RecognitionState::Processing) {
            debug!("Bridge error '{}' ignored in {:?}", message, self.state);
            return;
        }

        warn!("❌ Speech bridge error: {}", message);
        self.bridge.stop().await;
        self.reset_turn();
        self.last_error = Some(message);
        self.state = RecognitionState::Error;
    }

    async fn finalize(&mut self) -> DispatchResult {
        self.state = RecognitionState::Processing;
        self.timer.cancel();
        self.bridge.stop().await;

        let command = self
            .parser
            .parse(&self.transcript, self.page_count, self.context);
        info!("🗣️ Final: '{}' -> {}", self.transcript, command);

        let result = self.dispatcher.dispatch(&command).await;

        self.reset_turn();
        self.state = RecognitionState::Idle;
        result
    }

    fn report_unavailable(&mut self, reason: Unavailable) -> StartOutcome {
        warn!("⚠️ Voice commands unavailable: {}", reason.guidance());
        self.unavailable = Some(reason);
        self.state = RecognitionState::Idle;
        StartOutcome::Unavailable(reason)
    }

    fn reset_turn(&mut self) {
        self.timer.cancel();
        self.transcript.clear();
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::ScriptedBridge;

    fn controller(bridge: Arc<ScriptedBridge>) -> SessionController {
        SessionController::new(
            bridge,
            Dispatcher::new(),
            CommandParser::default(),
            Duration::from_millis(1500),
        )
    }

    fn transcription(text: &str) -> SessionEvent {
        SessionEvent::Bridge(BridgeEvent::Transcription(text.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_generation_ignores_repeats() {
        let bridge = Arc::new(ScriptedBridge::new(Duration::from_secs(60)));
        bridge.push("ignored");
        let mut ctl = controller(bridge);

        assert_eq!(ctl.start(VoiceContext::PageGrid, 10).await, StartOutcome::Started);
        let armed = ctl.silence_generation();

        ctl.handle_event(transcription("page two")).await;
        assert_eq!(ctl.silence_generation(), armed + 1);

        ctl.handle_event(transcription("page two")).await;
        ctl.handle_event(transcription("page two")).await;
        assert_eq!(ctl.silence_generation(), armed + 1);

        ctl.handle_event(transcription("page three")).await;
        assert_eq!(ctl.silence_generation(), armed + 2);
        assert_eq!(ctl.transcript(), "page three");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_ignored() {
        let bridge = Arc::new(ScriptedBridge::new(Duration::from_secs(60)));
        bridge.push("ignored");
        let mut ctl = controller(bridge);
        ctl.start(VoiceContext::PageGrid, 10).await;
        ctl.handle_event(transcription("page two")).await;

        let stale = ctl.silence_generation() - 1;
        let result = ctl
            .handle_event(SessionEvent::SilenceElapsed { generation: stale })
            .await;
        assert!(result.is_none());
        assert_eq!(ctl.state(), RecognitionState::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_follows_transcript() {
        let bridge = Arc::new(ScriptedBridge::new(Duration::from_secs(60)));
        bridge.push("ignored");
        let mut ctl = controller(bridge);
        ctl.start(VoiceContext::PageGrid, 10).await;

        ctl.handle_event(transcription("pages one to")).await;
        assert_eq!(ctl.preview(), Some(&Command::Unrecognized));

        ctl.handle_event(transcription("pages one to three")).await;
        assert!(matches!(ctl.preview(), Some(Command::SelectPages { .. })));
    }

    #[test]
    fn test_guidance_text() {
        assert!(Unavailable::PermissionDenied.guidance().contains("microphone"));
        assert!(!Unavailable::NotSupported.guidance().is_empty());
    }
}
