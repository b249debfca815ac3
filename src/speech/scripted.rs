//! Scripted speech bridge
//!
//! Replays queued utterances as if a recognizer were streaming them: one
//! growing partial transcript per word, then the full transcript repeated
//! once more, the way platform engines often re-send their final result.

use super::{BridgeState, EventSink, SpeechBridge};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Bridge fed from text instead of a microphone
#[derive(Debug)]
pub struct ScriptedBridge {
    utterances: Mutex<VecDeque<String>>,
    word_delay: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScriptedBridge {
    /// `word_delay` is the pause between streamed partial transcripts
    pub fn new(word_delay: Duration) -> Self {
        Self {
            utterances: Mutex::new(VecDeque::new()),
            word_delay,
            task: Mutex::new(None),
        }
    }

    /// Queue an utterance for the next `start()`
    pub fn push(&self, utterance: impl Into<String>) {
        self.utterances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(utterance.into());
    }

    /// Utterances not yet replayed
    pub fn pending(&self) -> usize {
        self.utterances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn abort_task(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[async_trait]
impl SpeechBridge for ScriptedBridge {
    async fn request_permission(&self) -> bool {
        true
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn start(&self, events: EventSink) -> bool {
        let utterance = match self
            .utterances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(utterance) => utterance,
            None => return false,
        };

        self.abort_task();
        let delay = self.word_delay;
        let task = tokio::spawn(async move {
            events.state_change(BridgeState::Listening);

            let mut partial = String::new();
            for word in utterance.split_whitespace() {
                tokio::time::sleep(delay).await;
                if !partial.is_empty() {
                    partial.push(' ');
                }
                partial.push_str(word);
                debug!("Partial: {}", partial);
                if !events.transcription(partial.clone()) {
                    return;
                }
            }

            if !partial.is_empty() {
                tokio::time::sleep(delay).await;
                events.transcription(partial);
            }
        });

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        true
    }

    async fn stop(&self) {
        self.abort_task();
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl Drop for ScriptedBridge {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{BridgeEvent, SessionEvent};
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_streams_partials_then_repeats_final() {
        let bridge = ScriptedBridge::new(Duration::from_millis(100));
        bridge.push("pages one to three");
        assert_eq!(bridge.pending(), 1);

        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(bridge.start(EventSink::new(tx)).await);
        assert_eq!(bridge.pending(), 0);

        let mut transcripts = Vec::new();
        let first = rx.recv().await.unwrap();
        assert_eq!(first, SessionEvent::Bridge(BridgeEvent::StateChange(BridgeState::Listening)));
        while let Some(event) = rx.recv().await {
            if let SessionEvent::Bridge(BridgeEvent::Transcription(text)) = event {
                transcripts.push(text);
            }
        }

        assert_eq!(
            transcripts,
            vec![
                "pages",
                "pages one",
                "pages one to",
                "pages one to three",
                "pages one to three",
            ]
        );
    }

    #[tokio::test]
    async fn test_refuses_without_utterance() {
        let bridge = ScriptedBridge::new(Duration::from_millis(1));
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(!bridge.start(EventSink::new(tx)).await);
    }
}
