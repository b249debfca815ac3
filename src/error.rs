//! PageTalks Error Types
//!
//! Centralized error handling for the voice command core.

use thiserror::Error;

/// Central error type for PageTalks
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recent files error: {0}")]
    Recents(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for PageTalks operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for VoiceError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        VoiceError::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoiceError::Recents("bad entry".to_string());
        assert_eq!(err.to_string(), "Recent files error: bad entry");
    }

    #[test]
    fn test_poison_conversion() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err: VoiceError = lock.lock().unwrap_err().into();
        assert!(matches!(err, VoiceError::Lock(_)));
    }
}
