//! PageTalks Library
//!
//! Voice command core for a PDF page-selection app: transcript parsing,
//! recent-file matching, command dispatch and the recognition session.

pub mod capabilities;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod processor;
pub mod recents;
pub mod selection;
pub mod session;
pub mod speech;
pub mod utils;

pub use commands::{parse, Command, CommandParser, VoiceContext};
pub use error::{VoiceError, VoiceResult};
pub use processor::{DispatchResult, Dispatcher};
pub use session::{RecognitionState, SessionController, StartOutcome};
