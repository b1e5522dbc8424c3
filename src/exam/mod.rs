//! Sequential exam sessions presented as a chat.
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`questions`]: loading the ordered question sequence
//! - [`transcript`]: the append-only record of rendered bubbles
//! - [`session`]: the question/answer state machine
//! - [`driver`]: the event loop that paces reveals with a cancelable timer
//! - [`commands`]: slash command parsing for the terminal front-end

mod commands;
mod config;
mod driver;
mod questions;
mod session;
mod transcript;

pub use commands::{ExamCommand, help_text, parse_command};
pub use config::{DEFAULT_COMPLETION_MESSAGE, DEFAULT_REVEAL_DELAY, ExamArgs, ExamConfig};
pub use driver::{ExamChat, ExamChatHandle, ExamInput, ExamOutcome, ExitReason};
pub use questions::QuestionSet;
pub use session::{Advance, ExamChatSession, Rejection, SessionState, SessionStats, Submission};
pub use transcript::{Entry, Role, Transcript};
