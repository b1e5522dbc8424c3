//! Chat-style sequential exams.
//!
//! An [`ExamChatSession`] walks a fixed [`QuestionSet`] one bubble at a time,
//! echoing each answer and revealing the next question after a short pacing
//! delay. [`ExamChat`] drives a session from an event loop where the delayed
//! reveal is a cancelable task.

pub mod error;
pub mod exam;
pub mod render;

mod observability;

pub use error::{Error, Result};
pub use exam::{
    Advance, Entry, ExamArgs, ExamChat, ExamChatHandle, ExamChatSession, ExamCommand, ExamConfig,
    ExamInput, ExamOutcome, ExitReason, QuestionSet, Rejection, Role, SessionState, SessionStats,
    Submission, Transcript, help_text, parse_command,
};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
