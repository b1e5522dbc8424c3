//! Configuration types for exam chat sessions.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling pacing and presentation.

use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

/// Delay between an accepted answer and the next bubble.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);

/// System message shown once every question has been answered.
pub const DEFAULT_COMPLETION_MESSAGE: &str = "You have completed the exam ✅";

/// Command-line arguments for the exam-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ExamArgs {
    /// Delay before revealing the next question, in milliseconds.
    #[arrrg(optional, "Delay before the next question in ms (default: 500)", "MS")]
    pub delay_ms: Option<u64>,

    /// Message shown when the exam is complete.
    #[arrrg(optional, "Completion message", "MESSAGE")]
    pub completion: Option<String>,

    /// Only ask the first N questions.
    #[arrrg(optional, "Maximum number of questions to ask", "N")]
    pub max_questions: Option<usize>,

    /// Save the transcript here when the session ends.
    #[arrrg(optional, "Write the transcript to this file on exit", "FILE")]
    pub transcript: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for an exam session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamConfig {
    /// Pause between an accepted answer and the next reveal.
    pub reveal_delay: Duration,

    /// Text of the terminal system bubble.
    pub completion_message: String,

    /// Cap on the number of questions presented.
    pub max_questions: Option<usize>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Path to write the transcript to when the session ends.
    pub transcript_path: Option<PathBuf>,
}

impl ExamConfig {
    /// Creates a new ExamConfig with default values.
    ///
    /// Defaults:
    /// - Reveal delay: 500ms
    /// - Completion message: "You have completed the exam ✅"
    /// - No question cap
    /// - Color: enabled
    /// - Transcript: not saved
    pub fn new() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            completion_message: DEFAULT_COMPLETION_MESSAGE.to_string(),
            max_questions: None,
            use_color: true,
            transcript_path: None,
        }
    }

    /// Sets the reveal delay.
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Sets the completion message.
    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = message.into();
        self
    }

    /// Caps the number of questions presented.
    pub fn with_max_questions(mut self, max: Option<usize>) -> Self {
        self.max_questions = max;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the transcript path.
    pub fn with_transcript_path(mut self, path: Option<PathBuf>) -> Self {
        self.transcript_path = path;
        self
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ExamArgs> for ExamConfig {
    fn from(args: ExamArgs) -> Self {
        let defaults = ExamConfig::new();
        ExamConfig {
            reveal_delay: args
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal_delay),
            completion_message: args
                .completion
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(defaults.completion_message),
            max_questions: args.max_questions,
            use_color: !args.no_color,
            transcript_path: args.transcript.map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ExamConfig::new();
        assert_eq!(config.reveal_delay, Duration::from_millis(500));
        assert_eq!(config.completion_message, "You have completed the exam ✅");
        assert!(config.max_questions.is_none());
        assert!(config.use_color);
        assert!(config.transcript_path.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ExamConfig::from(ExamArgs::default());
        assert_eq!(config, ExamConfig::default());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ExamArgs {
            delay_ms: Some(50),
            completion: Some("Done.".to_string()),
            max_questions: Some(6),
            transcript: Some("exam.json".to_string()),
            no_color: true,
        };
        let config = ExamConfig::from(args);
        assert_eq!(config.reveal_delay, Duration::from_millis(50));
        assert_eq!(config.completion_message, "Done.");
        assert_eq!(config.max_questions, Some(6));
        assert_eq!(config.transcript_path, Some(PathBuf::from("exam.json")));
        assert!(!config.use_color);
    }

    #[test]
    fn blank_completion_falls_back_to_default() {
        let args = ExamArgs {
            completion: Some("   ".to_string()),
            ..ExamArgs::default()
        };
        let config = ExamConfig::from(args);
        assert_eq!(config.completion_message, DEFAULT_COMPLETION_MESSAGE);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ExamConfig::new()
            .with_reveal_delay(Duration::ZERO)
            .with_completion_message("Finished")
            .with_max_questions(Some(3))
            .without_color()
            .with_transcript_path(Some(PathBuf::from("t.json")));

        assert_eq!(config.reveal_delay, Duration::ZERO);
        assert_eq!(config.completion_message, "Finished");
        assert_eq!(config.max_questions, Some(3));
        assert!(!config.use_color);
        assert_eq!(config.transcript_path, Some(PathBuf::from("t.json")));
    }
}
