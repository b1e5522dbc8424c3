//! Slash command parsing for the exam chat front-end.
//!
//! Input that starts with `/` controls the session instead of being
//! submitted as an answer. A doubled `//` escapes a literal leading slash.

/// A parsed exam chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamCommand {
    /// Display help information.
    Help,

    /// Leave the exam, cancelling any pending reveal.
    Quit,

    /// Display session statistics.
    Stats,

    /// Save the transcript to a file immediately.
    SaveTranscript(String),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ExamCommand)` if the input is a command,
/// or `None` if it should be treated as an answer.
///
/// # Examples
///
/// ```
/// # use exam_chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/save exam.json").is_some());
/// assert!(parse_command("Paris").is_none());
/// assert!(parse_command("//usr/bin").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ExamCommand> {
    let input = input.trim();

    if !input.starts_with('/') || input.starts_with("//") {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "help" | "?" => ExamCommand::Help,
        "quit" | "exit" | "q" => ExamCommand::Quit,
        "stats" | "status" => ExamCommand::Stats,
        "save" => match argument {
            Some(arg) => ExamCommand::SaveTranscript(arg.to_string()),
            None => ExamCommand::Invalid("/save requires a file path".to_string()),
        },
        _ => ExamCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /stats                 Show exam progress
  /save <file>           Save the transcript immediately
  /help                  Show this help message
  /quit                  Leave the exam
Anything else is submitted as your answer. Start an answer with // to
submit a literal leading slash, as in //usr/bin."#
}
