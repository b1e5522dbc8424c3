//! Event loop that drives an [`ExamChatSession`].
//!
//! One task owns the session and the renderer. It handles one input event or
//! timer expiry at a time, so the session never needs locking. An accepted
//! answer arms a single [`Sleep`]; when it fires the next bubble is revealed.
//! Tearing the exam down drops the sleep, which cancels the reveal.

use std::path::Path;
use std::pin::Pin;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, Sleep, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Renderer;
use crate::error::{Error, Result};
use crate::exam::QuestionSet;
use crate::exam::commands::{ExamCommand, help_text, parse_command};
use crate::exam::config::ExamConfig;
use crate::exam::session::{Advance, ExamChatSession, Submission};
use crate::observability::{REVEAL_LATENCY, REVEALS_CANCELLED, REVEALS_SCHEDULED};

/// Input delivered to a running exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamInput {
    /// Text typed into the answer box.
    Answer(String),
    /// A slash command.
    Command(ExamCommand),
}

impl ExamInput {
    /// Interprets a line typed into the answer box.
    ///
    /// Slash commands become [`ExamInput::Command`]. A leading `//` is
    /// unescaped to a single `/` and submitted as an answer.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("//") {
            return ExamInput::Answer(format!("/{rest}"));
        }
        match parse_command(line) {
            Some(command) => ExamInput::Command(command),
            None => ExamInput::Answer(line.to_string()),
        }
    }
}

/// Why [`ExamChat::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The completion bubble was shown.
    Completed,
    /// The exam was torn down; a pending reveal, if any, was cancelled.
    TornDown,
    /// Every handle was dropped before the exam finished.
    Disconnected,
}

/// The final state of an exam once its driver exits.
#[derive(Debug)]
pub struct ExamOutcome {
    /// Why the driver stopped.
    pub reason: ExitReason,
    /// The session as it stood when the driver stopped.
    pub session: ExamChatSession,
}

/// Sends input to a running [`ExamChat`].
///
/// Handles are cheap to clone and can be used from threads outside the
/// runtime.
#[derive(Debug, Clone)]
pub struct ExamChatHandle {
    inputs: UnboundedSender<ExamInput>,
    shutdown: CancellationToken,
}

impl ExamChatHandle {
    /// Submits an answer.
    pub fn submit(&self, text: impl Into<String>) -> Result<()> {
        self.send(ExamInput::Answer(text.into()))
    }

    /// Sends a slash command.
    pub fn command(&self, command: ExamCommand) -> Result<()> {
        self.send(ExamInput::Command(command))
    }

    /// Sends any input.
    pub fn send(&self, input: ExamInput) -> Result<()> {
        self.inputs
            .send(input)
            .map_err(|_| Error::closed("exam driver has exited"))
    }

    /// Tears the exam down, cancelling any pending reveal.
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    /// The token that tears this exam down when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Returns true once the driver has exited.
    pub fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}

/// A pending reveal: the armed timer and when it was armed.
struct PendingReveal {
    sleep: Pin<Box<Sleep>>,
    armed_at: Instant,
}

/// Owns a session and paces its reveals.
pub struct ExamChat<R: Renderer> {
    session: ExamChatSession,
    renderer: R,
    inputs: UnboundedReceiver<ExamInput>,
    shutdown: CancellationToken,
}

impl<R: Renderer> ExamChat<R> {
    /// Initializes a session, rendering its first bubble, and returns the
    /// driver together with a handle for sending it input.
    pub fn start(
        questions: QuestionSet,
        config: &ExamConfig,
        mut renderer: R,
    ) -> (Self, ExamChatHandle) {
        let session = ExamChatSession::initialize(questions, config, &mut renderer);
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = ExamChatHandle {
            inputs: tx,
            shutdown: shutdown.clone(),
        };
        let chat = Self {
            session,
            renderer,
            inputs: rx,
            shutdown,
        };
        (chat, handle)
    }

    /// The session being driven.
    pub fn session(&self) -> &ExamChatSession {
        &self.session
    }

    /// Runs until the exam completes, is torn down, or loses every handle.
    ///
    /// The renderer is dropped when this returns.
    pub async fn run(self) -> ExamOutcome {
        let ExamChat {
            mut session,
            mut renderer,
            mut inputs,
            shutdown,
        } = self;

        if session.is_complete() {
            return ExamOutcome {
                reason: ExitReason::Completed,
                session,
            };
        }

        let mut pending: Option<PendingReveal> = None;
        let mut inputs_open = true;

        let reason = loop {
            if !inputs_open && pending.is_none() {
                info!(cursor = session.cursor(), "every exam handle dropped");
                break ExitReason::Disconnected;
            }

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    if pending.take().is_some() {
                        REVEALS_CANCELLED.click();
                        debug!(cursor = session.cursor(), "pending reveal cancelled");
                    }
                    info!(cursor = session.cursor(), "exam torn down");
                    break ExitReason::TornDown;
                }

                _ = fire(&mut pending) => {
                    if let Some(reveal) = pending.take() {
                        REVEAL_LATENCY.add(reveal.armed_at.elapsed().as_secs_f64());
                    }
                    if session.advance(&mut renderer) == Advance::Completed {
                        break ExitReason::Completed;
                    }
                    if !inputs_open {
                        break ExitReason::Disconnected;
                    }
                }

                input = inputs.recv(), if inputs_open => match input {
                    Some(ExamInput::Answer(text)) => {
                        if let Submission::Accepted { reveal_in, .. } =
                            session.submit_answer(&text, &mut renderer)
                        {
                            // Deadlines past the end of time clamp instead of overflowing.
                            pending = Some(PendingReveal {
                                sleep: Box::pin(sleep(reveal_in)),
                                armed_at: Instant::now(),
                            });
                            REVEALS_SCHEDULED.click();
                        }
                    }
                    Some(ExamInput::Command(command)) => {
                        if handle_command(command, &session, &mut renderer) {
                            if pending.take().is_some() {
                                REVEALS_CANCELLED.click();
                            }
                            info!(cursor = session.cursor(), "exam quit");
                            break ExitReason::TornDown;
                        }
                        renderer.set_input_enabled(session.input_enabled());
                    }
                    None => {
                        inputs_open = false;
                    }
                },
            }
        };

        ExamOutcome { reason, session }
    }
}

/// Resolves when the pending reveal's timer fires; never resolves without one.
async fn fire(pending: &mut Option<PendingReveal>) {
    match pending {
        Some(reveal) => reveal.sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Handles a slash command. Returns true if the exam should stop.
fn handle_command(
    command: ExamCommand,
    session: &ExamChatSession,
    renderer: &mut dyn Renderer,
) -> bool {
    match command {
        ExamCommand::Quit => return true,
        ExamCommand::Help => {
            for line in help_text().lines() {
                renderer.print_info(&format!("    {line}"));
            }
        }
        ExamCommand::Stats => {
            let stats = session.stats();
            renderer.print_info("    Exam Progress:");
            renderer.print_info(&format!(
                "      Answered: {}/{}",
                stats.answered, stats.question_count
            ));
            renderer.print_info(&format!("      Bubbles: {}", stats.transcript_len));
            renderer.print_info(&format!("      State: {:?}", stats.state));
        }
        ExamCommand::SaveTranscript(path) => {
            match session
                .transcript()
                .save_to(Path::new(&path), session.questions())
            {
                Ok(()) => renderer.print_info(&format!("Transcript saved to {path}")),
                Err(err) => {
                    warn!(path = %path, error = %err, "transcript save failed");
                    renderer.print_error(&format!("Failed to save transcript: {err}"));
                }
            }
        }
        ExamCommand::Invalid(message) => renderer.print_error(&message),
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::exam::{Entry, Role};

    #[derive(Clone, Default)]
    struct Shared {
        bubbles: Arc<Mutex<Vec<Entry>>>,
        info: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl Renderer for Shared {
        fn print_bubble(&mut self, entry: &Entry) {
            self.bubbles.lock().unwrap().push(entry.clone());
        }

        fn set_input_enabled(&mut self, _: bool) {}

        fn print_error(&mut self, error: &str) {
            self.errors.lock().unwrap().push(error.to_string());
        }

        fn print_info(&mut self, info: &str) {
            self.info.lock().unwrap().push(info.to_string());
        }
    }

    impl Shared {
        fn bubbles(&self) -> Vec<Entry> {
            self.bubbles.lock().unwrap().clone()
        }
    }

    fn questions() -> QuestionSet {
        QuestionSet::new(["2+2=?", "Capital of France?"])
    }

    #[test]
    fn parse_input_lines() {
        assert_eq!(ExamInput::parse(" Paris "), ExamInput::Answer("Paris".to_string()));
        assert_eq!(ExamInput::parse("/quit"), ExamInput::Command(ExamCommand::Quit));
        assert_eq!(
            ExamInput::parse("//usr/bin holds binaries"),
            ExamInput::Answer("/usr/bin holds binaries".to_string())
        );
        assert!(matches!(
            ExamInput::parse("/usr/bin"),
            ExamInput::Command(ExamCommand::Invalid(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_waits_for_delay() {
        let shared = Shared::default();
        let (chat, handle) = ExamChat::start(questions(), &ExamConfig::new(), shared.clone());
        let task = tokio::spawn(chat.run());

        handle.submit("4").unwrap();
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(shared.bubbles().len(), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            shared.bubbles().last(),
            Some(&Entry::new(Role::Question, "Capital of France?"))
        );

        handle.teardown();
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, ExitReason::TornDown);
        assert_eq!(outcome.session.cursor(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_reveal() {
        let shared = Shared::default();
        let (chat, handle) = ExamChat::start(questions(), &ExamConfig::new(), shared.clone());
        let task = tokio::spawn(chat.run());

        handle.submit("4").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.teardown();
        let outcome = task.await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(outcome.reason, ExitReason::TornDown);
        assert!(outcome.session.reveal_pending());
        assert_eq!(shared.bubbles().len(), 2);
        assert!(handle.submit("late").unwrap_err().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_delay_never_fires() {
        let shared = Shared::default();
        let config = ExamConfig::new().with_reveal_delay(Duration::MAX);
        let (chat, handle) = ExamChat::start(questions(), &config, shared.clone());
        let task = tokio::spawn(chat.run());

        handle.submit("4").unwrap();
        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(shared.bubbles().len(), 2);

        handle.teardown();
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, ExitReason::TornDown);
        assert!(outcome.session.reveal_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_exam_returns_completed() {
        let shared = Shared::default();
        let (chat, _handle) =
            ExamChat::start(QuestionSet::default(), &ExamConfig::new(), shared.clone());
        let outcome = chat.run().await;
        assert_eq!(outcome.reason, ExitReason::Completed);
        assert_eq!(shared.bubbles().len(), 1);
        assert_eq!(shared.bubbles()[0].role, Role::System);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handles_let_pending_reveal_fire() {
        let shared = Shared::default();
        let (chat, handle) = ExamChat::start(questions(), &ExamConfig::new(), shared.clone());
        let task = tokio::spawn(chat.run());

        handle.submit("4").unwrap();
        drop(handle);
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, ExitReason::Disconnected);
        assert_eq!(shared.bubbles().len(), 3);
        assert!(outcome.session.input_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn quit_command_stops_driver() {
        let shared = Shared::default();
        let (chat, handle) = ExamChat::start(questions(), &ExamConfig::new(), shared.clone());
        let task = tokio::spawn(chat.run());

        handle.command(ExamCommand::Stats).unwrap();
        handle
            .command(ExamCommand::Invalid("Unknown command: /x".to_string()))
            .unwrap();
        handle.command(ExamCommand::Quit).unwrap();
        let outcome = task.await.unwrap();

        assert_eq!(outcome.reason, ExitReason::TornDown);
        let info = shared.info.lock().unwrap().clone();
        assert!(info.iter().any(|line| line.contains("Answered: 0/2")));
        assert_eq!(
            shared.errors.lock().unwrap().clone(),
            vec!["Unknown command: /x".to_string()]
        );
        assert!(handle.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn save_failure_is_reported() {
        let shared = Shared::default();
        let (chat, handle) = ExamChat::start(questions(), &ExamConfig::new(), shared.clone());
        let task = tokio::spawn(chat.run());

        let missing_dir = std::env::temp_dir()
            .join("exam-chat-no-such-dir")
            .join("t.json");
        handle
            .command(ExamCommand::SaveTranscript(missing_dir.display().to_string()))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.teardown();
        task.await.unwrap();

        let errors = shared.errors.lock().unwrap().clone();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to save transcript"));
    }
}
