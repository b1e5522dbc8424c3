//! Core exam session management.
//!
//! This module provides the [`ExamChatSession`] struct, which reveals a fixed
//! list of questions one at a time and records each answer before moving on.
//! The session is synchronous: accepting an answer only reports how long to
//! wait before the next bubble, and whoever owns the session calls
//! [`ExamChatSession::advance`] once that delay has elapsed.

use std::time::Duration;

use tracing::{debug, info};

use crate::Renderer;
use crate::error::{Error, Result};
use crate::exam::config::ExamConfig;
use crate::exam::{QuestionSet, Role, Transcript};
use crate::observability::{
    ANSWERS_ACCEPTED, ANSWERS_REJECTED, QUESTIONS_REVEALED, SESSIONS_COMPLETED, SESSIONS_STARTED,
};

/// Where a session is in its walk through the questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the answer to question `i`.
    AwaitingAnswer(usize),
    /// Every question has been answered. No state leaves this one.
    Terminal,
}

/// Why an answer was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The answer was empty after trimming.
    Blank,
    /// The previous answer was accepted and the next question is not shown yet.
    RevealPending,
    /// The session has already accepted its last answer.
    Terminal,
}

impl Rejection {
    /// A short description of the rejection.
    pub fn describe(&self) -> &'static str {
        match self {
            Rejection::Blank => "answer is blank",
            Rejection::RevealPending => "the next question has not been shown yet",
            Rejection::Terminal => "the exam is already complete",
        }
    }
}

/// The result of submitting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The answer was recorded and the cursor advanced.
    Accepted {
        /// The cursor after accepting the answer.
        cursor: usize,
        /// How long to wait before calling [`ExamChatSession::advance`].
        reveal_in: Duration,
    },
    /// The answer was ignored. Nothing changed and nothing was rendered.
    Rejected(Rejection),
}

impl Submission {
    /// Returns true if the answer was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

/// What a call to [`ExamChatSession::advance`] rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The question at this index was revealed.
    Question(usize),
    /// The completion bubble was shown and input is now disabled for good.
    Completed,
    /// No reveal was pending; nothing happened.
    Idle,
}

/// Snapshot of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of questions in the exam.
    pub question_count: usize,
    /// Number of answers accepted so far.
    pub answered: usize,
    /// Number of bubbles rendered so far.
    pub transcript_len: usize,
    /// Current state.
    pub state: SessionState,
    /// Whether a reveal is waiting on its delay.
    pub reveal_pending: bool,
    /// Whether input is accepted right now.
    pub input_enabled: bool,
}

/// A single exam, walked from the first question to the completion message.
///
/// The cursor starts at 0 and grows by one per accepted answer. It is the
/// index of the question being answered, and of the next question to reveal
/// once an answer has been accepted.
#[derive(Debug, Clone)]
pub struct ExamChatSession {
    questions: QuestionSet,
    cursor: usize,
    transcript: Transcript,
    reveal_pending: bool,
    input_disabled: bool,
    reveal_delay: Duration,
    completion_message: String,
}

impl ExamChatSession {
    /// Starts a session and renders its first bubble.
    ///
    /// A non-empty question set shows its first question and enables input.
    /// An empty one shows the completion message straight away and disables
    /// input from the start.
    pub fn initialize(
        questions: QuestionSet,
        config: &ExamConfig,
        renderer: &mut dyn Renderer,
    ) -> Self {
        let questions = match config.max_questions {
            Some(max) => questions.limit(max),
            None => questions,
        };
        let mut session = Self {
            questions,
            cursor: 0,
            transcript: Transcript::new(),
            reveal_pending: false,
            input_disabled: false,
            reveal_delay: config.reveal_delay,
            completion_message: config.completion_message.clone(),
        };
        SESSIONS_STARTED.click();
        info!(questions = session.questions.len(), "exam session started");
        session.reveal(renderer);
        session
    }

    /// Submits an answer to the question currently shown.
    ///
    /// The answer is trimmed first. Blank answers, answers sent while the
    /// next reveal is pending, and answers sent after the last question are
    /// ignored without changing anything.
    pub fn submit_answer(&mut self, text: &str, renderer: &mut dyn Renderer) -> Submission {
        if let Some(rejection) = self.check(text) {
            ANSWERS_REJECTED.click();
            debug!(cursor = self.cursor, reason = rejection.describe(), "answer ignored");
            return Submission::Rejected(rejection);
        }
        let entry = self.transcript.push(Role::Answer, text.trim());
        renderer.print_bubble(entry);
        self.cursor += 1;
        self.reveal_pending = true;
        renderer.set_input_enabled(false);
        ANSWERS_ACCEPTED.click();
        debug!(cursor = self.cursor, "answer accepted");
        Submission::Accepted {
            cursor: self.cursor,
            reveal_in: self.reveal_delay,
        }
    }

    /// Like [`ExamChatSession::submit_answer`], but reports rejections as errors.
    ///
    /// Returns the new cursor on success.
    pub fn try_submit_answer(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<usize> {
        match self.submit_answer(text, renderer) {
            Submission::Accepted { cursor, .. } => Ok(cursor),
            Submission::Rejected(rejection) => Err(Error::validation(
                rejection.describe(),
                Some("answer".to_string()),
            )),
        }
    }

    /// Shows whatever follows the last accepted answer.
    ///
    /// Reveals the question at the cursor, or the completion message once the
    /// cursor has passed the last question. Calling this with no reveal
    /// pending, or after completion, does nothing.
    pub fn advance(&mut self, renderer: &mut dyn Renderer) -> Advance {
        if !self.reveal_pending || self.input_disabled {
            return Advance::Idle;
        }
        self.reveal_pending = false;
        self.reveal(renderer)
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        if self.cursor >= self.questions.len() {
            SessionState::Terminal
        } else {
            SessionState::AwaitingAnswer(self.cursor)
        }
    }

    /// The number of answers accepted so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Every bubble rendered so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The questions this session walks.
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    /// The delay between an accepted answer and the next reveal.
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    /// Returns true once the last answer has been accepted.
    pub fn is_terminal(&self) -> bool {
        self.state() == SessionState::Terminal
    }

    /// Returns true once the completion bubble has been shown.
    pub fn is_complete(&self) -> bool {
        self.input_disabled
    }

    /// Returns true while an accepted answer is waiting for its reveal.
    pub fn reveal_pending(&self) -> bool {
        self.reveal_pending
    }

    /// Returns true if an answer submitted now would be considered.
    pub fn input_enabled(&self) -> bool {
        !self.input_disabled && !self.reveal_pending && !self.is_terminal()
    }

    /// Returns the current progress snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            question_count: self.questions.len(),
            answered: self.cursor,
            transcript_len: self.transcript.len(),
            state: self.state(),
            reveal_pending: self.reveal_pending,
            input_enabled: self.input_enabled(),
        }
    }

    fn check(&self, text: &str) -> Option<Rejection> {
        if self.input_disabled || self.is_terminal() {
            Some(Rejection::Terminal)
        } else if self.reveal_pending {
            Some(Rejection::RevealPending)
        } else if text.trim().is_empty() {
            Some(Rejection::Blank)
        } else {
            None
        }
    }

    fn reveal(&mut self, renderer: &mut dyn Renderer) -> Advance {
        match self.questions.get(self.cursor) {
            Some(question) => {
                let entry = self.transcript.push(Role::Question, question);
                renderer.print_bubble(entry);
                renderer.set_input_enabled(true);
                QUESTIONS_REVEALED.click();
                debug!(index = self.cursor, "question revealed");
                Advance::Question(self.cursor)
            }
            None => {
                let entry = self
                    .transcript
                    .push(Role::System, self.completion_message.as_str());
                renderer.print_bubble(entry);
                self.input_disabled = true;
                renderer.set_input_enabled(false);
                SESSIONS_COMPLETED.click();
                info!(answered = self.cursor, "exam session complete");
                Advance::Completed
            }
        }
    }
}
