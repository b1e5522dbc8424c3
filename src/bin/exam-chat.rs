//! Interactive exam in the terminal.
//!
//! This binary walks a question file one question at a time, echoing each
//! answer and revealing the next question after a short pause.
//!
//! # Usage
//!
//! ```bash
//! # One question per line
//! exam-chat questions.txt
//!
//! # A JSON list or {"q1": "...", "q2": "..."} mapping, first 6 questions only
//! exam-chat --max-questions 6 questions.json
//!
//! # Faster pacing, no colors, transcript written on exit
//! exam-chat --delay-ms 100 --no-color --transcript exam.json questions.yaml
//! ```
//!
//! # Commands
//!
//! While answering, you can use slash commands:
//! - `/help` - Show available commands
//! - `/stats` - Show exam progress
//! - `/save <file>` - Save the transcript now
//! - `/quit` - Leave the exam
//!
//! Start an answer with `//` to submit a literal leading slash.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use exam_chat::{
    Entry, ExamArgs, ExamChat, ExamChatHandle, ExamCommand, ExamConfig, ExamInput, ExitReason,
    PlainTextRenderer, QuestionSet, Renderer,
};

/// Renders to the terminal and tells the reader thread when to prompt.
struct TerminalRenderer {
    inner: PlainTextRenderer,
    ready: Sender<bool>,
}

impl Renderer for TerminalRenderer {
    fn print_bubble(&mut self, entry: &Entry) {
        self.inner.print_bubble(entry);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.inner.set_input_enabled(enabled);
        let _ = self.ready.send(enabled);
    }

    fn print_error(&mut self, error: &str) {
        self.inner.print_error(error);
    }

    fn print_info(&mut self, info: &str) {
        self.inner.print_info(info);
    }
}

/// Main entry point for the exam-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (args, files) =
        ExamArgs::from_command_line_relaxed("exam-chat [OPTIONS] <QUESTIONS>...");
    if files.is_empty() {
        eprintln!("Error: Must specify at least one question file");
        std::process::exit(1);
    }
    let config = ExamConfig::from(args);

    let mut questions = QuestionSet::default();
    for file in &files {
        questions = questions.concat(QuestionSet::from_file(file)?);
    }

    let (ready_tx, ready_rx) = mpsc::channel();
    let renderer = TerminalRenderer {
        inner: PlainTextRenderer::with_color(config.use_color),
        ready: ready_tx,
    };

    println!("Exam ({} questions)", questions.len());
    println!("Type /help for commands, /quit to leave\n");

    let (chat, handle) = ExamChat::start(questions, &config, renderer);

    let shutdown = handle.shutdown_token();
    ctrlc::set_handler(move || {
        shutdown.cancel();
    })?;

    let reader = {
        let handle = handle.clone();
        thread::spawn(move || read_answers(handle, ready_rx))
    };
    drop(handle);

    let outcome = chat.run().await;
    match outcome.reason {
        ExitReason::Completed => {}
        ExitReason::TornDown => println!("\nExam closed before completion."),
        ExitReason::Disconnected => println!("\nInput closed."),
    }

    if let Some(path) = &config.transcript_path {
        let session = &outcome.session;
        match session.transcript().save_to(path, session.questions()) {
            Ok(()) => println!("Transcript saved to {}", path.display()),
            Err(err) => eprintln!("Error: failed to save transcript: {err}"),
        }
    }

    // The renderer went away with the driver, closing the ready channel.
    let _ = reader.join();
    Ok(())
}

/// Reads lines whenever the exam is ready for input and forwards them.
fn read_answers(handle: ExamChatHandle, ready: Receiver<bool>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Error: {err}");
            handle.teardown();
            return;
        }
    };

    while let Ok(enabled) = ready.recv() {
        if !enabled {
            continue;
        }
        let input = loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);
                    break ExamInput::parse(line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    break ExamInput::Command(ExamCommand::Quit);
                }
                Err(err) => {
                    eprintln!("Error: input error: {err}");
                    break ExamInput::Command(ExamCommand::Quit);
                }
            }
        };
        if handle.send(input).is_err() {
            return;
        }
    }
}
