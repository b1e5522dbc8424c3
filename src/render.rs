//! Output rendering for exam chat sessions.
//!
//! A session never writes output directly. Every bubble it appends to its
//! transcript is handed to a [`Renderer`], along with changes to whether the
//! answer input should currently accept text.

use std::io::{self, Stdout, Write};

use crate::exam::{Entry, Role};

/// ANSI escape code for bold text (used for labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for answers).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for questions).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for answers).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for system messages).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering exam chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests, or a UI that appends one element per bubble
pub trait Renderer: Send {
    /// Render one bubble that was just appended to the transcript.
    ///
    /// [`Role::class_name`] gives the style tag for the bubble.
    fn print_bubble(&mut self, entry: &Entry);

    /// Enable or disable the answer input.
    ///
    /// Called with `true` whenever a question is shown, with `false` while the
    /// next reveal is pending, and with `false` for the last time once the
    /// completion bubble has been printed.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    input_enabled: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            input_enabled: false,
        }
    }

    /// Whether the most recent [`Renderer::set_input_enabled`] call enabled input.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a bubble as a single line of text.
pub(crate) fn format_bubble(entry: &Entry, use_color: bool) -> String {
    let label = entry.role.class_name();
    if !use_color {
        return format!("[{label}] {}", entry.text);
    }
    match entry.role {
        Role::Question => format!("{ANSI_BOLD}{ANSI_CYAN}{label}:{ANSI_RESET} {}", entry.text),
        Role::Answer => format!(
            "{ANSI_GREEN}{label}:{ANSI_RESET} {ANSI_DIM}{}{ANSI_RESET}",
            entry.text
        ),
        Role::System => format!("{ANSI_BOLD}{ANSI_YELLOW}{}{ANSI_RESET}", entry.text),
    }
}

impl Renderer for PlainTextRenderer {
    fn print_bubble(&mut self, entry: &Entry) {
        println!("{}", format_bubble(entry, self.use_color));
        self.flush();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
        assert!(!renderer.input_enabled());
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_bubbles_are_tagged_by_role() {
        let entry = Entry::new(Role::Question, "2+2=?");
        assert_eq!(format_bubble(&entry, false), "[question] 2+2=?");
        let entry = Entry::new(Role::System, "done");
        assert_eq!(format_bubble(&entry, false), "[system] done");
    }

    #[test]
    fn colored_bubbles_reset_styles() {
        let entry = Entry::new(Role::Answer, "4");
        let line = format_bubble(&entry, true);
        assert!(line.starts_with(ANSI_GREEN));
        assert!(line.ends_with(ANSI_RESET));
        assert!(line.contains('4'));
    }

    #[test]
    fn input_toggle_is_tracked() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.set_input_enabled(true);
        assert!(renderer.input_enabled());
        renderer.set_input_enabled(false);
        assert!(!renderer.input_enabled());
    }
}
