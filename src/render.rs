//! Output rendering for streamed chat responses.
//!
//! This module provides the renderer trait and a plain-text
//! implementation with optional ANSI styling.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI escape code for bold green text (used for the prompt model name).
pub const ANSI_BOLD_GREEN: &str = "\x1b[1;32m";

/// ANSI escape code for magenta text (used for the prompt sigil).
pub const ANSI_MAGENTA: &str = "\x1b[0;35m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
pub const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering streaming output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// This is called incrementally as tokens are streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout, flushing after each
/// chunk so streamed tokens appear immediately.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    interrupted: Option<Arc<AtomicBool>>,
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
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("\n{ANSI_RED}Error:{ANSI_RESET} {error}");
        } else {
            eprintln!("\nError: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        println!("\n[interrupted]");
        self.flush();
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
