//! Output rendering for the chat client.
//!
//! This module provides a trait-based rendering abstraction that allows
//! for different output styles. The default implementation writes to
//! stdout with optional ANSI styling for informational and verbose lines.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text (used for verbose accounting lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies: plain text
/// with ANSI styling, plain text without styling (for piping or
/// redirecting), or a recording sink in tests.
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// This is called incrementally with each newly appended suffix as a
    /// response streams in. Chunks arrive in order and must be displayed
    /// in order, without buffering.
    fn print_text(&mut self, text: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a verbose accounting line (token usage, request ids).
    fn print_verbose(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Called when a streamed response reaches its stop sentinel.
    ///
    /// Used to terminate the displayed message with a newline.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI styling enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout so streamed chunks appear immediately.
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

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn print_verbose(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_DIM}[Verbose] {info}{ANSI_RESET}");
        } else {
            println!("[Verbose] {info}");
        }
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }
}
