//! Console printer with ANSI color support.
//!
//! Used for operator-facing output (prompts, notices, tool listings), kept
//! apart from diagnostic logging.

use std::io::{self, Write};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    BoldYellow,
    BoldCyan,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Printer for console output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    /// Emit plain text without escape codes.
    pub plain: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { plain: true }
    }

    /// Render `content` in `color`.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        if self.plain {
            content.to_string()
        } else {
            format!("{}{}{}", color.ansi_code(), content, RESET)
        }
    }

    /// Print a line to stdout.
    pub fn print(&self, content: &str, color: PrinterColor) {
        // A closed stdout is not worth failing the caller over.
        let _ = self.print_to(&mut io::stdout().lock(), content, color);
    }

    /// Write a colored line to `out`.
    pub fn print_to<W: Write>(&self, out: &mut W, content: &str, color: PrinterColor) -> io::Result<()> {
        writeln!(out, "{}", self.paint(content, color))
    }
}
