//! Operator-visible notices.
//!
//! The input gate reports a fallback through a `NoticeSink` so hosts can
//! route it to a terminal, a chat transcript, or a test buffer.

use parking_lot::Mutex;

use crate::utilities::printer::{Printer, PrinterColor};

/// Receives user-visible notices.
pub trait NoticeSink: Send + Sync {
    fn notice(&self, message: &str);
}

/// Prints notices to the console in yellow.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotices {
    printer: Printer,
}

impl ConsoleNotices {
    pub fn new(printer: Printer) -> Self {
        Self { printer }
    }
}

impl NoticeSink for ConsoleNotices {
    fn notice(&self, message: &str) {
        self.printer
            .print(&format!("⏰ {}", message), PrinterColor::BoldYellow);
    }
}

/// Keeps notices in memory.
#[derive(Debug, Default)]
pub struct CollectingNotices {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every notice received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl NoticeSink for CollectingNotices {
    fn notice(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
