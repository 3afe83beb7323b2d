//! Input channels the timeout gate reads operator values from.
//!
//! The gate makes no assumption about transport: a terminal, a web socket
//! handler, or a UI callback all plug in through `InputChannel`.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

/// A source of operator-supplied values.
#[async_trait]
pub trait InputChannel: Send + Sync {
    /// Ask for a value and wait for it.
    ///
    /// Dropping the returned future abandons the request; implementations
    /// must tolerate that.
    async fn read_value(&self, prompt: &str) -> io::Result<String>;
}

// ---------------------------------------------------------------------------
// Stdin
// ---------------------------------------------------------------------------

type LineReceiver = mpsc::UnboundedReceiver<io::Result<String>>;

/// Reads lines from the process's stdin.
///
/// Lines are read on a detached thread started by the first request and
/// queued for the channel. The thread never holds up runtime shutdown, and
/// a line that arrives after its request was abandoned answers the next one.
#[derive(Debug, Default)]
pub struct StdinInputChannel {
    lines: Mutex<Option<LineReceiver>>,
}

impl StdinInputChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InputChannel for StdinInputChannel {
    async fn read_value(&self, prompt: &str) -> io::Result<String> {
        {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
        }

        let mut lines = self.lines.lock().await;
        let receiver = lines.get_or_insert_with(spawn_stdin_reader);
        next_line(receiver).await
    }
}

fn spawn_stdin_reader() -> LineReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    let on_failure = tx.clone();
    let spawned = std::thread::Builder::new()
        .name("crewgate-stdin".to_string())
        .spawn(move || pump_lines(io::stdin().lock(), &tx));
    if let Err(e) = spawned {
        log::warn!("Could not start stdin reader: {}", e);
        let _ = on_failure.send(Err(e));
    }
    rx
}

/// Forward lines from `reader` until EOF, a read error, or the receiver
/// going away. The terminating error is forwarded too.
fn pump_lines<R: BufRead>(mut reader: R, tx: &mpsc::UnboundedSender<io::Result<String>>) {
    loop {
        match read_line(&mut reader) {
            Ok(line) => {
                if tx.send(Ok(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

async fn next_line(receiver: &mut LineReceiver) -> io::Result<String> {
    match receiver.recv().await {
        Some(line) => line,
        None => Err(stdin_closed()),
    }
}

/// Read one line without its trailing `\n` or `\r\n`. EOF is `UnexpectedEof`.
pub(crate) fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(stdin_closed());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn stdin_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")
}

// ---------------------------------------------------------------------------
// Reply queue
// ---------------------------------------------------------------------------

/// Values pushed by the host (web socket handler, UI callback, ...).
///
/// Each request takes the next queued reply. Once every sender is dropped
/// and the queue is drained, reads fail with `BrokenPipe`.
#[derive(Debug)]
pub struct ReplyInputChannel {
    replies: Mutex<mpsc::Receiver<String>>,
}

impl ReplyInputChannel {
    /// Create a channel plus the sender the host answers through.
    pub fn new(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                replies: Mutex::new(rx),
            },
        )
    }
}

#[async_trait]
impl InputChannel for ReplyInputChannel {
    async fn read_value(&self, prompt: &str) -> io::Result<String> {
        log::debug!("Waiting for reply to prompt: {}", prompt);
        let mut replies = self.replies.lock().await;
        replies
            .recv()
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "reply channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stdin_fed_by(input: &str) -> StdinInputChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        pump_lines(Cursor::new(input.to_string()), &tx);
        StdinInputChannel {
            lines: Mutex::new(Some(rx)),
        }
    }

    #[test]
    fn test_read_line_trims_line_endings() {
        assert_eq!(read_line(&mut Cursor::new("Ada\r\n")).unwrap(), "Ada");
        assert_eq!(read_line(&mut Cursor::new("Grace\nHopper\n")).unwrap(), "Grace");
        assert_eq!(read_line(&mut Cursor::new("no newline")).unwrap(), "no newline");
    }

    #[test]
    fn test_read_line_eof() {
        let err = read_line(&mut Cursor::new("")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_stdin_channel_reads_queued_lines_then_eof() {
        let channel = stdin_fed_by("first\r\nsecond\n");
        assert_eq!(channel.read_value("a? ").await.unwrap(), "first");
        assert_eq!(channel.read_value("b? ").await.unwrap(), "second");

        let err = channel.read_value("c? ").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        // The reader is gone; later reads keep reporting EOF.
        let err = channel.read_value("d? ").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_stdin_channel_keeps_late_line_for_next_request() {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = StdinInputChannel {
            lines: Mutex::new(Some(rx)),
        };

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            channel.read_value("first? "),
        )
        .await;
        assert!(abandoned.is_err());

        tx.send(Ok("late".to_string())).unwrap();
        assert_eq!(channel.read_value("second? ").await.unwrap(), "late");
    }

    #[tokio::test]
    async fn test_reply_channel_delivers_in_order() {
        let (tx, channel) = ReplyInputChannel::new(4);
        tx.send("first".to_string()).await.unwrap();
        tx.send("second".to_string()).await.unwrap();

        assert_eq!(channel.read_value("a?").await.unwrap(), "first");
        assert_eq!(channel.read_value("b?").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_reply_channel_closed() {
        let (tx, channel) = ReplyInputChannel::new(1);
        drop(tx);
        let err = channel.read_value("anyone?").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
