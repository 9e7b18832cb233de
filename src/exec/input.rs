// src/exec/input.rs

//! Terminal input and the per-process input forwarder.
//!
//! A single reader thread owns the terminal's stdin for the whole batch and
//! hands complete lines (terminator included) to whoever is consuming
//! [`TerminalInput`]: the running student program, or the final "press
//! Enter" gate. Keeping one reader means no typed-ahead bytes are lost
//! between two programs.

use std::io::BufRead;
use std::process::ExitStatus;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Buffered lines between the reader thread and the consumer.
const LINE_BUFFER: usize = 64;

/// Line-oriented view of the operator's terminal.
#[derive(Debug)]
pub struct TerminalInput {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl TerminalInput {
    /// Read the process stdin on a dedicated OS thread.
    ///
    /// A plain thread (rather than a Tokio blocking task) never holds up
    /// runtime shutdown while it sits in a blocking read.
    pub fn stdin() -> Self {
        let (tx, input) = Self::channel();
        std::thread::spawn(move || read_lines(std::io::stdin().lock(), tx));
        input
    }

    /// Read lines from any blocking reader on a dedicated OS thread.
    pub fn spawn_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, input) = Self::channel();
        std::thread::spawn(move || read_lines(reader, tx));
        input
    }

    /// An input fed directly through the returned sender. Dropping the sender
    /// is end of input.
    pub fn channel() -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        (tx, Self { rx })
    }

    /// Next complete line, or `None` at end of input.
    pub async fn next_line(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Block until the operator presses Enter (or input ends).
    pub async fn wait_for_newline(&mut self) {
        while let Some(line) = self.next_line().await {
            if line.ends_with(b"\n") {
                break;
            }
        }
    }
}

fn read_lines<R: BufRead>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) {
    loop {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                debug!("terminal input reached EOF");
                break;
            }
            Ok(_) => {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "reading terminal input failed; closing input");
                break;
            }
        }
    }
}

/// What to do with one line of operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Forward,
    Kill,
}

/// A line is a kill command only if it is exactly the kill character
/// followed by a line terminator (`\n` or `\r\n`). Works on whatever was
/// read, however short.
pub fn classify_line(line: &[u8], kill_char: u8) -> InputAction {
    let Some(body) = line.strip_suffix(b"\n") else {
        return InputAction::Forward;
    };
    let body = body.strip_suffix(b"\r").unwrap_or(body);
    if body == [kill_char].as_slice() {
        InputAction::Kill
    } else {
        InputAction::Forward
    }
}

/// How a forwarded child process ended.
#[derive(Debug, Clone, Copy)]
pub struct ForwardedExit {
    pub status: ExitStatus,
    /// True when the exit followed a kill line.
    pub killed: bool,
}

/// Feed operator input to `child` until it exits.
///
/// `preset` is written to the child's stdin first, as if it had been typed.
/// After that, every line except the kill line is written to the child's
/// stdin byte for byte. The kill line forcefully kills the child (no graceful
/// signal) and is not forwarded; lines queued behind it are left for the
/// next consumer. When terminal input ends, the child's stdin is closed so it
/// sees EOF.
///
/// Writes happen on a separate task, so a child that stops reading its stdin
/// can still be killed.
pub async fn forward_until_exit(
    child: &mut Child,
    input: &mut TerminalInput,
    kill_char: u8,
    preset: &[u8],
) -> std::io::Result<ForwardedExit> {
    let mut writer = child.stdin.take().map(StdinWriter::spawn);
    if !preset.is_empty() {
        if let Some(w) = writer.as_ref() {
            w.send(preset.to_vec());
        }
    }

    let mut input_open = true;
    let mut killed = false;

    let exit = loop {
        tokio::select! {
            status = child.wait() => {
                break status.map(|status| ForwardedExit { status, killed });
            }

            line = input.next_line(), if input_open && !killed => match line {
                Some(line) => match classify_line(&line, kill_char) {
                    InputAction::Kill => {
                        info!("kill line received; killing running program");
                        if let Err(e) = child.start_kill() {
                            warn!(error = %e, "failed to kill running program");
                        }
                        killed = true;
                        if let Some(w) = writer.take() {
                            w.abort();
                        }
                    }
                    InputAction::Forward => {
                        if let Some(w) = writer.as_ref() {
                            if !w.send(line) {
                                debug!("program stopped reading stdin; dropping input");
                                writer = None;
                            }
                        }
                    }
                },
                None => {
                    debug!("terminal input closed; closing program stdin");
                    input_open = false;
                    if let Some(w) = writer.take() {
                        w.close();
                    }
                }
            }
        }
    };

    if let Some(w) = writer {
        w.abort();
    }
    exit
}

/// Owns a child's stdin pipe and writes queued chunks to it in order.
#[derive(Debug)]
struct StdinWriter {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    task: JoinHandle<()>,
}

impl StdinWriter {
    fn spawn(mut pipe: ChildStdin) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let task = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                if let Err(e) = write_chunk(&mut pipe, &chunk).await {
                    debug!(error = %e, "writing to program stdin failed");
                    break;
                }
            }
        });
        Self { tx, task }
    }

    /// Queue a chunk; false once the pipe is gone.
    fn send(&self, chunk: Vec<u8>) -> bool {
        self.tx.send(chunk).is_ok()
    }

    /// Finish the queued writes, then close the pipe.
    fn close(self) {
        drop(self.tx);
    }

    /// Drop the pipe now, discarding anything still queued.
    fn abort(self) {
        self.task.abort();
    }
}

async fn write_chunk(pipe: &mut ChildStdin, chunk: &[u8]) -> std::io::Result<()> {
    pipe.write_all(chunk).await?;
    pipe.flush().await
}
