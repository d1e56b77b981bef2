//! Encoder child process with a merged, line-oriented output stream

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{EncodeError, EncodeResult};

const LINE_CHANNEL_CAPACITY: usize = 1024;
const READ_CHUNK: usize = 4096;

/// Splits a byte stream on `\n` and `\r`.
///
/// ffmpeg redraws its stats line with bare carriage returns, so treating
/// only `\n` as a terminator would hold every progress update until exit.
/// Empty segments are skipped and bytes are decoded as lossy UTF-8.
pub struct LineSplitter<R> {
    reader: R,
    buf: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            eof: false,
        }
    }

    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            while let Some(pos) = self.buf.iter().position(|b| *b == b'\n' || *b == b'\r') {
                let segment: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = &segment[..segment.len() - 1];
                if !line.is_empty() {
                    return Ok(Some(String::from_utf8_lossy(line).into_owned()));
                }
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.buf);
                return Ok(Some(String::from_utf8_lossy(&rest).into_owned()));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

/// Running encoder whose stdout and stderr are read concurrently into one
/// line stream
pub struct EncoderProcess {
    child: Child,
    lines: mpsc::Receiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl EncoderProcess {
    /// Spawn `program` with `args`. stdin is closed so the encoder can never
    /// block on an interactive prompt.
    pub fn spawn(program: &Path, args: &[String]) -> EncodeResult<Self> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

        let mut child = command.spawn().map_err(|e| EncodeError::EncoderSpawn {
            message: format!("{}: {}", program.display(), e),
        })?;

        debug!(pid = ?child.id(), program = %program.display(), "Encoder spawned");

        let (tx, lines) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump_lines(stderr, tx)));
        }

        Ok(Self {
            child,
            lines,
            readers,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next line from either stream; `None` once both streams are closed
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Wait for the process to exit
    pub async fn wait(&mut self) -> EncodeResult<ExitStatus> {
        let status = self.child.wait().await?;
        for reader in self.readers.drain(..) {
            let _ = reader.await;
        }
        Ok(status)
    }

    /// Terminate the process and reap it
    pub async fn kill(&mut self) -> EncodeResult<()> {
        for reader in &self.readers {
            reader.abort();
        }
        self.child.kill().await?;
        Ok(())
    }
}

impl Drop for EncoderProcess {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

async fn pump_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::Sender<String>) {
    let mut splitter = LineSplitter::new(reader);
    loop {
        match splitter.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Encoder output read failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> Vec<String> {
        let mut splitter = LineSplitter::new(input);
        let mut lines = Vec::new();
        while let Some(line) = splitter.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_splits_on_newline_and_carriage_return() {
        let lines = collect(b"a\nb\rc\r\nd").await;
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_skips_empty_segments() {
        let lines = collect(b"\r\n\r\nframe=1 time=00:00:01.00\r").await;
        assert_eq!(lines, vec!["frame=1 time=00:00:01.00"]);
    }

    #[tokio::test]
    async fn test_lossy_decoding() {
        let lines = collect(b"ok \xff bytes\n").await;
        assert_eq!(lines, vec!["ok \u{fffd} bytes"]);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        assert!(collect(b"").await.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_missing_program_is_an_error() {
        let result = EncoderProcess::spawn(
            Path::new("/nonexistent/towebm/ffmpeg"),
            &["-version".to_string()],
        );
        assert!(matches!(result, Err(EncodeError::EncoderSpawn { .. })));
    }
}
