//! Command execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::error::{Error, Fix};

/// Result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (0 = success, -1 when killed by a signal)
    pub exit_code: i32,
    /// How long the command took
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Which child stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// A single line of streamed child output, without the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: StreamSource,
    pub line: String,
}

/// Runs external commands and streams their output.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    /// Working directory for commands
    pub working_dir: Option<PathBuf>,
}

impl CommandRunner {
    /// Create a new command runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn command(&self, program: &OsStr, args: &[std::ffi::OsString]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd
    }

    /// Run a command, handing every output line to `on_line` as it arrives.
    ///
    /// Lines from stdout and stderr are interleaved in arrival order. The
    /// call returns once the child has exited and both streams are drained.
    #[instrument(skip(self, args, on_line), fields(program = %program.as_ref().to_string_lossy()))]
    pub async fn run_streaming<S, I, F>(
        &self,
        program: S,
        args: I,
        mut on_line: F,
    ) -> Result<CommandOutput, Error>
    where
        S: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        F: FnMut(OutputLine),
    {
        let program_ref = program.as_ref();
        let args_vec: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();

        debug!(
            "Streaming command: {} {:?}",
            program_ref.to_string_lossy(),
            args_vec
        );

        let start = Instant::now();
        let mut child = self
            .command(program_ref, &args_vec)
            .spawn()
            .map_err(|e| spawn_error(program_ref, e))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, StreamSource::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, StreamSource::Stderr, tx.clone()));
        }
        drop(tx);

        while let Some(line) = rx.recv().await {
            on_line(line);
        }

        let status = child.wait().await.map_err(|e| Error::Io {
            message: format!("failed to wait for {}", program_ref.to_string_lossy()),
            path: self.working_dir.clone(),
            source: e,
        })?;

        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        debug!(
            exit_code = exit_code,
            duration_ms = duration.as_millis(),
            "Command completed"
        );

        Ok(CommandOutput {
            exit_code,
            duration,
        })
    }
}

async fn forward_lines<R>(reader: R, source: StreamSource, tx: mpsc::UnboundedSender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(OutputLine { source, line }).is_err() {
                    break;
                }
            }
        }
    }
}

fn spawn_error(program: &OsStr, e: std::io::Error) -> Error {
    let program_str = program.to_string_lossy().to_string();
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::ToolMissing {
            fixes: vec![Fix::new(format!(
                "Install `{}` and make sure it is on PATH",
                program_str
            ))],
            tool: program_str,
            source: e,
        }
    } else {
        Error::Io {
            message: format!("failed to execute {}", program_str),
            path: None,
            source: e,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_streaming_delivers_lines() {
        let mut lines = Vec::new();
        let output = CommandRunner::new()
            .run_streaming("sh", ["-c", "echo one; echo two 1>&2; echo three; exit 2"], |l| {
                lines.push(l)
            })
            .await
            .unwrap();

        assert_eq!(output.exit_code, 2);
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&OutputLine {
            source: StreamSource::Stderr,
            line: "two".into()
        }));
        let stdout: Vec<_> = lines
            .iter()
            .filter(|l| l.source == StreamSource::Stdout)
            .map(|l| l.line.as_str())
            .collect();
        assert_eq!(stdout, ["one", "three"]);
    }

    #[tokio::test]
    async fn test_working_dir_is_used() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "x").unwrap();
        let mut lines = Vec::new();
        let output = CommandRunner::new()
            .with_working_dir(temp.path())
            .run_streaming("ls", ["marker"], |l| lines.push(l.line))
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(lines, ["marker"]);
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let err = CommandRunner::new()
            .run_streaming("psqlvm-definitely-not-a-tool", Vec::<&str>::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolMissing { .. }));
    }
}
