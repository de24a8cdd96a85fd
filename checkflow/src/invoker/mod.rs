//! Tool invocation: one external process per call, with bounded
//! capture, timeout enforcement, and cancellation.
//!
//! The invoker never interprets a non-zero exit code as an error;
//! that is the pipeline runner's job. It raises only when the process
//! cannot be launched at all.

use crate::cancellation::CancellationToken;
use crate::core::ToolExit;
use crate::errors::LaunchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// A fully-resolved request to run one external tool.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// The executable to run.
    pub program: String,
    /// Arguments, already expanded (no template placeholders).
    pub args: Vec<String>,
    /// Working directory for the process.
    pub work_dir: PathBuf,
    /// Optional file fed to the process on stdin.
    pub stdin: Option<PathBuf>,
    /// Wall-clock budget for the process.
    pub timeout: Duration,
    /// Maximum bytes captured per stream.
    pub capture_cap: usize,
}

impl InvokeRequest {
    /// Creates a request with defaults for the optional fields.
    #[must_use]
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            stdin: None,
            timeout: Duration::from_secs(60),
            capture_cap: 1024 * 1024,
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the stdin source file.
    #[must_use]
    pub fn with_stdin(mut self, stdin: impl Into<PathBuf>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the capture cap.
    #[must_use]
    pub fn with_capture_cap(mut self, cap: usize) -> Self {
        self.capture_cap = cap;
        self
    }
}

/// One captured output stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapturedStream {
    /// The captured text (lossy UTF-8).
    pub text: String,
    /// Whether output beyond the cap was discarded.
    pub truncated: bool,
}

impl CapturedStream {
    /// Returns the last `max_lines` lines, for diagnostics.
    #[must_use]
    pub fn tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self.text.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

/// The captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// How the process ended.
    pub exit: ToolExit,
    /// Captured stdout.
    pub stdout: CapturedStream,
    /// Captured stderr.
    pub stderr: CapturedStream,
    /// Wall-clock duration of the invocation.
    pub duration: Duration,
}

impl ToolResult {
    fn ended(exit: ToolExit, started: Instant) -> Self {
        Self {
            exit,
            stdout: CapturedStream::default(),
            stderr: CapturedStream::default(),
            duration: started.elapsed(),
        }
    }
}

/// Runs one external tool to completion.
///
/// Waits up to `request.timeout`; on timeout the process is killed and
/// the result is marked [`ToolExit::TimedOut`]. If the cancellation
/// token fires while the process runs, it is killed and the result is
/// marked [`ToolExit::Cancelled`]. Both streams are captured up to the
/// cap; excess output is drained (so the child never blocks on a full
/// pipe) and the truncation is recorded.
///
/// # Errors
///
/// Returns [`LaunchError`] only when the process cannot be started:
/// missing binary, permission denied, or an unreadable stdin file.
pub async fn invoke(
    request: &InvokeRequest,
    cancel: &CancellationToken,
) -> Result<ToolResult, LaunchError> {
    let started = Instant::now();

    if cancel.is_cancelled() {
        return Ok(ToolResult::ended(ToolExit::Cancelled, started));
    }

    let stdin = match &request.stdin {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|source| LaunchError::new(&request.program, source))?;
            Stdio::from(file)
        }
        None => Stdio::null(),
    };

    let mut child = Command::new(&request.program)
        .args(&request.args)
        .current_dir(&request.work_dir)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| LaunchError::new(&request.program, source))?;

    debug!(program = %request.program, args = ?request.args, "spawned tool");

    let cap = request.capture_cap;
    let stdout_task = child
        .stdout
        .take()
        .map(|out| tokio::spawn(read_capped(out, cap)));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| tokio::spawn(read_capped(err, cap)));

    let waited = tokio::select! {
        res = tokio::time::timeout(request.timeout, child.wait()) => Some(res),
        () = cancel.cancelled() => None,
    };

    let exit = match waited {
        None => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            ToolExit::Cancelled
        }
        Some(Err(_elapsed)) => {
            warn!(program = %request.program, timeout = ?request.timeout, "tool timed out");
            let _ = child.start_kill();
            let _ = child.wait().await;
            ToolExit::TimedOut
        }
        Some(Ok(Ok(status))) => status.code().map_or(ToolExit::Signaled, ToolExit::Code),
        Some(Ok(Err(source))) => return Err(LaunchError::new(&request.program, source)),
    };

    let stdout = collect_stream(stdout_task).await;
    let stderr = collect_stream(stderr_task).await;

    Ok(ToolResult {
        exit,
        stdout,
        stderr,
        duration: started.elapsed(),
    })
}

async fn collect_stream(
    task: Option<tokio::task::JoinHandle<std::io::Result<CapturedStream>>>,
) -> CapturedStream {
    match task {
        Some(handle) => match handle.await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                warn!(error = %err, "failed reading tool output");
                CapturedStream::default()
            }
            Err(err) => {
                warn!(error = %err, "tool output reader panicked");
                CapturedStream::default()
            }
        },
        None => CapturedStream::default(),
    }
}

/// Reads a stream to EOF, keeping at most `cap` bytes.
///
/// The stream is always drained so the child process never deadlocks
/// on a full pipe.
async fn read_capped<R>(mut reader: R, cap: usize) -> std::io::Result<CapturedStream>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut kept: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        if kept.len() < cap {
            let take = n.min(cap - kept.len());
            kept.extend_from_slice(&chunk[..take]);
            if take < n {
                truncated = true;
            }
        } else {
            truncated = true;
        }
    }

    Ok(CapturedStream {
        text: String::from_utf8_lossy(&kept).into_owned(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, dir: &std::path::Path) -> InvokeRequest {
        InvokeRequest::new("sh", dir).with_args(["-c", script])
    }

    #[tokio::test]
    async fn test_invoke_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();

        let result = invoke(&sh("printf 'hello\\n'", dir.path()), &cancel)
            .await
            .unwrap();

        assert_eq!(result.exit, ToolExit::Code(0));
        assert_eq!(result.stdout.text, "hello\n");
        assert!(!result.stdout.truncated);
    }

    #[tokio::test]
    async fn test_invoke_nonzero_exit_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();

        let result = invoke(&sh("exit 3", dir.path()), &cancel).await.unwrap();

        assert_eq!(result.exit, ToolExit::Code(3));
        assert!(!result.exit.is_clean());
    }

    #[tokio::test]
    async fn test_invoke_missing_binary_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let request = InvokeRequest::new("/nonexistent/tool-binary", dir.path());

        let err = invoke(&request, &cancel).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tool-binary"));
    }

    #[tokio::test]
    async fn test_invoke_timeout_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let request = sh("sleep 10", dir.path()).with_timeout(Duration::from_millis(100));

        let started = Instant::now();
        let result = invoke(&request, &cancel).await.unwrap();

        assert_eq!(result.exit, ToolExit::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_invoke_truncates_at_cap_without_deadlock() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        // 64 KiB of output against a 1 KiB cap.
        let request = sh(
            "i=0; while [ $i -lt 1024 ]; do printf '0123456789012345678901234567890123456789012345678901234567890123'; i=$((i+1)); done",
            dir.path(),
        )
        .with_capture_cap(1024);

        let result = invoke(&request, &cancel).await.unwrap();

        assert_eq!(result.exit, ToolExit::Code(0));
        assert!(result.stdout.truncated);
        assert_eq!(result.stdout.text.len(), 1024);
    }

    #[tokio::test]
    async fn test_invoke_cancellation_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = std::sync::Arc::new(CancellationToken::new());

        let killer = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel("test cancel");
            })
        };

        let request = sh("sleep 10", dir.path()).with_timeout(Duration::from_secs(30));
        let result = invoke(&request, &cancel).await.unwrap();

        assert_eq!(result.exit, ToolExit::Cancelled);
        killer.await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_feeds_stdin_file() {
        let dir = tempfile::tempdir().unwrap();
        let stdin_path = dir.path().join("input.txt");
        std::fs::write(&stdin_path, "42 7\n").unwrap();
        let cancel = CancellationToken::new();

        let request = sh("cat", dir.path()).with_stdin(&stdin_path);
        let result = invoke(&request, &cancel).await.unwrap();

        assert_eq!(result.exit, ToolExit::Code(0));
        assert_eq!(result.stdout.text, "42 7\n");
    }

    #[test]
    fn test_captured_stream_tail() {
        let stream = CapturedStream {
            text: "a\nb\nc\nd\n".to_string(),
            truncated: false,
        };
        assert_eq!(stream.tail(2), "c\nd");
        assert_eq!(stream.tail(10), "a\nb\nc\nd");
    }
}
