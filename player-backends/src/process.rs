//! Subprocess plumbing shared by the backend adapters.
//!
//! Spawning, availability probing, signalling and output draining all live
//! here; the adapters only decide which arguments to build and what to do
//! with each drained line.

use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// How a backend wants the subprocess's stdout handled.
///
/// Leaving the pipe unread is not an option: some players flood stdout and
/// a full pipe buffer stalls playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StdoutMode {
    /// Discard at spawn time.
    Discard,
    /// Pipe it back so the adapter can drain it into its logger.
    Capture,
}

/// Spawn a player binary with the engine's stdio policy: stdin closed,
/// stderr piped for draining, stdout per `mode`.
///
/// A custom environment replaces the inherited one wholesale; `None`
/// inherits the host environment.
pub(crate) fn spawn_player(
    binary: &'static str,
    args: &[String],
    env: Option<&HashMap<String, String>>,
    stdout: StdoutMode,
) -> std::io::Result<Child> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(match stdout {
            StdoutMode::Discard => Stdio::null(),
            StdoutMode::Capture => Stdio::piped(),
        })
        .stderr(Stdio::piped());

    if let Some(env) = env {
        command.env_clear().envs(env);
    }

    command.spawn()
}

/// Probe a binary by running `<binary> --version` with all stdio closed.
///
/// Never errors: a missing binary, a spawn refusal or a non-zero exit all
/// read as "not installed". No timeout is enforced.
pub(crate) async fn version_probe(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Probe a binary by resolving it on `PATH`.
pub(crate) fn binary_on_path(binary: &str) -> bool {
    which::which(binary).is_ok()
}

/// Best-effort SIGINT to a tracked pid.
///
/// An already-exited process is not an error; ESRCH is simply ignored.
#[cfg(unix)]
pub(crate) fn interrupt(pid: i32) {
    unsafe {
        libc::kill(pid, libc::SIGINT);
    }
}

/// Signal delivery is a unix concern; elsewhere this is a no-op and the
/// subprocess winds down on its own when playback ends.
#[cfg(not(unix))]
pub(crate) fn interrupt(_pid: i32) {}

/// Best-effort `killall -SIGINT <name>`, for backends whose binary detaches
/// from the spawned child. Failures (nothing to kill, no killall on PATH)
/// are ignored.
pub(crate) async fn broadcast_interrupt(process_name: &str) {
    let _ = Command::new("killall")
        .arg("-SIGINT")
        .arg(process_name)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
}

/// Forward each line of a subprocess stream to `forward` until EOF.
///
/// A read error (a binary writing non-UTF-8, a vanished pipe) ends the
/// drain like EOF does; it is traced, not surfaced.
pub(crate) fn drain_lines<R>(
    stream: R,
    forward: impl Fn(String) + Send + 'static,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => forward(line),
                Ok(None) => break,
                Err(error) => {
                    tracing::debug!(%error, "output drain ended on a read error");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_missing_binary_not_on_path() {
        assert!(!binary_on_path("definitely-not-a-real-player-binary"));
    }

    #[tokio::test]
    async fn test_version_probe_missing_binary() {
        assert!(!version_probe("definitely-not-a-real-player-binary").await);
    }

    #[tokio::test]
    async fn test_drain_lines_forwards_every_line() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&collected);

        let handle = drain_lines(&b"first\nsecond\nthird"[..], move |line| {
            sink.lock().unwrap().push(line);
        });
        handle.await.unwrap();

        let lines = collected.lock().unwrap();
        assert_eq!(*lines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_drain_lines_ends_on_unreadable_output() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&collected);

        // Invalid UTF-8 aborts the line reader; the drain must end there
        // instead of spinning or panicking.
        let handle = drain_lines(&b"ok\n\xff\xfe garbage\nnever read"[..], move |line| {
            sink.lock().unwrap().push(line);
        });
        handle.await.unwrap();

        assert_eq!(*collected.lock().unwrap(), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_spawn_player_missing_binary_errors() {
        let result = spawn_player(
            "definitely-not-a-real-player-binary",
            &["--version".to_string()],
            None,
            StdoutMode::Discard,
        );
        assert!(result.is_err());
    }
}
