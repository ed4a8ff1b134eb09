//! External command execution.
//!
//! Every tool invocation in the install flow goes through [`run`] so that a
//! non-zero exit aborts the run with the command line and the tail of its
//! stderr attached.

use std::process::{Command, ExitStatus, Output};

use thiserror::Error;

/// Number of stderr lines kept in a [`CommandError::Failed`].
const STDERR_TAIL_LINES: usize = 20;

/// Errors from running an external program.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The executable does not exist.
    #[error("'{program}' not found")]
    NotFound {
        /// Program as passed to [`Command::new`]
        program: String,
    },

    /// The process could not be started for another reason.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program as passed to [`Command::new`]
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("Failed to execute: {command} ({status}){tail}", tail = stderr_suffix(.stderr))]
    Failed {
        /// Full command line
        command: String,
        /// Exit status
        status: ExitStatus,
        /// Last lines of stderr
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

/// Render a command line for logs and error messages.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log line for a command about to run, naming its working directory if set.
fn announce(cmd: &Command, command: &str) -> String {
    if let Some(dir) = cmd.get_current_dir() {
        format!("Running command in '{}': '{command}'", dir.display())
    } else {
        format!("Running command: '{command}'")
    }
}

/// Run a command to completion, failing on a non-zero exit status.
///
/// Stdout and stderr are captured unless the caller already redirected them.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] if the program does not exist,
/// [`CommandError::Spawn`] for other spawn failures and
/// [`CommandError::Failed`] if it exits unsuccessfully.
pub fn run(cmd: &mut Command) -> Result<Output, CommandError> {
    let command = describe(cmd);
    tracing::debug!("{}", announce(cmd, &command));

    let output = match cmd.output() {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CommandError::NotFound {
                program: cmd.get_program().to_string_lossy().into_owned(),
            });
        }
        Err(source) => {
            return Err(CommandError::Spawn {
                program: cmd.get_program().to_string_lossy().into_owned(),
                source,
            });
        }
    };

    if !output.stdout.is_empty() {
        tracing::trace!("{}", String::from_utf8_lossy(&output.stdout));
    }

    if !output.status.success() {
        return Err(CommandError::Failed {
            command,
            status: output.status,
            stderr: last_lines(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
        });
    }

    Ok(output)
}

/// Keep only the last `n` lines of `text`.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_describe_joins_program_and_args() {
        let mut cmd = Command::new("7z");
        cmd.args(["x", "-aoa", "archive.zip"]);
        assert_eq!(describe(&cmd), "7z x -aoa archive.zip");
    }

    #[test]
    fn test_run_returns_stdout() {
        let out = run(Command::new("sh").args(["-c", "echo hello"])).unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_run_logs_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = logs_of(|| {
            run(Command::new("sh").args(["-c", "true"]).current_dir(dir.path())).unwrap();
        });

        let expected = format!("Running command in '{}': 'sh -c true'", dir.path().display());
        assert!(logs.contains(&expected), "logs: {logs}");
    }

    #[test]
    fn test_run_logs_command_without_directory() {
        let logs = logs_of(|| {
            run(Command::new("sh").args(["-c", "true"])).unwrap();
        });
        assert!(logs.contains("Running command: 'sh -c true'"), "logs: {logs}");
    }

    #[test]
    fn test_announce_names_directory() {
        let mut cmd = Command::new("gendef");
        cmd.arg("VSScript.dll").current_dir("/tmp/work");
        assert_eq!(
            announce(&cmd, &describe(&cmd)),
            "Running command in '/tmp/work': 'gendef VSScript.dll'"
        );
    }

    #[test]
    fn test_non_zero_exit_is_an_error_with_stderr_tail() {
        let err = run(Command::new("sh").args(["-c", "echo boom >&2; exit 3"])).unwrap_err();
        match &err {
            CommandError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to execute: sh -c"));
    }

    #[test]
    fn test_missing_program() {
        let err = run(&mut Command::new("vslibs-definitely-missing-tool")).unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }

    #[test]
    fn test_last_lines() {
        let text = (1..=30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = last_lines(&text, 3);
        assert_eq!(tail, "28\n29\n30");
    }
}
