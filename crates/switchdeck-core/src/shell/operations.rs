use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::shell::errors::ShellError;
use crate::shell::types::{ScriptHost, UTF8_BOM};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run `script` with the given host and return its stdout.
///
/// The script body is written to a uniquely named temp file which is removed
/// on every exit path. Output goes to anonymous temp files rather than pipes,
/// so a chatty script can never block on a full pipe while we poll for exit.
///
/// With `timeout = None` the call waits for the script to exit, however long
/// that takes. Otherwise the child is killed once the budget is spent and
/// [`ShellError::Timeout`] is returned.
pub fn run_script(
    host: &ScriptHost,
    script: &str,
    timeout: Option<Duration>,
) -> Result<String, ShellError> {
    let script_path = write_script_file(host, script)?;

    debug!(
        event = "core.shell.script_started",
        program = %host.program,
        script = %script_path.display(),
        timeout_ms = timeout.map(|t| t.as_millis() as u64)
    );

    let started = Instant::now();
    let result = execute(host, &script_path, timeout);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Err(e) = script_path.close() {
        warn!(
            event = "core.shell.script_cleanup_failed",
            error = %e,
            message = "Failed to remove temporary script file"
        );
    }

    match &result {
        Ok(_) => debug!(event = "core.shell.script_completed", elapsed_ms),
        Err(ShellError::Timeout { timeout_ms }) => warn!(
            event = "core.shell.script_timed_out",
            program = %host.program,
            timeout_ms
        ),
        Err(e) => warn!(
            event = "core.shell.script_failed",
            program = %host.program,
            elapsed_ms,
            error = %e
        ),
    }

    if timeout.is_none() && elapsed_ms > 10_000 {
        info!(
            event = "core.shell.script_slow",
            program = %host.program,
            elapsed_ms
        );
    }

    result
}

/// Write `script` to a fresh temp file, prefixed with a BOM when the host needs one.
pub fn write_script_file(host: &ScriptHost, script: &str) -> Result<TempPath, ShellError> {
    let suffix = format!(".{}", host.extension);
    let mut file = tempfile::Builder::new()
        .prefix("switchdeck-script-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| ShellError::ScriptWriteFailed { source: e })?;

    let write = |file: &mut tempfile::NamedTempFile| -> std::io::Result<()> {
        if host.byte_order_mark {
            file.write_all(UTF8_BOM)?;
        }
        file.write_all(script.as_bytes())?;
        file.flush()
    };
    write(&mut file).map_err(|e| ShellError::ScriptWriteFailed { source: e })?;

    // Close our handle so the host can open the file on platforms with
    // mandatory sharing modes. The path is still removed on drop.
    Ok(file.into_temp_path())
}

fn execute(
    host: &ScriptHost,
    script_path: &TempPath,
    timeout: Option<Duration>,
) -> Result<String, ShellError> {
    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let mut child = Command::new(&host.program)
        .args(&host.args)
        .arg(script_path.as_os_str())
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()
        .map_err(|e| ShellError::SpawnFailed {
            program: host.program.clone(),
            source: e,
        })?;

    let status = wait_for_exit(&mut child, timeout)?;

    let stdout = read_captured(&mut stdout_file)?;
    if !status.success() {
        let stderr = read_captured(&mut stderr_file)?;
        return Err(ShellError::ExecutionFailed {
            exit_code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout)
}

fn wait_for_exit(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, ShellError> {
    let Some(timeout) = timeout else {
        return Ok(child.wait()?);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!(
                    event = "core.shell.kill_failed",
                    pid = child.id(),
                    error = %e
                );
            }
            // Reap the child so it does not linger as a zombie.
            let _ = child.wait();
            return Err(ShellError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn read_captured(file: &mut File) -> Result<String, ShellError> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_file_has_bom_when_requested() {
        let mut host = ScriptHost::powershell();
        host.byte_order_mark = true;

        let path = write_script_file(&host, "Write-Output 'hi'").unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert_eq!(&bytes[3..], b"Write-Output 'hi'");
        assert!(path.to_string_lossy().ends_with(".ps1"));
    }

    #[test]
    fn test_script_file_without_bom() {
        let host = ScriptHost::new("sh", &[]);
        let path = write_script_file(&host, "echo hi").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"echo hi");
    }

    #[test]
    fn test_script_file_names_are_unique() {
        let host = ScriptHost::new("sh", &[]);
        let a = write_script_file(&host, "true").unwrap();
        let b = write_script_file(&host, "true").unwrap();
        assert_ne!(a.to_path_buf(), b.to_path_buf());
    }

    #[test]
    fn test_script_file_removed_on_drop() {
        let host = ScriptHost::new("sh", &[]);
        let path = write_script_file(&host, "true").unwrap();
        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }

    #[test]
    fn test_missing_host_is_spawn_error() {
        let host = ScriptHost::new("switchdeck-no-such-interpreter", &[]);
        let err = run_script(&host, "echo hi", Some(Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, ShellError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn sh() -> ScriptHost {
            ScriptHost::new("sh", &[])
        }

        #[test]
        fn test_captures_stdout() {
            let out = run_script(&sh(), "echo hello\necho world", Some(Duration::from_secs(5)))
                .unwrap();
            assert_eq!(out, "hello\nworld\n");
        }

        #[test]
        fn test_non_zero_exit_reports_code_and_stderr() {
            let err = run_script(&sh(), "echo boom >&2\nexit 3", Some(Duration::from_secs(5)))
                .unwrap_err();
            match err {
                ShellError::ExecutionFailed { exit_code, stderr } => {
                    assert_eq!(exit_code, Some(3));
                    assert_eq!(stderr, "boom");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_timeout_kills_script() {
            let started = Instant::now();
            let err = run_script(&sh(), "sleep 5", Some(Duration::from_millis(200))).unwrap_err();
            assert!(matches!(err, ShellError::Timeout { timeout_ms: 200 }));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn test_unbounded_wait() {
            let out = run_script(&sh(), "echo done", None).unwrap();
            assert_eq!(out.trim(), "done");
        }

        #[test]
        fn test_script_file_cleaned_up_after_run() {
            let out = run_script(&sh(), "echo \"$0\"", Some(Duration::from_secs(5))).unwrap();
            let script_path = std::path::PathBuf::from(out.trim());
            assert!(script_path.to_string_lossy().contains("switchdeck-script-"));
            assert!(!script_path.exists());
        }

        #[test]
        fn test_script_file_cleaned_up_after_failure() {
            let err = run_script(&sh(), "echo \"$0\" >&2\nexit 1", Some(Duration::from_secs(5)))
                .unwrap_err();
            let ShellError::ExecutionFailed { stderr, .. } = err else {
                panic!("expected execution failure");
            };
            assert!(!std::path::Path::new(&stderr).exists());
        }
    }
}
