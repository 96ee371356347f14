//! Running ffmpeg over stdin/stdout pipes

use std::io::{self, Read, Write};
use std::process::{Child, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{AudioFfmpegError, Result};
use crate::ffmpeg::FfmpegCommand;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Classified result of one ffmpeg run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exit status 0; stdout bytes.
    Success(Vec<u8>),
    /// Killed after the deadline. `stderr` is `None` when it was inherited.
    Timeout { stderr: Option<Vec<u8>> },
    /// Non-zero exit (or no stdout). `status` is `None` when killed by a signal.
    Failure { status: Option<i32>, stderr: Option<Vec<u8>> },
}

/// Something that can run an ffmpeg command over pipes.
///
/// The subprocess implementation is [`SubprocessTranscoder`]; tests substitute
/// in-memory versions to exercise command construction and decoding.
pub trait MediaTranscoder {
    fn run(
        &self,
        command: &FfmpegCommand,
        input: &[u8],
        timeout: Option<Duration>,
        verbose: bool,
    ) -> Result<ProcessOutcome>;
}

/// Spawns the real ffmpeg binary.
///
/// stdin is written and stdout/stderr drained on scoped threads, so a large
/// buffer cannot stall on a full pipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessTranscoder;

impl MediaTranscoder for SubprocessTranscoder {
    fn run(
        &self,
        command: &FfmpegCommand,
        input: &[u8],
        timeout: Option<Duration>,
        verbose: bool,
    ) -> Result<ProcessOutcome> {
        if verbose {
            info!("{}", command);
        } else {
            debug!("{}", command);
        }

        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if verbose { Stdio::inherit() } else { Stdio::piped() })
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    AudioFfmpegError::tool_not_found(command.program().to_string_lossy())
                }
                _ => AudioFfmpegError::Io(e),
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        thread::scope(|scope| -> Result<ProcessOutcome> {
            let writer = stdin.map(|mut pipe| {
                scope.spawn(move || {
                    let written = pipe.write_all(input);
                    drop(pipe);
                    written
                })
            });
            let out_reader = stdout.map(|pipe| scope.spawn(move || read_to_end(pipe)));
            let err_reader = stderr.map(|pipe| scope.spawn(move || read_to_end(pipe)));

            let status = wait_with_deadline(&mut child, timeout);

            let written = join(writer).transpose();
            let stdout_bytes = join(out_reader).transpose()?;
            let stderr_bytes = join(err_reader).transpose()?;

            let Some(status) = status? else {
                warn!("ffmpeg killed after {:.3}s", timeout.unwrap_or_default().as_secs_f64());
                return Ok(ProcessOutcome::Timeout { stderr: stderr_bytes });
            };

            match written {
                Ok(_) => {}
                // ffmpeg may exit before consuming all input, e.g. on bad arguments
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("ffmpeg closed stdin early");
                }
                Err(e) => return Err(e.into()),
            }

            Ok(classify(status, stdout_bytes, stderr_bytes))
        })
    }
}

fn classify(status: ExitStatus, stdout: Option<Vec<u8>>, stderr: Option<Vec<u8>>) -> ProcessOutcome {
    match stdout {
        Some(bytes) if status.success() => ProcessOutcome::Success(bytes),
        _ => ProcessOutcome::Failure { status: status.code(), stderr },
    }
}

fn read_to_end<R: Read>(mut pipe: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join<T>(handle: Option<thread::ScopedJoinHandle<'_, io::Result<T>>>) -> Option<io::Result<T>> {
    handle.map(|h| {
        h.join()
            .unwrap_or_else(|_| Err(io::Error::other("ffmpeg pipe thread panicked")))
    })
}

/// Wait for exit; `Ok(None)` means the deadline passed and the child was killed and reaped.
///
/// A timeout too large to represent as an `Instant` waits without a deadline.
fn wait_with_deadline(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = timeout.and_then(|timeout| Instant::now().checked_add(timeout)) else {
        return child.wait().map(Some);
    };

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }

        let now = Instant::now();
        if now >= deadline {
            // An exit that landed during the last sleep is not a timeout.
            if let Ok(Some(status)) = child.try_wait() {
                return Ok(Some(status));
            }
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
