//! Streaming session: one supervised ffmpeg child.

use anyhow::{bail, Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::ffmpeg::{self, FFMPEG, STREAM_LOG_LEVEL};
use crate::sources::AudioSource;

/// How long ffmpeg gets to flush and exit after SIGTERM before it is killed.
pub const STOP_GRACE: Duration = Duration::from_secs(3);

const STDERR_DRAIN: Duration = Duration::from_secs(1);

/// A running ffmpeg stream.
///
/// ffmpeg runs in its own process group, so a terminal Ctrl-C reaches only
/// the streamer and ffmpeg is shut down through [`stop`](Self::stop). The
/// child is killed if the session is dropped without stopping it.
pub struct StreamSession {
    child: Child,
    stderr_task: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Start streaming `source` to the configured target.
    pub fn start(config: &Config, source: &AudioSource) -> Result<Self> {
        if !config.is_ip_configured() {
            bail!("Please set target IP first");
        }
        config.validate()?;

        let mut args = vec!["-v".to_string(), STREAM_LOG_LEVEL.to_string()];
        args.extend(ffmpeg::stream_args(config, &source.name));

        let session = Self::spawn(FFMPEG, &args)?;

        tracing::info!(
            "Streaming {} to {} (open {} on the receiver)",
            source.description,
            config.target_display(),
            ffmpeg::player_url(config.target_port)
        );
        Ok(session)
    }

    pub(crate) fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start '{program}'"))?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!("ffmpeg: {line}");
                }
            })
        });

        Ok(Self { child, stderr_task })
    }

    /// Wait for ffmpeg to exit on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .await
            .context("waiting for ffmpeg to exit")?;
        self.drain_stderr().await;
        Ok(status)
    }

    /// Ask ffmpeg to finish, killing it if it does not exit within [`STOP_GRACE`].
    pub async fn stop(mut self) -> Result<ExitStatus> {
        if let Some(pid) = self.child.id() {
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                tracing::warn!("failed to signal ffmpeg ({}): {}", pid, e);
            }
        }

        let status = match tokio::time::timeout(STOP_GRACE, self.child.wait()).await {
            Ok(status) => status.context("waiting for ffmpeg to exit")?,
            Err(_) => {
                tracing::warn!(
                    "ffmpeg did not exit within {}s; killing it",
                    STOP_GRACE.as_secs()
                );
                self.child.kill().await.context("killing ffmpeg")?;
                self.child.wait().await.context("reaping ffmpeg")?
            }
        };

        self.drain_stderr().await;
        tracing::info!("Streaming stopped");
        Ok(status)
    }

    /// Stream until Ctrl-C, or fail if ffmpeg exits first.
    pub async fn run_until_interrupted(self) -> Result<()> {
        self.run_until(async {
            tokio::signal::ctrl_c()
                .await
                .context("listening for Ctrl-C")
        })
        .await
    }

    /// Stream until `shutdown` resolves, then stop.
    ///
    /// A shutdown request that is ready together with ffmpeg's exit counts
    /// as a requested stop.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        tokio::select! {
            biased;

            requested = shutdown => {
                requested?;
                tracing::debug!("shutdown requested");
                self.stop().await?;
                Ok(())
            }
            status = self.child.wait() => {
                let status = status.context("waiting for ffmpeg to exit")?;
                self.drain_stderr().await;
                bail!("Streaming stopped unexpectedly (ffmpeg {status}); rerun with -v for ffmpeg output")
            }
        }
    }

    /// Flush remaining ffmpeg output. A grandchild may still hold the pipe
    /// open, so this gives up after [`STDERR_DRAIN`].
    async fn drain_stderr(&mut self) {
        if let Some(mut task) = self.stderr_task.take() {
            if tokio::time::timeout(STDERR_DRAIN, &mut task).await.is_err() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceState;
    use nix::unistd::getpgid;

    fn session(program: &str, args: &[&str]) -> StreamSession {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        StreamSession::spawn(program, &args).unwrap()
    }

    fn child_pid(session: &StreamSession) -> Pid {
        Pid::from_raw(session.child.id().unwrap() as i32)
    }

    #[tokio::test]
    async fn test_child_runs_in_own_process_group() {
        let session = session("sleep", &["30"]);
        let pid = child_pid(&session);

        assert_eq!(getpgid(Some(pid)).unwrap(), pid);
        assert_ne!(getpgid(None).unwrap(), pid);
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_racing_child_exit_is_a_clean_stop() {
        let session = session("sleep", &["30"]);
        kill(child_pid(&session), Signal::SIGINT).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        session.run_until(async { Ok(()) }).await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_child() {
        let session = session("sleep", &["30"]);
        let started = std::time::Instant::now();

        session
            .run_until(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
            .await
            .unwrap();
        assert!(started.elapsed() < STOP_GRACE);
    }

    #[tokio::test]
    async fn test_stop_terminates_child() {
        let session = session("sleep", &["30"]);

        let started = std::time::Instant::now();
        let status = session.stop().await.unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < STOP_GRACE);
    }

    #[tokio::test]
    async fn test_stop_kills_child_ignoring_sigterm() {
        let session = session("sh", &["-c", "trap '' TERM; sleep 30"]);
        let status = session.stop().await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_wait_reports_exit_status() {
        let mut session = session("sh", &["-c", "echo starting >&2; exit 2"]);
        let status = session.wait().await.unwrap();
        assert_eq!(status.code(), Some(2));
    }

    #[tokio::test]
    async fn test_unexpected_exit_is_an_error() {
        let session = session("true", &[]);
        let err = session
            .run_until(std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("stopped unexpectedly"));
    }

    #[tokio::test]
    async fn test_start_requires_target() {
        let source = AudioSource {
            name: "sink.monitor".into(),
            description: "Monitor".into(),
            state: SourceState::Running,
            is_monitor: true,
            is_running: true,
            is_default: true,
        };
        let err = StreamSession::start(&Config::default(), &source)
            .err()
            .unwrap();
        assert!(err.to_string().contains("target IP"));
    }
}
