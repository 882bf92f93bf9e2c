use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::encode::process::{
    Drain, WriteWatchdog, check_status, join_drain, run_tool, spawn_drain, wait_with_deadline,
};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::toolchain::MediaToolchain;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult, ToolFailure, ToolResult, ToolStage};
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] silent MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// `ffmpeg` executable.
    pub ffmpeg_bin: PathBuf,
    /// Bound on each frame write and on the final wait after the last frame.
    pub timeout: Option<Duration>,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            timeout: None,
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw RGBA frames to its stdin, producing an H.264 stream
/// without audio.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Arc<Mutex<Child>>>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<Drain>,
    watchdog: Option<WriteWatchdog>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            watchdog: None,
            cfg: None,
            last_idx: None,
        }
    }

    fn encode_failure(msg: impl Into<String>) -> ReelError {
        ReelError::ExternalTool(ToolFailure::new(ToolStage::EncodeFrames, None, msg))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_tool_available(&self.opts.ffmpeg_bin, self.opts.timeout) {
            return Err(Self::encode_failure(format!(
                "'{}' is required for MP4 encoding, but could not be run",
                self.opts.ffmpeg_bin.display()
            )));
        }

        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Frames are opaque RGBA8, written back to back.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);
        tracing::debug!(command = ?cmd, "spawning ffmpeg frame encoder");

        let mut child = cmd.spawn().map_err(|e| {
            Self::encode_failure(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Self::encode_failure("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr_drain = spawn_drain(child.stderr.take());
        let child = Arc::new(Mutex::new(child));

        self.watchdog = self
            .opts
            .timeout
            .map(|t| WriteWatchdog::spawn(ToolStage::EncodeFrames, Arc::clone(&child), t));
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = stderr_drain;
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::render("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::render(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::render(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
            return Err(ReelError::render(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::render("ffmpeg sink is already finalized"));
        };
        let written = match &self.watchdog {
            Some(watchdog) => watchdog.guard(|| stdin.write_all(&frame.data)),
            None => stdin.write_all(&frame.data),
        };
        let failure = if self.watchdog.as_ref().is_some_and(WriteWatchdog::fired) {
            let secs = self.opts.timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
            Some(format!(
                "timed out after {secs}s writing frame {} to ffmpeg",
                idx.0
            ))
        } else {
            written
                .err()
                .map(|e| format!("failed to write frame to ffmpeg stdin: {e}"))
        };
        if let Some(mut msg) = failure {
            // The encoder is gone; collect what it said before reporting.
            let stderr = self.reap();
            if !stderr.is_empty() {
                msg.push_str(": ");
                msg.push_str(&stderr);
            }
            return Err(Self::encode_failure(msg));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        drop(self.watchdog.take());
        let handle = self
            .child
            .take()
            .ok_or_else(|| ReelError::render("ffmpeg sink not started"))?;
        let mut child = handle
            .lock()
            .map_err(|_| Self::encode_failure("ffmpeg encoder handle poisoned"))?;

        let status = wait_with_deadline(ToolStage::EncodeFrames, &mut child, self.opts.timeout)?;
        let stderr = join_drain(ToolStage::EncodeFrames, self.stderr_drain.take())?;
        check_status(ToolStage::EncodeFrames, status, &stderr, self.opts.timeout)?;

        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        if self.child.is_some() {
            tracing::debug!(path = %self.opts.out_path.display(), "aborting ffmpeg frame encoder");
        }
        self.reap();
        self.cfg = None;
    }
}

impl FfmpegSink {
    /// Kill the encoder if it is still running and return its trimmed stderr.
    fn reap(&mut self) -> String {
        drop(self.stdin.take());
        drop(self.watchdog.take());
        if let Some(handle) = self.child.take() {
            match handle.lock() {
                Ok(mut child) => {
                    if let Err(e) = child.kill() {
                        tracing::debug!(error = %e, "ffmpeg encoder already exited");
                    }
                    if let Err(e) = child.wait() {
                        tracing::warn!(error = %e, "failed to reap ffmpeg encoder");
                    }
                }
                Err(_) => tracing::warn!("ffmpeg encoder handle poisoned"),
            }
        }
        join_drain(ToolStage::EncodeFrames, self.stderr_drain.take())
            .map(|b| String::from_utf8_lossy(&b).trim().to_string())
            .unwrap_or_default()
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.reap();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Options for [`FfmpegToolchain`].
#[derive(Clone, Debug)]
pub struct FfmpegToolchainOpts {
    /// `ffmpeg` executable.
    pub ffmpeg_bin: PathBuf,
    /// Bound on each tool invocation.
    pub timeout: Option<Duration>,
    /// Sample rate of synthesized silence.
    pub silence_sample_rate: u32,
}

impl Default for FfmpegToolchainOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            timeout: Some(Duration::from_secs(600)),
            silence_sample_rate: 44_100,
        }
    }
}

/// [`MediaToolchain`] backed by the system `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegToolchain {
    opts: FfmpegToolchainOpts,
}

impl FfmpegToolchain {
    /// Create a toolchain with `opts`.
    pub fn new(opts: FfmpegToolchainOpts) -> Self {
        Self { opts }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.args(["-y", "-loglevel", "error"]);
        cmd
    }
}

impl MediaToolchain for FfmpegToolchain {
    fn open_video_stream(
        &self,
        out_path: &Path,
        cfg: SinkConfig,
    ) -> ReelResult<Box<dyn FrameSink>> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: out_path.to_path_buf(),
            overwrite: true,
            ffmpeg_bin: self.opts.ffmpeg_bin.clone(),
            timeout: self.opts.timeout,
        });
        sink.begin(cfg).map_err(|e| {
            ReelError::stream_open(format!(
                "cannot open video stream '{}': {e}",
                out_path.display()
            ))
        })?;
        Ok(Box::new(sink))
    }

    fn concatenate(&self, manifest: &Path, out_path: &Path) -> ToolResult<PathBuf> {
        let mut cmd = self.command();
        cmd.args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(out_path);
        run_tool(ToolStage::ConcatAudio, cmd, self.opts.timeout)?;
        Ok(out_path.to_path_buf())
    }

    fn mux(&self, video: &Path, audio: &Path, out_path: &Path) -> ToolResult<PathBuf> {
        let mut cmd = self.command();
        cmd.arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "aac"])
            .arg(out_path);
        run_tool(ToolStage::Mux, cmd, self.opts.timeout)?;
        Ok(out_path.to_path_buf())
    }

    fn synthesize_silence(&self, duration_secs: f64, out_path: &Path) -> ToolResult<PathBuf> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ToolFailure::new(
                ToolStage::Silence,
                None,
                format!("silence duration must be finite and > 0, got {duration_secs}"),
            ));
        }
        let mut cmd = self.command();
        cmd.args(["-f", "lavfi", "-i"])
            .arg(format!(
                "anullsrc=r={}:cl=mono",
                self.opts.silence_sample_rate
            ))
            .args([
                "-t",
                &format!("{duration_secs:.3}"),
                "-c:a",
                "libmp3lame",
                "-b:a",
                "128k",
            ])
            .arg(out_path);
        run_tool(ToolStage::Silence, cmd, self.opts.timeout)?;
        Ok(out_path.to_path_buf())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `bin -version` exits successfully within `timeout`.
pub fn is_tool_available(bin: &Path, timeout: Option<Duration>) -> bool {
    let mut cmd = Command::new(bin);
    cmd.arg("-version");
    match run_tool(ToolStage::Probe, cmd, timeout) {
        Ok(_) => true,
        Err(f) => {
            tracing::debug!(bin = %bin.display(), error = %f, "tool availability check failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
