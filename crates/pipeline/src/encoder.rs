//! Frame sequence to MP4 encoding via FFmpeg.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use magima_core::error::CoreError;
use magima_core::types::Frame;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Maximum stderr captured from the encoder process (64 KiB).
const MAX_STDERR_BYTES: u64 = 64 * 1024;

/// Writes frames to a playable video file.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Encode `frames` at `fps` into `output`, creating parent directories.
    async fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), CoreError>;
}

/// [`VideoEncoder`] that pipes raw RGB24 frames into an `ffmpeg` process
/// producing H.264 / yuv420p MP4.
pub struct FfmpegEncoder {
    binary: String,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, width: u32, height: u32, fps: u32, output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{width}x{height}")])
            .args(["-r", &fps.to_string()])
            .args(["-i", "-"])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(output);
        cmd
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), CoreError> {
        let (width, height) = check_geometry(frames)?;
        if fps == 0 {
            return Err(CoreError::Encoding("frame rate must be positive".into()));
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tracing::debug!(
            frames = frames.len(),
            width,
            height,
            fps,
            output = %output.display(),
            "Encoding video",
        );

        let mut child = self
            .command(width, height, fps, output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CoreError::Encoding(format!("failed to start {}: {e}", self.binary)))?;

        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            match stderr {
                Some(mut stream) => read_capped(&mut stream, MAX_STDERR_BYTES).await,
                None => Vec::new(),
            }
        });

        let write_result = match child.stdin.take() {
            Some(mut stdin) => {
                let mut result = Ok(());
                for frame in frames {
                    if let Err(e) = stdin.write_all(&frame.rgb).await {
                        result = Err(e);
                        break;
                    }
                }
                // Closing stdin signals end of stream.
                drop(stdin);
                result
            }
            None => Ok(()),
        };

        let status = child.wait().await?;
        let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default()).into_owned();

        if !status.success() {
            return Err(CoreError::Encoding(format!(
                "ffmpeg exited with code {:?}: {}",
                status.code(),
                stderr.trim()
            )));
        }
        write_result
            .map_err(|e| CoreError::Encoding(format!("failed to stream frames to ffmpeg: {e}")))?;

        Ok(())
    }
}

/// Keep the first `cap` bytes of `reader` and discard the rest, reading to EOF
/// so the writer never sees a closed pipe.
async fn read_capped<R: AsyncRead + Unpin>(reader: &mut R, cap: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut head = reader.take(cap);
    let _ = head.read_to_end(&mut buf).await;
    let _ = tokio::io::copy(head.into_inner(), &mut tokio::io::sink()).await;
    buf
}

/// All frames must share one non-empty geometry with a matching buffer size.
fn check_geometry(frames: &[Frame]) -> Result<(u32, u32), CoreError> {
    let first = frames
        .first()
        .ok_or_else(|| CoreError::Encoding("no frames to encode".into()))?;
    let (width, height) = (first.width, first.height);
    let expected = Frame::byte_len(width, height);
    if expected == 0 {
        return Err(CoreError::Encoding(format!(
            "invalid frame size {width}x{height}"
        )));
    }

    for (index, frame) in frames.iter().enumerate() {
        if frame.width != width || frame.height != height || frame.rgb.len() != expected {
            return Err(CoreError::Encoding(format!(
                "frame {index} is {}x{} with {} bytes, expected {width}x{height} with {expected} bytes",
                frame.width,
                frame.height,
                frame.rgb.len()
            )));
        }
    }
    Ok((width, height))
}
