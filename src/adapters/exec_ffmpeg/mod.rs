// FFmpeg CLI adapter - Encoder execution through an ffmpeg subprocess

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Number of stderr lines kept as failure detail
const FAILURE_TAIL_LINES: usize = 10;

/// Encoder adapter driving the `ffmpeg` binary.
///
/// Progress is read from `-progress pipe:1`; stderr lines are forwarded to
/// [`EncoderEvents::on_log`].
pub struct FfmpegCliAdapter {
    ffmpeg_path: String,
}

impl FfmpegCliAdapter {
    pub fn new(ffmpeg_path: &str) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.to_string(),
        }
    }

    /// Render a request into an ffmpeg argument vector
    pub fn render_args(request: &EncodeRequest) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-hide_banner", "-nostats", "-progress", "pipe:1"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match &request.op {
            EncodeOp::ExtractFrames {
                input,
                frame_count,
                frames_per_second,
                thumbnail_width,
            } => {
                args.extend([
                    "-ss".to_string(),
                    "0".to_string(),
                    "-i".to_string(),
                    input.clone(),
                    "-vf".to_string(),
                    format!(
                        "fps={}/1:round=up,scale={}:-2",
                        frames_per_second, thumbnail_width
                    ),
                    "-vframes".to_string(),
                    frame_count.to_string(),
                ]);
            }
            EncodeOp::AttachAudio {
                video,
                audio,
                duration,
            } => {
                args.extend([
                    "-i".to_string(),
                    video.clone(),
                    "-i".to_string(),
                    audio.clone(),
                    "-filter_complex".to_string(),
                    format!("[1:a]atrim=duration={}[trimmedAudio]", seconds(*duration)),
                    "-map".to_string(),
                    "0:v".to_string(),
                    "-map".to_string(),
                    "[trimmedAudio]".to_string(),
                    "-c:v".to_string(),
                    "copy".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-shortest".to_string(),
                ]);
            }
            EncodeOp::ChangeSpeed { input, factor } => {
                args.extend([
                    "-i".to_string(),
                    input.clone(),
                    "-filter:v".to_string(),
                    format!("setpts=PTS/{}", factor),
                    "-filter:a".to_string(),
                    format!("atempo={:.1}", factor),
                ]);
            }
            EncodeOp::CutSegment {
                input,
                start,
                duration,
            } => {
                args.extend([
                    "-ss".to_string(),
                    seconds(*start),
                    "-i".to_string(),
                    input.clone(),
                    "-t".to_string(),
                    seconds(*duration),
                    "-c".to_string(),
                    "copy".to_string(),
                ]);
            }
            EncodeOp::Overlay {
                input,
                image,
                height_ratio,
                anchor,
            } => {
                let position = match anchor {
                    OverlayAnchor::BottomRight => "(main_w-overlay_w):(main_h-overlay_h)",
                };
                args.extend([
                    "-i".to_string(),
                    input.clone(),
                    "-i".to_string(),
                    image.clone(),
                    "-filter_complex".to_string(),
                    format!(
                        "[1][0]scale2ref=oh*mdar:ih*{}[logo][video];[video][logo]overlay={}",
                        height_ratio, position
                    ),
                ]);
            }
            EncodeOp::Slideshow { list_file, audio } => {
                args.extend([
                    "-f".to_string(),
                    "concat".to_string(),
                    "-safe".to_string(),
                    "0".to_string(),
                    "-i".to_string(),
                    list_file.clone(),
                    "-i".to_string(),
                    audio.clone(),
                    "-map".to_string(),
                    "0:v".to_string(),
                    "-map".to_string(),
                    "1:a".to_string(),
                    "-vf".to_string(),
                    "scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-shortest".to_string(),
                ]);
            }
        }

        args.push(request.output.clone());
        args
    }
}

fn seconds(value: f64) -> String {
    format!("{:.3}", value)
}

/// Accumulated state of one `-progress` block stream
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgressState {
    pub elapsed_ms: u64,
    pub frame: usize,
    pub complete: bool,
}

impl ProgressState {
    /// Apply one `key=value` line; returns true when it closes a block
    pub fn apply_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.trim().split_once('=') else {
            return false;
        };
        let value = value.trim();
        match key.trim() {
            // ffmpeg reports out_time_ms in microseconds as well
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.elapsed_ms = (us.max(0) / 1000) as u64;
                }
                false
            }
            "frame" => {
                if let Ok(frame) = value.parse::<usize>() {
                    self.frame = frame;
                }
                false
            }
            "progress" => {
                self.complete = value == "end";
                true
            }
            _ => false,
        }
    }
}

/// Turns closed progress blocks into ticks, one per newly written frame
#[derive(Debug, Default)]
struct TickEmitter {
    reported_frames: usize,
}

impl TickEmitter {
    fn emit(&mut self, state: &ProgressState, events: &dyn EncoderEvents) {
        if state.frame > self.reported_frames {
            for count in (self.reported_frames + 1)..=state.frame {
                events.on_progress_tick(state.elapsed_ms, Some(count));
            }
            self.reported_frames = state.frame;
        } else {
            events.on_progress_tick(state.elapsed_ms, None);
        }
    }
}

#[async_trait]
impl EncoderPort for FfmpegCliAdapter {
    async fn execute(&self, request: EncodeRequest, events: Arc<dyn EncoderEvents>) -> Result<(), DomainError> {
        let args = Self::render_args(&request);
        debug!(job = %request.kind(), "ffmpeg {}", args.join(" "));

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DomainError::EncoderUnavailable(format!("Failed to spawn {}: {}", self.ffmpeg_path, e))
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let kind = request.kind();
        info!(job = %kind, output = %request.output, "Encoder started");

        tokio::spawn(async move {
            // Drain stderr alongside the progress stream
            let log_events = Arc::clone(&events);
            let stderr_task = tokio::spawn(async move {
                let mut tail = VecDeque::with_capacity(FAILURE_TAIL_LINES);
                if let Some(stderr) = stderr {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log_events.on_log(&line);
                        if tail.len() == FAILURE_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
                tail.into_iter().collect::<Vec<_>>().join("\n")
            });

            if let Some(stdout) = stdout {
                let mut state = ProgressState::default();
                let mut ticks = TickEmitter::default();
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if state.apply_line(&line) {
                        ticks.emit(&state, events.as_ref());
                    }
                }
            }

            let status = child.wait().await;
            let tail = stderr_task.await.unwrap_or_default();
            let outcome = match status {
                Ok(status) if status.success() => EncodeOutcome::Success {
                    output: request.output.clone(),
                },
                Ok(status) => EncodeOutcome::Failure {
                    detail: format!("ffmpeg exited with {}: {}", status, tail.trim()),
                },
                Err(e) => EncodeOutcome::Failure {
                    detail: format!("Failed to wait for ffmpeg: {}", e),
                },
            };
            if let EncodeOutcome::Failure { detail } = &outcome {
                warn!(job = %kind, "Encoder failed: {}", detail);
            }
            events.on_complete(outcome);
        });

        Ok(())
    }
}
