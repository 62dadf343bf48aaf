use crate::platform::{CameraDevice, CaptureDevice, CaptureError, CaptureOutcome};
use async_trait::async_trait;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

enum ClipCommand {
    Stop,
}

/// Capture device that writes a plain-text capture log instead of video
///
/// Each recording gets its own `clip-*.mp4` file and a dedicated writer
/// thread that appends a line per frame tick until it is told to stop. The
/// thread owns the completion sender and resolves it once the file is
/// flushed to disk.
pub struct SimCapture {
    recordings_dir: PathBuf,
    writer: Option<mpsc::Sender<ClipCommand>>,
}

impl SimCapture {
    pub fn new(recordings_dir: PathBuf) -> Self {
        Self {
            recordings_dir,
            writer: None,
        }
    }

    fn create_clip(&self) -> Result<(File, PathBuf), CaptureError> {
        std::fs::create_dir_all(&self.recordings_dir).map_err(|e| {
            CaptureError::Backend(format!(
                "Failed to create recordings directory {:?}: {}",
                self.recordings_dir, e
            ))
        })?;

        let clip = tempfile::Builder::new()
            .prefix("clip-")
            .suffix(".mp4")
            .tempfile_in(&self.recordings_dir)
            .map_err(|e| CaptureError::Backend(format!("Failed to create clip file: {}", e)))?;

        clip.keep()
            .map_err(|e| CaptureError::Backend(format!("Failed to keep clip file: {}", e.error)))
    }
}

#[async_trait]
impl CaptureDevice for SimCapture {
    async fn start_recording(
        &mut self,
        device: &CameraDevice,
        done: oneshot::Sender<CaptureOutcome>,
    ) -> Result<(), CaptureError> {
        if self.writer.is_some() {
            return Err(CaptureError::Busy);
        }

        let (file, path) = self.create_clip()?;
        let (tx, rx) = mpsc::channel();
        let device = device.clone();

        std::thread::spawn(move || {
            let outcome = match record_until_stopped(file, &device, &rx) {
                Ok(frames) => {
                    tracing::debug!("Wrote {} frames to {:?}", frames, path);
                    Ok(path)
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(CaptureError::Interrupted),
                Err(e) => Err(CaptureError::Backend(format!(
                    "Failed to write {:?}: {}",
                    path, e
                ))),
            };
            let _ = done.send(outcome);
        });

        self.writer = Some(tx);
        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<(), CaptureError> {
        let writer = self.writer.take().ok_or(CaptureError::NotRecording)?;

        // A dead writer has already resolved the completion with its error
        if writer.send(ClipCommand::Stop).is_err() {
            tracing::debug!("Capture writer already exited");
        }

        Ok(())
    }
}

fn record_until_stopped(
    file: File,
    device: &CameraDevice,
    rx: &mpsc::Receiver<ClipCommand>,
) -> io::Result<u64> {
    let mut out = BufWriter::new(file);
    writeln!(out, "clipcam capture")?;
    writeln!(out, "device: {} ({})", device.name, device.id)?;
    writeln!(out, "facing: {}", device.facing)?;
    writeln!(out, "started: {}", unix_millis())?;

    let mut frames = 0u64;
    loop {
        match rx.recv_timeout(FRAME_INTERVAL) {
            Ok(ClipCommand::Stop) => break,
            Err(RecvTimeoutError::Timeout) => {
                frames += 1;
                writeln!(out, "frame {}", frames)?;
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "capture abandoned before stop",
                ));
            }
        }
    }

    writeln!(out, "frames: {}", frames)?;
    writeln!(out, "stopped: {}", unix_millis())?;

    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    Ok(frames)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CameraFacing;

    fn back_camera() -> CameraDevice {
        CameraDevice {
            id: "sim-back".into(),
            name: "Simulated back camera".into(),
            facing: CameraFacing::Back,
        }
    }

    #[tokio::test]
    async fn test_recording_produces_clip_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = SimCapture::new(dir.path().to_path_buf());
        let (done_tx, done_rx) = oneshot::channel();

        capture.start_recording(&back_camera(), done_tx).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        capture.stop_recording().await.unwrap();

        let path = done_rx.await.unwrap().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("clip-") && name.ends_with(".mp4"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("facing: back"));
        assert!(contents.contains("frames: "));
        assert!(contents.contains("stopped: "));
    }

    #[tokio::test]
    async fn test_second_start_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = SimCapture::new(dir.path().to_path_buf());
        let (first, _first_rx) = oneshot::channel();
        let (second, _second_rx) = oneshot::channel();

        capture.start_recording(&back_camera(), first).await.unwrap();
        let result = capture.start_recording(&back_camera(), second).await;

        assert_eq!(result, Err(CaptureError::Busy));
        capture.stop_recording().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_not_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = SimCapture::new(dir.path().to_path_buf());

        assert_eq!(capture.stop_recording().await, Err(CaptureError::NotRecording));
    }

    #[tokio::test]
    async fn test_dropping_device_interrupts_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = SimCapture::new(dir.path().to_path_buf());
        let (done_tx, done_rx) = oneshot::channel();

        capture.start_recording(&back_camera(), done_tx).await.unwrap();
        drop(capture);

        assert_eq!(done_rx.await.unwrap(), Err(CaptureError::Interrupted));
    }
}
