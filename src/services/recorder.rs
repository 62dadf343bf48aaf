use crate::messages::{CaptureEvent, RecorderCommand, SessionId};
use crate::platform::{CameraDevice, CaptureDevice, CaptureError, CaptureOutcome};
use tokio::sync::{mpsc, oneshot};

struct InFlight {
    session: SessionId,
    done_rx: oneshot::Receiver<CaptureOutcome>,
}

/// Owns the capture device and serializes access to it
///
/// This service:
/// - Starts and stops platform recordings on command
/// - Refuses a second start while a recording is in flight
/// - Waits on the per-session completion and forwards it as a `CaptureEvent`
pub struct Recorder {
    device: Box<dyn CaptureDevice>,
    cmd_rx: mpsc::Receiver<RecorderCommand>,
    event_tx: mpsc::Sender<CaptureEvent>,
    in_flight: Option<InFlight>,
}

impl Recorder {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        cmd_rx: mpsc::Receiver<RecorderCommand>,
        event_tx: mpsc::Sender<CaptureEvent>,
    ) -> Self {
        Self {
            device,
            cmd_rx,
            event_tx,
            in_flight: None,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                // Handle commands from the controller
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        tracing::debug!("Recorder: command channel closed, exiting");
                        break;
                    }
                },

                // Platform finished (or gave up on) the current recording
                (session, outcome) = Self::completion(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.settle(session, outcome).await;
                }
            }
        }
    }

    async fn completion(in_flight: &mut Option<InFlight>) -> (SessionId, CaptureOutcome) {
        match in_flight {
            Some(pending) => {
                let outcome = (&mut pending.done_rx)
                    .await
                    .unwrap_or(Err(CaptureError::Interrupted));
                (pending.session, outcome)
            }
            None => std::future::pending().await,
        }
    }

    async fn settle(&mut self, session: SessionId, outcome: CaptureOutcome) {
        self.in_flight = None;

        let event = match outcome {
            Ok(path) => {
                tracing::info!("Recording {} finished: {:?}", session, path);
                CaptureEvent::Finished { session, path }
            }
            Err(error) => {
                tracing::error!("Recording {} failed: {}", session, error);
                CaptureEvent::Failed { session, error }
            }
        };

        if self.event_tx.send(event).await.is_err() {
            tracing::warn!("Recorder: nobody is listening for capture events");
        }
    }

    async fn handle_command(&mut self, cmd: RecorderCommand) {
        match cmd {
            RecorderCommand::Start {
                session,
                device,
                reply,
            } => {
                if let Some(current) = &self.in_flight {
                    tracing::warn!(
                        "Refusing to start recording {}: {} is still in flight",
                        session,
                        current.session
                    );
                    let _ = reply.send(Err(CaptureError::Busy));
                    return;
                }

                let (done_tx, done_rx) = oneshot::channel();
                let result = self.device.start_recording(&device, done_tx).await;

                match &result {
                    Ok(()) => {
                        self.in_flight = Some(InFlight { session, done_rx });
                        tracing::info!("Recording {} started on {}", session, device.name);
                    }
                    Err(e) => tracing::error!("Failed to start recording {}: {}", session, e),
                }

                let _ = reply.send(result);
            }

            RecorderCommand::Stop(reply) => {
                if self.in_flight.is_none() {
                    let _ = reply.send(Err(CaptureError::NotRecording));
                    return;
                }

                let result = self.device.stop_recording().await;
                if let Err(e) = &result {
                    tracing::error!("Failed to stop recording: {}", e);
                }

                let _ = reply.send(result);
                tracing::debug!("Stop requested, waiting for the platform to finish");
            }
        }
    }
}

/// Handle for communicating with the Recorder
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<RecorderCommand>,
}

impl RecorderHandle {
    pub fn new(tx: mpsc::Sender<RecorderCommand>) -> Self {
        Self { tx }
    }

    pub async fn start(&self, session: SessionId, device: CameraDevice) -> Result<(), CaptureError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RecorderCommand::Start {
                session,
                device,
                reply,
            })
            .await
            .map_err(|_| CaptureError::ServiceUnavailable)?;

        rx.await.map_err(|_| CaptureError::ServiceUnavailable)?
    }

    pub async fn stop(&self) -> Result<(), CaptureError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RecorderCommand::Stop(reply))
            .await
            .map_err(|_| CaptureError::ServiceUnavailable)?;

        rx.await.map_err(|_| CaptureError::ServiceUnavailable)?
    }
}

/// Spawn a Recorder on the current runtime and return its handle
pub fn spawn(device: Box<dyn CaptureDevice>, event_tx: mpsc::Sender<CaptureEvent>) -> RecorderHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(10);
    tokio::spawn(Recorder::new(device, cmd_rx, event_tx).run());
    RecorderHandle::new(cmd_tx)
}
