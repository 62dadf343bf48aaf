use crate::config::Config;
use crate::controller::CaptureController;
use crate::gestures::{self, Gesture};
use crate::messages::CaptureEvent;
use crate::platform::sim;
use crate::services::recorder;

use anyhow::Result;
use tokio::sync::mpsc;

pub struct App {
    controller: CaptureController,
    event_rx: mpsc::Receiver<CaptureEvent>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let (platform, capture) = sim::build(&config)?;

        let (event_tx, event_rx) = mpsc::channel(10);
        let recorder = recorder::spawn(Box::new(capture), event_tx);

        let controller = CaptureController::new(platform, recorder, config.default_facing);

        Ok(Self {
            controller,
            event_rx,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        self.render();
        self.controller.activate().await;
        self.render();

        // Prompts read stdin too, so gestures are only read once they are done
        let gesture_rx = Self::setup_gesture_input();

        self.run_until(gesture_rx, tokio::signal::ctrl_c()).await;
        tracing::info!("clipcam shutdown complete");
        Ok(())
    }

    /// Drive the screen until Quit, end of input, or `shutdown` resolves,
    /// then tear the session down
    async fn run_until<F: Future>(&mut self, mut gesture_rx: mpsc::Receiver<Gesture>, shutdown: F) {
        tokio::pin!(shutdown);

        loop {
            tracing::debug!("Main loop: waiting for event");
            tokio::select! {
                gesture = gesture_rx.recv() => match gesture {
                    Some(Gesture::Quit) | None => {
                        tracing::info!("Quit requested");
                        break;
                    }
                    Some(gesture) => {
                        self.controller.handle_gesture(gesture).await;
                        self.render();
                    }
                },

                Some(event) = self.event_rx.recv() => {
                    tracing::debug!("Main loop: capture event {:?}", event);
                    self.controller.on_capture_event(event);
                    self.render();
                }

                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
            }
        }

        self.controller.teardown(&mut self.event_rx).await;
        self.render();
    }

    fn render(&self) {
        println!("{}", self.controller.view());
    }

    fn setup_gesture_input() -> mpsc::Receiver<Gesture> {
        let (gesture_tx, gesture_rx) = mpsc::channel(10);
        tokio::spawn(async move {
            if let Err(e) = gestures::read_gestures(gesture_tx).await {
                tracing::error!("Gesture input failed: {:#}", e);
            }
        });
        gesture_rx
    }
}
