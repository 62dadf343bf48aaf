use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// On-screen controls a gesture can land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Record,
    Flip,
    ClosePreview,
    SavePreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PressStart(Control),
    PressEnd(Control),
    Tap(Control),
    Quit,
}

/// Parse one line of shell input into a gesture
///
/// Accepts `press record`, `release record`, `tap flip`, `tap close`,
/// `tap save`, `quit` and their one-letter aliases.
pub fn parse_gesture(line: &str) -> Result<Gesture> {
    let normalized = line.trim().to_ascii_lowercase();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    let gesture = match words.as_slice() {
        ["press", "record"] | ["r"] => Gesture::PressStart(Control::Record),
        ["release", "record"] | ["s"] => Gesture::PressEnd(Control::Record),
        ["tap", "flip"] | ["f"] => Gesture::Tap(Control::Flip),
        ["tap", "close"] | ["c"] => Gesture::Tap(Control::ClosePreview),
        ["tap", "save"] | ["v"] => Gesture::Tap(Control::SavePreview),
        ["quit"] | ["q"] | ["exit"] => Gesture::Quit,
        [] => anyhow::bail!("Empty gesture"),
        _ => anyhow::bail!("Unknown gesture: {}", line.trim()),
    };

    Ok(gesture)
}

/// Read gestures from stdin, one per line
///
/// Unparseable lines are logged and skipped. EOF is reported as `Quit`.
pub async fn read_gestures(tx: mpsc::Sender<Gesture>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_gesture(&line) {
            Ok(gesture) => {
                tracing::debug!("Gesture: {:?}", gesture);
                if tx.send(gesture).await.is_err() {
                    return Ok(());
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }

    tracing::debug!("stdin closed");
    let _ = tx.send(Gesture::Quit).await;
    Ok(())
}
