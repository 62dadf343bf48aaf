use crate::config::PermissionPolicy;
use crate::permissions::{Capability, PermissionState};
use crate::platform::PermissionSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;

/// Permission source driven by a configured policy
///
/// The answer is cached after the first request, like a real platform that
/// only shows its dialog once.
pub struct PolicyPermission {
    capability: Capability,
    policy: PermissionPolicy,
    answer: Option<PermissionState>,
}

impl PolicyPermission {
    pub fn new(capability: Capability, policy: PermissionPolicy) -> Self {
        Self {
            capability,
            policy,
            answer: None,
        }
    }

    pub async fn resolve(&mut self) -> PermissionState {
        if let Some(answer) = self.answer {
            return answer;
        }

        let answer = match self.policy {
            PermissionPolicy::Granted => PermissionState::Granted,
            PermissionPolicy::Denied => PermissionState::Denied,
            PermissionPolicy::Prompt => match prompt(self.capability).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!("Could not ask for {} permission: {:#}", self.capability, e);
                    PermissionState::Denied
                }
            },
        };

        self.answer = Some(answer);
        answer
    }
}

#[async_trait]
impl PermissionSource for PolicyPermission {
    async fn request_permission(&mut self) -> PermissionState {
        self.resolve().await
    }
}

async fn prompt(capability: Capability) -> Result<PermissionState> {
    let question = match capability {
        Capability::Camera => "Allow clipcam to use the camera?",
        Capability::Microphone => "Allow clipcam to record audio?",
        Capability::Storage => "Allow clipcam to save videos to your library?",
    };

    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        write!(stdout, "{} [y/N] ", question).context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read answer")?;

        Ok(parse_answer(&line))
    })
    .await
    .context("spawn_blocking failed")?
}

fn parse_answer(line: &str) -> PermissionState {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => PermissionState::Granted,
        _ => PermissionState::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_grants() {
        assert_eq!(parse_answer("y\n"), PermissionState::Granted);
        assert_eq!(parse_answer("  YES "), PermissionState::Granted);
        assert_eq!(parse_answer("\n"), PermissionState::Denied);
        assert_eq!(parse_answer("nope"), PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_fixed_policies_answer_without_prompting() {
        let mut camera = PolicyPermission::new(Capability::Camera, PermissionPolicy::Granted);
        let mut mic = PolicyPermission::new(Capability::Microphone, PermissionPolicy::Denied);

        assert_eq!(camera.request_permission().await, PermissionState::Granted);
        assert_eq!(mic.request_permission().await, PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_answer_is_cached() {
        let mut storage = PolicyPermission::new(Capability::Storage, PermissionPolicy::Granted);
        assert_eq!(storage.resolve().await, PermissionState::Granted);

        storage.policy = PermissionPolicy::Denied;
        assert_eq!(storage.resolve().await, PermissionState::Granted);
    }
}
