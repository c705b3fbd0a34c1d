//! Terminal and fixed-answer permission brokers.

use async_trait::async_trait;
use console::{style, Term};

use crate::permission::{Capability, PermissionBroker, PermissionState};

/// Asks the user on the terminal.
///
/// The prompt runs on a blocking thread, so the awaiting worker parks while
/// the interactive side keeps running. A non-interactive terminal answers no.
#[derive(Debug, Clone, Default)]
pub struct ConsolePermissions;

impl ConsolePermissions {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PermissionBroker for ConsolePermissions {
    async fn request(&self, capabilities: &[Capability]) -> PermissionState {
        let wanted = capabilities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let question = format!("{} Allow {}? [y/N] ", style("?").yellow().bold(), wanted);

        let answer = tokio::task::spawn_blocking(move || {
            let term = Term::stderr();
            term.write_str(&question)?;
            term.read_line()
        })
        .await;

        match answer {
            Ok(Ok(line)) if is_yes(&line) => PermissionState::Granted,
            Ok(Ok(_)) => PermissionState::Denied,
            Ok(Err(e)) => {
                tracing::warn!("Permission prompt failed: {}", e);
                PermissionState::Denied
            }
            Err(e) => {
                tracing::warn!("Permission prompt task failed: {}", e);
                PermissionState::Denied
            }
        }
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Answers every request with the same state.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermissions(pub PermissionState);

#[async_trait]
impl PermissionBroker for FixedPermissions {
    async fn request(&self, _capabilities: &[Capability]) -> PermissionState {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES \n"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_fixed_permissions() {
        let broker = FixedPermissions(PermissionState::Denied);
        assert_eq!(
            tokio_test::block_on(broker.request(&[Capability::WriteSharedStorage])),
            PermissionState::Denied
        );
    }
}
