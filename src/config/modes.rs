//! Permission mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How capability requests are answered on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Ask interactively on the terminal (default).
    #[default]
    Prompt,
    /// Treat every request as granted.
    Granted,
    /// Treat every request as refused.
    Denied,
    /// The host has no permission concept.
    Unavailable,
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionMode::Prompt => write!(f, "prompt"),
            PermissionMode::Granted => write!(f, "granted"),
            PermissionMode::Denied => write!(f, "denied"),
            PermissionMode::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl FromStr for PermissionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prompt" => Ok(PermissionMode::Prompt),
            "granted" => Ok(PermissionMode::Granted),
            "denied" => Ok(PermissionMode::Denied),
            "unavailable" => Ok(PermissionMode::Unavailable),
            _ => Err(format!("Unknown permission mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_from_str() {
        for mode in [
            PermissionMode::Prompt,
            PermissionMode::Granted,
            PermissionMode::Denied,
            PermissionMode::Unavailable,
        ] {
            assert_eq!(mode.to_string().parse::<PermissionMode>().unwrap(), mode);
        }
        assert!("sometimes".parse::<PermissionMode>().is_err());
    }
}
