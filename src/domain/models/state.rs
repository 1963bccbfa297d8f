//! Bootstrap lifecycle states.

use serde::Serialize;

/// Readiness of the configuration bootstrap.
///
/// Transitions only move forward: `Created -> Loading -> Ready | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    /// `init()` has not been called.
    Created,
    /// Sources are being resolved.
    Loading,
    /// Sinks wired, callback fired.
    Ready,
    /// A source or the logger wiring failed.
    Failed,
}

impl BootstrapState {
    /// Lowercase name, as used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Loading) | (Self::Loading, Self::Ready | Self::Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_forward_only() {
        assert!(BootstrapState::Created.can_transition_to(BootstrapState::Loading));
        assert!(BootstrapState::Loading.can_transition_to(BootstrapState::Ready));
        assert!(BootstrapState::Loading.can_transition_to(BootstrapState::Failed));
        assert!(!BootstrapState::Ready.can_transition_to(BootstrapState::Loading));
        assert!(!BootstrapState::Failed.can_transition_to(BootstrapState::Ready));
        assert!(!BootstrapState::Created.can_transition_to(BootstrapState::Ready));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(BootstrapState::Loading.as_str(), "loading");
        assert_eq!(serde_json::to_value(BootstrapState::Failed).unwrap(), "failed");
    }
}
