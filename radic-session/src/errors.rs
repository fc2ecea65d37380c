//! Error types for remote session operations.

use thiserror::Error;

/// Errors reported by a [`RemoteSession`](crate::RemoteSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session is not connected.
    #[error("Session not connected")]
    NotConnected,

    /// The display-control channel has not been negotiated.
    #[error("Monitor layout not supported by remote session")]
    LayoutUnsupported,

    /// The remote side refused a request.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The session has been closed.
    #[error("Session closed")]
    Closed,
}

impl SessionError {
    /// Returns true if a later attempt may succeed without user action.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LayoutUnsupported | Self::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SessionError::Rejected("bad layout".to_string()).to_string(),
            "Request rejected: bad layout"
        );
        assert_eq!(SessionError::Closed.to_string(), "Session closed");
    }

    #[test]
    fn test_error_categorization() {
        assert!(SessionError::LayoutUnsupported.is_transient());
        assert!(!SessionError::Closed.is_transient());
        assert!(!SessionError::NotConnected.is_transient());
    }
}
