//! Error kinds shared across the delivery stack.
//!
//! None of these ever reach callers of the facade's send operations; they
//! decide which backend or recipient is skipped and are reported via logs.

use thiserror::Error;

use crate::content::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudienceError {
    /// The host version is not supported; native delivery is disabled.
    #[error("native delivery unavailable: {reason}")]
    ProbeUnavailable { reason: String },

    /// The host's version token has an unexpected shape.
    #[error("unknown host version token {token:?}")]
    Config { token: String },

    /// Building packets for one content item failed on one backend.
    #[error("failed to construct {kind} packet: {detail}")]
    PacketConstruction { kind: ContentKind, detail: String },

    /// Delivering to one recipient failed.
    #[error("delivery to {recipient} failed: {detail}")]
    Delivery { recipient: String, detail: String },
}

impl AudienceError {
    pub fn packet(kind: ContentKind, detail: impl Into<String>) -> Self {
        Self::PacketConstruction {
            kind,
            detail: detail.into(),
        }
    }

    pub fn delivery(recipient: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Delivery {
            recipient: recipient.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = AudienceError::packet(ContentKind::Title, "constructor threw");
        assert_eq!(
            err.to_string(),
            "failed to construct title packet: constructor threw"
        );

        let err = AudienceError::delivery("alice", "connection closed");
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("connection closed"));
    }

    #[test]
    fn config_error_quotes_token() {
        let err = AudienceError::Config {
            token: "X".to_owned(),
        };
        assert_eq!(err.to_string(), "unknown host version token \"X\"");
    }
}
