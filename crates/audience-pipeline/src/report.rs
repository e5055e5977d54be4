//! DeliveryReport: what one traversal did, for logs and the CLI.
//! Informational only; errors are logged, never carried here.

use audience_core::ContentKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The backend does not handle this content kind.
    Unavailable,
    /// No recipient in the working set was accepted; nothing was prepared.
    Idle,
    /// Preparation failed; the backend was skipped for this item.
    PreparationFailed,
    /// Content was prepared and offered to accepted recipients.
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub backend: String,
    pub status: StageStatus,
    /// Accepted recipients that were offered prepared content.
    pub offered: usize,
    /// Recipients that left the working set at this stage.
    pub served: usize,
    /// Offered recipients whose delivery failed.
    pub failed: usize,
    /// Host packets constructed by this stage.
    pub packets: usize,
}

impl StageReport {
    pub(crate) fn new(backend: &str, status: StageStatus) -> Self {
        Self {
            backend: backend.to_owned(),
            status,
            offered: 0,
            served: 0,
            failed: 0,
            packets: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub kind: ContentKind,
    pub recipients: usize,
    pub stages: Vec<StageReport>,
    /// Recipients that received nothing.
    pub undelivered: Vec<String>,
}

impl DeliveryReport {
    pub fn served(&self) -> usize {
        self.stages.iter().map(|s| s.served).sum()
    }

    pub fn packets(&self) -> usize {
        self.stages.iter().map(|s| s.packets).sum()
    }

    pub fn stage(&self, backend: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.backend == backend)
    }
}
