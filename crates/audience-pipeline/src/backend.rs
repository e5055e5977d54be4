//! DeliveryBackend trait: one way of getting content to recipients.

use audience_binding::Packet;
use audience_core::{AudienceError, ContentItem, ContentKind, Recipient};

/// Content rendered once per item by a backend, then reused for every
/// recipient it serves.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    /// Native packets, dispatched in order.
    Packets(Vec<Packet>),
    /// One legacy text line; `None` when nothing renders for this item.
    Text(Option<String>),
}

impl Prepared {
    /// Number of host packets this preparation constructed.
    pub fn packet_count(&self) -> usize {
        match self {
            Self::Packets(packets) => packets.len(),
            Self::Text(_) => 0,
        }
    }
}

/// Result of delivering prepared content to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// Everything was delivered.
    Served,
    /// Some content was delivered before a failure. The recipient counts as
    /// served and is not offered to later backends.
    ServedPartially(AudienceError),
    /// Nothing was delivered; the recipient stays in the working set.
    Rejected(AudienceError),
}

pub trait DeliveryBackend: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Whether this backend handles `kind` at all right now.
    fn is_available(&self, kind: ContentKind) -> bool;

    /// Whether `recipient` can be reached by this backend.
    fn accepts(&self, recipient: &dyn Recipient, kind: ContentKind) -> bool;

    /// Render `item`. Called at most once per item, and only when at least
    /// one recipient was accepted.
    fn prepare(&self, item: &ContentItem) -> Result<Prepared, AudienceError>;

    fn deliver(&self, prepared: &Prepared, recipient: &dyn Recipient) -> DeliveryOutcome;

    /// A fallback consumes every recipient it is offered, even on failure.
    fn is_fallback(&self) -> bool {
        false
    }
}
