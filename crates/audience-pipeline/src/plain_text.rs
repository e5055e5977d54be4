//! PlainTextBackend: the fallback.
//!
//! Always available and accepts every recipient. Messages render as one
//! legacy text line; titles render their main line only. Action bars and
//! the other title parts have no plain-text form and are dropped, but the
//! recipient is still consumed.

use std::sync::Arc;

use audience_core::{AudienceError, ContentItem, ContentKind, ContentSerializer, Recipient};

use crate::backend::{DeliveryBackend, DeliveryOutcome, Prepared};

pub struct PlainTextBackend {
    serializer: Arc<dyn ContentSerializer>,
}

impl PlainTextBackend {
    pub fn new(serializer: Arc<dyn ContentSerializer>) -> Self {
        Self { serializer }
    }
}

impl DeliveryBackend for PlainTextBackend {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn is_available(&self, _kind: ContentKind) -> bool {
        true
    }

    fn accepts(&self, _recipient: &dyn Recipient, _kind: ContentKind) -> bool {
        true
    }

    fn prepare(&self, item: &ContentItem) -> Result<Prepared, AudienceError> {
        let text = match item {
            ContentItem::Message(doc) => Some(self.serializer.to_legacy_format(doc)),
            ContentItem::ActionBar(_) => None,
            ContentItem::Title(title) => title
                .title
                .as_ref()
                .map(|doc| self.serializer.to_legacy_format(doc)),
        };
        Ok(Prepared::Text(text))
    }

    fn deliver(&self, prepared: &Prepared, recipient: &dyn Recipient) -> DeliveryOutcome {
        match prepared {
            Prepared::Text(Some(text)) => match recipient.send_plain_text(text) {
                Ok(()) => DeliveryOutcome::Served,
                Err(err) => DeliveryOutcome::Rejected(err),
            },
            Prepared::Text(None) => DeliveryOutcome::Served,
            Prepared::Packets(_) => DeliveryOutcome::Rejected(AudienceError::delivery(
                recipient.name(),
                "plain text backend cannot deliver packets",
            )),
        }
    }

    fn is_fallback(&self) -> bool {
        true
    }
}
