//! PacketBackend: native delivery through a [`VersionBinding`].

use std::sync::Arc;

use audience_binding::{Packet, PacketKind, VersionBinding};
use audience_core::{
    AudienceError, ContentItem, ContentKind, ContentSerializer, Document, Recipient, Title,
    TitleAction,
};
use tracing::debug;

use crate::backend::{DeliveryBackend, DeliveryOutcome, Prepared};

pub struct PacketBackend {
    binding: Option<Arc<VersionBinding>>,
    serializer: Arc<dyn ContentSerializer>,
}

impl PacketBackend {
    /// `binding` is `None` when the host probe found no supported release;
    /// the backend then reports itself unavailable for every kind.
    pub fn new(
        binding: Option<Arc<VersionBinding>>,
        serializer: Arc<dyn ContentSerializer>,
    ) -> Self {
        Self {
            binding,
            serializer,
        }
    }

    fn bound(&self, kind: ContentKind) -> Result<&VersionBinding, AudienceError> {
        self.binding
            .as_deref()
            .ok_or_else(|| AudienceError::packet(kind, "no host binding"))
    }

    /// Clear, reset, action bar, times, subtitle, title. Parts the binding
    /// cannot express are skipped, but a title whose text parts are all
    /// inexpressible fails so a later backend can render it.
    fn title_packets(
        &self,
        binding: &VersionBinding,
        title: &Title,
    ) -> Result<Vec<Packet>, AudienceError> {
        let mut packets = Vec::new();
        let mut skipped = Vec::new();
        let mut push = |packets: &mut Vec<Packet>,
                        action: TitleAction,
                        doc: Option<&Document>|
         -> Result<(), AudienceError> {
            let wire = doc.map(|doc| self.serializer.to_wire_format(doc));
            match binding.build_title_packet(action, wire.as_deref())? {
                Some(packet) => packets.push(packet),
                None => skipped.push(action),
            }
            Ok(())
        };

        if title.clear {
            push(&mut packets, TitleAction::Clear, None)?;
        }
        if title.reset {
            push(&mut packets, TitleAction::Reset, None)?;
        }
        if let Some(action_bar) = &title.action_bar {
            push(&mut packets, TitleAction::ActionBar, Some(action_bar))?;
        }
        if let Some(times) = title.times {
            packets.push(binding.build_times_packet(times.fade_in, times.stay, times.fade_out)?);
        }
        if let Some(subtitle) = &title.subtitle {
            push(&mut packets, TitleAction::Subtitle, Some(subtitle))?;
        }
        if let Some(main) = &title.title {
            push(&mut packets, TitleAction::Title, Some(main))?;
        }

        if !skipped.is_empty() {
            debug!(version = binding.version(), ?skipped, "title actions not expressible");
        }
        let wanted_text = skipped.iter().any(|a| a.carries_text());
        let has_text = packets
            .iter()
            .any(|p| matches!(p.kind, PacketKind::Title(a) if a.carries_text()));
        if wanted_text && !has_text {
            return Err(AudienceError::packet(
                ContentKind::Title,
                format!("no title text action is expressible on {}", binding.version()),
            ));
        }
        Ok(packets)
    }
}

impl DeliveryBackend for PacketBackend {
    fn name(&self) -> &'static str {
        "packet"
    }

    fn is_available(&self, kind: ContentKind) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        match kind {
            ContentKind::Message | ContentKind::ActionBar => true,
            ContentKind::Title => binding.supports_titles(),
        }
    }

    fn accepts(&self, recipient: &dyn Recipient, _kind: ContentKind) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|binding| binding.accepts(recipient))
    }

    fn prepare(&self, item: &ContentItem) -> Result<Prepared, AudienceError> {
        let binding = self.bound(item.kind())?;
        let packets = match item {
            ContentItem::Message(doc) => {
                vec![binding.build_message_packet(&self.serializer.to_wire_format(doc))?]
            }
            // Hosts without an action-bar title action get it as chat.
            ContentItem::ActionBar(doc) => {
                let wire = self.serializer.to_wire_format(doc);
                match binding.build_title_packet(TitleAction::ActionBar, Some(&wire))? {
                    Some(packet) => vec![packet],
                    None => vec![binding.build_message_packet(&wire)?],
                }
            }
            ContentItem::Title(title) => self.title_packets(binding, title)?,
        };
        Ok(Prepared::Packets(packets))
    }

    fn deliver(&self, prepared: &Prepared, recipient: &dyn Recipient) -> DeliveryOutcome {
        let Prepared::Packets(packets) = prepared else {
            return DeliveryOutcome::Rejected(AudienceError::delivery(
                recipient.name(),
                "packet backend cannot deliver text",
            ));
        };
        if packets.is_empty() {
            return DeliveryOutcome::Served;
        }
        let Some(binding) = self.binding.as_deref() else {
            return DeliveryOutcome::Rejected(AudienceError::delivery(
                recipient.name(),
                "no host binding",
            ));
        };
        let connection = match binding.resolve_connection(recipient) {
            Ok(connection) => connection,
            Err(err) => return DeliveryOutcome::Rejected(err),
        };
        for (sent, packet) in packets.iter().enumerate() {
            if let Err(err) = binding.dispatch(&connection, packet) {
                return if sent == 0 {
                    DeliveryOutcome::Rejected(err)
                } else {
                    DeliveryOutcome::ServedPartially(err)
                };
            }
        }
        DeliveryOutcome::Served
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_core::{StandardSerializer, Times};

    fn unbound() -> PacketBackend {
        PacketBackend::new(None, Arc::new(StandardSerializer))
    }

    #[test]
    fn unbound_backend_is_unavailable() {
        let backend = unbound();
        for kind in ContentKind::ALL {
            assert!(!backend.is_available(kind));
        }
    }

    #[test]
    fn unbound_prepare_fails() {
        let err = unbound()
            .prepare(&ContentItem::Title(
                Title::new()
                    .with_title("x")
                    .with_times(Times::new(1, 2, 3)),
            ))
            .expect_err("unbound");
        assert!(matches!(
            err,
            AudienceError::PacketConstruction {
                kind: ContentKind::Title,
                ..
            }
        ));
    }

    #[test]
    fn text_preparation_is_rejected() {
        #[derive(Debug)]
        struct Sink;
        impl Recipient for Sink {
            fn name(&self) -> &str {
                "sink"
            }
            fn send_plain_text(&self, _text: &str) -> Result<(), AudienceError> {
                Ok(())
            }
        }
        let outcome = unbound().deliver(&Prepared::Text(Some("hi".into())), &Sink);
        assert!(matches!(outcome, DeliveryOutcome::Rejected(_)));
    }
}
