//! VersionBinding: typed operations bound to one host release.
//!
//! Built once by [`crate::CapabilityProbe`] and shared read-only for the
//! rest of the process. Every operation goes through the host runtime using
//! the symbols resolved at bind time; nothing is looked up again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use audience_core::{AudienceError, ContentKind, EnumConstant, HostValue, Recipient, TitleAction};
use audience_host::{ConstructorSymbol, FieldSymbol, HostRuntime, MethodSymbol, TypeRef};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ─── Packets ────────────────────────────────────────────────────────

/// What a constructed packet was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Chat,
    Title(TitleAction),
    Times,
}

/// One constructed host packet object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    pub kind: PacketKind,
    pub value: HostValue,
}

/// A recipient's resolved connection object.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionHandle {
    pub recipient: String,
    pub value: HostValue,
}

// ─── Bound Symbols ──────────────────────────────────────────────────

/// Optional title group. Present only when the whole group resolved.
#[derive(Debug, Clone)]
pub(crate) struct TitleSymbols {
    pub action_type: TypeRef,
    pub text_packet: ConstructorSymbol,
    pub times_packet: ConstructorSymbol,
    /// Resolved at bind time; a missing entry means the action is unsupported.
    pub actions: HashMap<TitleAction, EnumConstant>,
}

pub struct VersionBinding {
    pub(crate) host: Arc<dyn HostRuntime>,
    pub(crate) version: String,
    pub(crate) recipient_type: TypeRef,
    pub(crate) handle_accessor: MethodSymbol,
    pub(crate) connection_field: FieldSymbol,
    pub(crate) send: MethodSymbol,
    pub(crate) chat_packet: ConstructorSymbol,
    pub(crate) deserializer: MethodSymbol,
    pub(crate) titles: Option<TitleSymbols>,
    pub(crate) bound_at: DateTime<Utc>,
}

impl fmt::Debug for VersionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionBinding")
            .field("version", &self.version)
            .field("recipient_type", &self.recipient_type)
            .field("deserializer", &self.deserializer.to_string())
            .field("supports_titles", &self.supports_titles())
            .finish_non_exhaustive()
    }
}

impl VersionBinding {
    /// Normalized version token: empty, or ending in `.`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn supports_titles(&self) -> bool {
        self.titles.is_some()
    }

    /// Whether `action` resolved to a host constant.
    pub fn supports(&self, action: TitleAction) -> bool {
        self.title_constant(action).is_some()
    }

    /// Whether `recipient` is a live connected entity of the bound release.
    pub fn accepts(&self, recipient: &dyn Recipient) -> bool {
        recipient
            .host_handle()
            .is_some_and(|handle| self.host.is_instance(handle, &self.recipient_type))
    }

    fn title_constant(&self, action: TitleAction) -> Option<&EnumConstant> {
        self.titles.as_ref()?.actions.get(&action)
    }

    fn deserialize(&self, kind: ContentKind, serialized: &str) -> Result<HostValue, AudienceError> {
        self.host
            .invoke(&self.deserializer, None, &[HostValue::from(serialized)])
            .map_err(|e| AudienceError::packet(kind, e.to_string()))
    }

    // ─── Construction ───────────────────────────────────────────────

    /// Chat packet carrying wire-format text.
    pub fn build_message_packet(&self, serialized: &str) -> Result<Packet, AudienceError> {
        let content = self.deserialize(ContentKind::Message, serialized)?;
        let value = self
            .host
            .construct(&self.chat_packet, vec![content])
            .map_err(|e| AudienceError::packet(ContentKind::Message, e.to_string()))?;
        Ok(Packet {
            kind: PacketKind::Chat,
            value,
        })
    }

    /// Title packet for `action`, or `None` when this release has no
    /// constant for it. `serialized` is absent for clear and reset.
    pub fn build_title_packet(
        &self,
        action: TitleAction,
        serialized: Option<&str>,
    ) -> Result<Option<Packet>, AudienceError> {
        let (Some(titles), Some(constant)) = (self.titles.as_ref(), self.title_constant(action))
        else {
            return Ok(None);
        };
        let kind = match action {
            TitleAction::ActionBar => ContentKind::ActionBar,
            _ => ContentKind::Title,
        };
        let content = match serialized {
            Some(text) => self.deserialize(kind, text)?,
            None => HostValue::Null,
        };
        let value = self
            .host
            .construct(
                &titles.text_packet,
                vec![HostValue::Enum(constant.clone()), content],
            )
            .map_err(|e| AudienceError::packet(kind, e.to_string()))?;
        Ok(Some(Packet {
            kind: PacketKind::Title(action),
            value,
        }))
    }

    pub fn build_times_packet(
        &self,
        fade_in: i32,
        stay: i32,
        fade_out: i32,
    ) -> Result<Packet, AudienceError> {
        let titles = self.titles.as_ref().ok_or_else(|| {
            AudienceError::packet(ContentKind::Title, "host has no title packet")
        })?;
        let value = self
            .host
            .construct(
                &titles.times_packet,
                vec![
                    HostValue::Int(fade_in),
                    HostValue::Int(stay),
                    HostValue::Int(fade_out),
                ],
            )
            .map_err(|e| AudienceError::packet(ContentKind::Title, e.to_string()))?;
        Ok(Packet {
            kind: PacketKind::Times,
            value,
        })
    }

    // ─── Delivery ───────────────────────────────────────────────────

    /// Walk recipient handle, internal entity and connection field.
    pub fn resolve_connection(
        &self,
        recipient: &dyn Recipient,
    ) -> Result<ConnectionHandle, AudienceError> {
        let name = recipient.name();
        let handle = recipient
            .host_handle()
            .ok_or_else(|| AudienceError::delivery(name, "recipient has no host handle"))?;
        let entity = self
            .host
            .invoke(&self.handle_accessor, Some(handle), &[])
            .map_err(|e| AudienceError::delivery(name, e.to_string()))?;
        let connection = self
            .host
            .read_field(&self.connection_field, &entity)
            .map_err(|e| AudienceError::delivery(name, e.to_string()))?;
        if connection.is_null() {
            return Err(AudienceError::delivery(name, "recipient is not connected"));
        }
        Ok(ConnectionHandle {
            recipient: name.to_owned(),
            value: connection,
        })
    }

    pub fn dispatch(&self, connection: &ConnectionHandle, packet: &Packet) -> Result<(), AudienceError> {
        self.host
            .invoke(
                &self.send,
                Some(&connection.value),
                std::slice::from_ref(&packet.value),
            )
            .map(|_| ())
            .map_err(|e| AudienceError::delivery(connection.recipient.as_str(), e.to_string()))
    }

    // ─── Summary ────────────────────────────────────────────────────

    pub fn summary(&self) -> BindingSummary {
        BindingSummary {
            version: self.version.clone(),
            supports_titles: self.supports_titles(),
            deserializer: self.deserializer.to_string(),
            title_action_type: self.titles.as_ref().map(|t| t.action_type.to_string()),
            title_actions: TitleAction::ALL
                .iter()
                .map(|&action| TitleActionSummary {
                    action,
                    constant: self.title_constant(action).map(|c| c.name.clone()),
                    ordinal: self.title_constant(action).map(|c| c.ordinal),
                })
                .collect(),
            bound_at: self.bound_at,
        }
    }
}

/// Serializable description of what a binding resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSummary {
    pub version: String,
    pub supports_titles: bool,
    pub deserializer: String,
    pub title_action_type: Option<String>,
    pub title_actions: Vec<TitleActionSummary>,
    pub bound_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleActionSummary {
    pub action: TitleAction,
    pub constant: Option<String>,
    pub ordinal: Option<usize>,
}
