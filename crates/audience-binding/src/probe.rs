//! CapabilityProbe: locate a host release's internals by name.
//!
//! The probe reads type metadata only. It either returns a complete
//! [`VersionBinding`] or explains why native delivery is off:
//!
//! - server identity mismatch: `Unavailable`, nothing else is resolved
//! - malformed version token: `Config`
//! - any required symbol missing: `Unavailable`
//! - title group missing: bound, with titles disabled

use std::collections::HashMap;
use std::sync::Arc;

use audience_core::{AudienceError, EnumConstant, HostSignature, TitleAction};
use audience_host::{HostError, HostRuntime, MethodSymbol, TypeRef};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::binding::{TitleSymbols, VersionBinding};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("native delivery unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("unknown host version token {0:?}")]
    Config(String),
}

impl ProbeError {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl From<HostError> for ProbeError {
    fn from(err: HostError) -> Self {
        Self::unavailable(err.to_string())
    }
}

impl From<ProbeError> for AudienceError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Unavailable { reason } => Self::ProbeUnavailable { reason },
            ProbeError::Config(token) => Self::Config { token },
        }
    }
}

/// Normalize the package suffix after the vendor namespace.
///
/// `""` stays empty (unversioned layout); `".v1_8_R3"` becomes `"v1_8_R3."`
/// so it can be spliced between a namespace and a type name.
pub fn normalize_version(suffix: &str) -> Result<String, ProbeError> {
    if suffix.is_empty() {
        return Ok(String::new());
    }
    match suffix.strip_prefix('.') {
        Some(token) => Ok(format!("{token}.")),
        None => Err(ProbeError::Config(suffix.to_owned())),
    }
}

// ─── Probe ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CapabilityProbe {
    signature: HostSignature,
}

impl CapabilityProbe {
    pub fn new(signature: HostSignature) -> Self {
        Self { signature }
    }

    /// Probe `host` once and bind to it.
    pub fn attempt(&self, host: Arc<dyn HostRuntime>) -> Result<VersionBinding, ProbeError> {
        let result = self.bind(host);
        match &result {
            Ok(binding) => info!(
                version = binding.version(),
                titles = binding.supports_titles(),
                "bound host release"
            ),
            Err(ProbeError::Unavailable { reason }) => {
                debug!(%reason, "native delivery unavailable");
            }
            Err(err @ ProbeError::Config(_)) => error!(error = %err, "host probe aborted"),
        }
        result
    }

    fn bind(&self, host: Arc<dyn HostRuntime>) -> Result<VersionBinding, ProbeError> {
        let sig = &self.signature;
        let version = self.identify(host.as_ref())?;
        let rt = host.as_ref();

        let recipient_type = rt.find_type(&sig.vendor_type(&version, &sig.recipient_type))?;
        let handle_accessor = rt.method(&recipient_type, &sig.handle_accessor, &[])?;
        let connection_field = rt.field(&handle_accessor.returns, &sig.connection_field)?;
        let packet_type = rt.find_type(&sig.native_type(&version, &sig.packet_type))?;
        let send = rt.method(
            &connection_field.declared_type,
            &sig.send_operation,
            std::slice::from_ref(&packet_type),
        )?;
        let base = rt.find_type(&sig.native_type(&version, &sig.base_content_type))?;
        let chat_type = rt.find_type(&sig.native_type(&version, &sig.chat_packet_type))?;
        let chat_packet = rt.constructor(&chat_type, std::slice::from_ref(&base))?;
        let deserializer = self.resolve_deserializer(rt, &version, &base)?;
        let titles = match self.resolve_titles(rt, &version, &base) {
            Ok(titles) => Some(titles),
            Err(err) => {
                debug!(error = %err, "title packets unsupported");
                None
            }
        };

        Ok(VersionBinding {
            host,
            version,
            recipient_type,
            handle_accessor,
            connection_field,
            send,
            chat_packet,
            deserializer,
            titles,
            bound_at: Utc::now(),
        })
    }

    /// Check the server identity and extract the normalized version token.
    fn identify(&self, host: &dyn HostRuntime) -> Result<String, ProbeError> {
        let sig = &self.signature;
        let server = host.server_type();
        let package = server.package();
        let suffix = match package.strip_prefix(sig.vendor_namespace.as_str()) {
            Some(suffix) if server.simple_name() == sig.server_type => suffix,
            _ => {
                return Err(ProbeError::unavailable(format!(
                    "incompatible server type {server}"
                )));
            }
        };
        normalize_version(suffix)
    }

    /// Nested deserializer of the base content type, else the top-level
    /// fallback type; then the static `(string) -> base` method with the
    /// smallest name.
    fn resolve_deserializer(
        &self,
        host: &dyn HostRuntime,
        version: &str,
        base: &TypeRef,
    ) -> Result<MethodSymbol, ProbeError> {
        let sig = &self.signature;
        let serializer = match host
            .nested_types(base)
            .into_iter()
            .find(|ty| host.is_assignable(ty, &sig.deserializer_interface))
        {
            Some(ty) => ty,
            None => host.find_type(&sig.native_type(version, &sig.deserializer_fallback_type))?,
        };
        host.methods(&serializer)
            .into_iter()
            .filter(|m| {
                m.is_static
                    && m.returns == *base
                    && m.params.len() == 1
                    && m.params[0].as_str() == TypeRef::STRING
            })
            .min_by(|a, b| a.name.cmp(&b.name))
            .ok_or_else(|| ProbeError::unavailable(format!("no text deserializer on {serializer}")))
    }

    fn resolve_titles(
        &self,
        host: &dyn HostRuntime,
        version: &str,
        base: &TypeRef,
    ) -> Result<TitleSymbols, HostError> {
        let sig = &self.signature;
        let packet = host.find_type(&sig.native_type(version, &sig.title_packet_type))?;
        let action_type = host.find_type(&sig.native_type(version, &sig.title_action_type))?;
        let text_packet = host.constructor(&packet, &[action_type.clone(), base.clone()])?;
        let times_packet =
            host.constructor(&packet, &[TypeRef::int(), TypeRef::int(), TypeRef::int()])?;
        let constants = host.enum_constants(&action_type)?;
        Ok(TitleSymbols {
            actions: resolve_actions(&constants),
            action_type,
            text_packet,
            times_packet,
        })
    }
}

/// Symbolic lookup first, then the positional table; out of range means
/// the action is unsupported.
fn resolve_actions(constants: &[EnumConstant]) -> HashMap<TitleAction, EnumConstant> {
    TitleAction::ALL
        .iter()
        .filter_map(|&action| {
            constants
                .iter()
                .find(|c| c.name == action.symbol())
                .or_else(|| constants.get(action.positional_index()))
                .map(|c| (action, c.clone()))
        })
        .collect()
}
