//! TOML configuration: host symbol signature, pipeline order, log filter.
//!
//! Every section is optional; an empty file yields [`AudienceConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ─── Top Level ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudienceConfig {
    pub host: HostSignature,
    pub pipeline: PipelineConfig,
    pub log: LogConfig,
}

impl AudienceConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

// ─── Host Signature ───────────────────────────────────────────────

/// Names the probe resolves against the host.
///
/// Type names are relative to a namespace and composed with the version
/// token: `{namespace}.{version}{name}` where the token is either empty or
/// ends with a `.`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSignature {
    /// Package prefix of the host implementation.
    pub vendor_namespace: String,
    /// Simple name of the server implementation type.
    pub server_type: String,
    /// Package prefix of the host's internal (versioned) types.
    pub native_namespace: String,
    /// Vendor type implementing live connected recipients.
    pub recipient_type: String,
    /// Accessor on the recipient type returning its internal entity.
    pub handle_accessor: String,
    /// Field on the internal entity holding its connection.
    pub connection_field: String,
    /// Send operation on the connection type.
    pub send_operation: String,
    /// Base type of every packet.
    pub packet_type: String,
    /// Base type of deserialized text content.
    pub base_content_type: String,
    /// Chat packet type, constructed from one base content value.
    pub chat_packet_type: String,
    /// Interface implemented by the nested text deserializer type.
    pub deserializer_interface: String,
    /// Top-level deserializer type used by hosts without a nested one.
    pub deserializer_fallback_type: String,
    /// Optional title packet type.
    pub title_packet_type: String,
    /// Optional title action enumeration.
    pub title_action_type: String,
}

impl Default for HostSignature {
    fn default() -> Self {
        Self {
            vendor_namespace: "org.bukkit.craftbukkit".to_owned(),
            server_type: "CraftServer".to_owned(),
            native_namespace: "net.minecraft.server".to_owned(),
            recipient_type: "entity.CraftPlayer".to_owned(),
            handle_accessor: "getHandle".to_owned(),
            connection_field: "playerConnection".to_owned(),
            send_operation: "sendPacket".to_owned(),
            packet_type: "Packet".to_owned(),
            base_content_type: "IChatBaseComponent".to_owned(),
            chat_packet_type: "PacketPlayOutChat".to_owned(),
            deserializer_interface: "com.google.gson.JsonDeserializer".to_owned(),
            deserializer_fallback_type: "ChatSerializer".to_owned(),
            title_packet_type: "PacketPlayOutTitle".to_owned(),
            title_action_type: "PacketPlayOutTitle$EnumTitleAction".to_owned(),
        }
    }
}

impl HostSignature {
    /// Qualified name of a vendor type for the given normalized version.
    pub fn vendor_type(&self, version: &str, name: &str) -> String {
        format!("{}.{version}{name}", self.vendor_namespace)
    }

    /// Qualified name of a native type for the given normalized version.
    pub fn native_type(&self, version: &str, name: &str) -> String {
        format!("{}.{version}{name}", self.native_namespace)
    }
}

// ─── Pipeline ─────────────────────────────────────────────────────

/// A delivery backend selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Native packets through the bound host version.
    Packet,
    /// Legacy text through the recipient's own API; the fallback.
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Backends in priority order.
    pub backends: Vec<BackendKind>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backends: vec![BackendKind::Packet, BackendKind::PlainText],
        }
    }
}

// ─── Log ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when no environment override is set.
    pub filter: Option<String>,
}
