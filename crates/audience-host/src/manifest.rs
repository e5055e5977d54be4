//! Declarative host description loaded from TOML.
//!
//! A manifest lists the types a host release declares (methods, fields,
//! constructors, enum constants), how live connected recipients are laid
//! out, and which recipients are online. `ManifestHost` executes it.

use std::path::Path;

use serde::Deserialize;

use crate::error::HostError;
use crate::symbol::TypeRef;

#[derive(Debug, Clone, Deserialize)]
pub struct HostManifest {
    /// Runtime type of the server implementation object.
    pub server_type: TypeRef,
    /// Object layout used when spawning live connected recipients.
    #[serde(default)]
    pub player: Option<PlayerLayout>,
    #[serde(default)]
    pub recipients: Vec<RecipientDef>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl HostManifest {
    pub fn from_toml_str(raw: &str) -> Result<Self, HostError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, HostError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

/// How a live connected recipient is wired inside the host:
/// `player --handle accessor--> handle --connection_field--> connection`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerLayout {
    #[serde(rename = "type")]
    pub player_type: TypeRef,
    pub handle_type: TypeRef,
    pub connection_field: String,
    pub connection_type: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// Live connected entity, reachable through packets.
    Player,
    /// Text-only sink.
    Console,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipientDef {
    pub name: String,
    pub kind: RecipientKind,
    /// The recipient's connection rejects every packet.
    #[serde(default)]
    pub broken: bool,
    /// The connection accepts this many packets, then rejects the rest.
    #[serde(default)]
    pub closes_after: Option<u32>,
}

impl RecipientDef {
    /// Packets the connection accepts before closing; `None` is unlimited.
    pub fn send_limit(&self) -> Option<u32> {
        if self.broken {
            Some(0)
        } else {
            self.closes_after
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDef {
    pub name: TypeRef,
    /// Interfaces and supertypes, by qualified name.
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub nested: Vec<TypeRef>,
    /// Enum constants in declaration order; `None` for non-enum types.
    #[serde(default)]
    pub constants: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
}

/// What a declared method does when invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodBehavior {
    /// Returns null.
    #[default]
    Noop,
    /// Returns the receiver's `handle` attribute.
    Handle,
    /// Static; wraps its string argument in an object of the return type.
    Deserialize,
    /// Records the packet argument as dispatched on the receiver connection.
    Send,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<TypeRef>,
    #[serde(default = "void")]
    pub returns: TypeRef,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub behavior: MethodBehavior,
    /// Every invocation fails.
    #[serde(default)]
    pub fails: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub params: Vec<TypeRef>,
    /// Every invocation fails.
    #[serde(default)]
    pub fails: bool,
}

fn void() -> TypeRef {
    TypeRef::new(TypeRef::VOID)
}
