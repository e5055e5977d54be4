//! audience-host: host IO boundary.
//! Type metadata lookup and invocation behind the `HostRuntime` trait, plus
//! `ManifestHost`, an in-process host described by a TOML manifest.
//! No delivery logic lives here.

pub mod error;
pub mod manifest;
pub mod memory;
pub mod runtime;
pub mod symbol;

pub use error::HostError;
pub use manifest::{HostManifest, RecipientKind};
pub use memory::{HostRecipient, JournalEntry, ManifestHost};
pub use runtime::HostRuntime;
pub use symbol::{ConstructorSymbol, FieldSymbol, MethodSymbol, TypeRef};
