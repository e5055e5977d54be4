//! audience-runtime: the caller-facing facade and the per-plugin registry.
//! The `audience` binary in this crate drives both against manifest hosts.

pub mod facade;
pub mod registry;

pub use facade::AudienceFacade;
pub use registry::{AudienceKey, AudienceRegistry};
