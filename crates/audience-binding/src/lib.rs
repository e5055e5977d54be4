//! audience-binding: one-time capability probe against a host release and
//! the immutable table of typed operations it produces.
//! Depends on audience-core and audience-host; knows nothing of backends.

pub mod binding;
pub mod probe;

pub use binding::{
    BindingSummary, ConnectionHandle, Packet, PacketKind, TitleActionSummary, VersionBinding,
};
pub use probe::{CapabilityProbe, ProbeError, normalize_version};
