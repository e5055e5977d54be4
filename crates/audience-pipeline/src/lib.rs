//! audience-pipeline: chain-of-responsibility delivery over ordered backends.
//! Native packets first, plain text as the fallback; each recipient is
//! served at most once per content item.

pub mod backend;
pub mod packet;
pub mod pipeline;
pub mod plain_text;
pub mod report;

pub use backend::{DeliveryBackend, DeliveryOutcome, Prepared};
pub use packet::PacketBackend;
pub use pipeline::DeliveryPipeline;
pub use plain_text::PlainTextBackend;
pub use report::{DeliveryReport, StageReport, StageStatus};
