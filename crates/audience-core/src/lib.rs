//! audience-core: content model, recipient contract, errors and configuration.
//! Pure library shared by every other crate in the workspace.
//! No host access happens here; the host boundary lives in `audience-host`.

pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod recipient;
pub mod value;

pub use config::{AudienceConfig, BackendKind, ConfigLoadError, HostSignature, LogConfig, PipelineConfig};
pub use content::{ContentItem, ContentKind, Times, Title, TitleAction};
pub use document::{Color, ContentSerializer, Document, StandardSerializer};
pub use error::AudienceError;
pub use recipient::Recipient;
pub use value::{EnumConstant, HostObject, HostValue, ObjectRef};
