//! The recipient contract.

use std::fmt;

use crate::error::AudienceError;
use crate::value::HostValue;

/// Something living in the host that can receive content: a connected
/// entity, a console sink, a command block.
///
/// The pipeline never inspects a recipient beyond this trait. Native
/// backends discriminate on [`Recipient::host_handle`]; the plain-text
/// fallback only needs [`Recipient::send_plain_text`].
pub trait Recipient: Send + Sync + fmt::Debug {
    /// Name used in logs and delivery reports.
    fn name(&self) -> &str;

    /// The host object behind this recipient, if it has one.
    fn host_handle(&self) -> Option<&HostValue> {
        None
    }

    /// Deliver a line of legacy-formatted text through the host's own API.
    fn send_plain_text(&self, text: &str) -> Result<(), AudienceError>;
}
