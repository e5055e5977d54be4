//! `audience probe`: bind to a manifest host and print the result.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use audience_binding::{CapabilityProbe, ProbeError};
use audience_core::AudienceConfig;
use audience_host::ManifestHost;

pub fn cmd_probe(config: &AudienceConfig, manifest: &Path) -> anyhow::Result<()> {
    let host = ManifestHost::load(manifest)
        .with_context(|| format!("loading host manifest {}", manifest.display()))?;
    let probe = CapabilityProbe::new(config.host.clone());
    let output = match probe.attempt(Arc::new(host)) {
        Ok(binding) => serde_json::to_value(binding.summary())?,
        Err(ProbeError::Unavailable { reason }) => serde_json::json!({
            "available": false,
            "reason": reason,
        }),
        Err(err @ ProbeError::Config(_)) => return Err(err.into()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
