//! AudienceFacade: send entry points over a probed host.
//!
//! The probe runs once when the facade is built. Send operations never
//! return errors; failures are logged and visible in the returned report.

use std::sync::Arc;

use audience_binding::{CapabilityProbe, VersionBinding};
use audience_core::{
    AudienceConfig, AudienceError, ContentItem, ContentSerializer, Document, Recipient,
    StandardSerializer, Title,
};
use audience_host::HostRuntime;
use audience_pipeline::{DeliveryPipeline, DeliveryReport};
use tracing::debug;

pub struct AudienceFacade {
    binding: Option<Arc<VersionBinding>>,
    probe_error: Option<AudienceError>,
    pipeline: DeliveryPipeline,
}

impl AudienceFacade {
    /// Probe `host` and build the configured pipeline with the default
    /// serializer.
    pub fn new(host: Arc<dyn HostRuntime>, config: &AudienceConfig) -> Self {
        Self::with_serializer(host, config, Arc::new(StandardSerializer))
    }

    pub fn with_serializer(
        host: Arc<dyn HostRuntime>,
        config: &AudienceConfig,
        serializer: Arc<dyn ContentSerializer>,
    ) -> Self {
        let probe = CapabilityProbe::new(config.host.clone());
        let (binding, probe_error) = match probe.attempt(host) {
            Ok(binding) => (Some(Arc::new(binding)), None),
            Err(err) => (None, Some(AudienceError::from(err))),
        };
        let pipeline = DeliveryPipeline::from_config(&config.pipeline, binding.clone(), serializer);
        debug!(
            backends = ?pipeline.backend_names(),
            native = binding.is_some(),
            fallback = pipeline.has_fallback(),
            "audience facade ready"
        );
        Self {
            binding,
            probe_error,
            pipeline,
        }
    }

    /// The bound host release, if native delivery is available.
    pub fn binding(&self) -> Option<&Arc<VersionBinding>> {
        self.binding.as_ref()
    }

    /// Why native delivery is off, if it is.
    pub fn probe_error(&self) -> Option<&AudienceError> {
        self.probe_error.as_ref()
    }

    pub fn pipeline(&self) -> &DeliveryPipeline {
        &self.pipeline
    }

    pub fn deliver<I>(&self, item: &ContentItem, recipients: I) -> DeliveryReport
    where
        I: IntoIterator<Item = Arc<dyn Recipient>>,
    {
        self.pipeline
            .deliver(item, recipients.into_iter().collect())
    }

    // ─── Sends ──────────────────────────────────────────────────────

    pub fn send_message<I>(&self, recipients: I, message: impl Into<Document>) -> DeliveryReport
    where
        I: IntoIterator<Item = Arc<dyn Recipient>>,
    {
        self.deliver(&ContentItem::Message(message.into()), recipients)
    }

    pub fn send_action_bar<I>(&self, recipients: I, text: impl Into<Document>) -> DeliveryReport
    where
        I: IntoIterator<Item = Arc<dyn Recipient>>,
    {
        self.deliver(&ContentItem::ActionBar(text.into()), recipients)
    }

    pub fn send_title<I>(&self, recipients: I, title: Title) -> DeliveryReport
    where
        I: IntoIterator<Item = Arc<dyn Recipient>>,
    {
        self.deliver(&ContentItem::Title(title), recipients)
    }

    pub fn message_to(
        &self,
        recipient: Arc<dyn Recipient>,
        message: impl Into<Document>,
    ) -> DeliveryReport {
        self.send_message([recipient], message)
    }

    pub fn action_bar_to(
        &self,
        recipient: Arc<dyn Recipient>,
        text: impl Into<Document>,
    ) -> DeliveryReport {
        self.send_action_bar([recipient], text)
    }

    pub fn title_to(&self, recipient: Arc<dyn Recipient>, title: Title) -> DeliveryReport {
        self.send_title([recipient], title)
    }
}
