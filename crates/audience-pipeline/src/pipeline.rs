//! DeliveryPipeline: ordered backends over one working set per send.
//!
//! For each backend in priority order:
//!
//! 1. skip it if it does not handle the content kind
//! 2. walk the working set in insertion order; recipients it does not accept
//!    stay for later backends
//! 3. prepare the content on the first accepted recipient, once
//! 4. deliver; served recipients leave the working set
//!
//! A recipient passed more than once is kept at its first position only.
//! Whatever is left after the last backend gets nothing and is logged.

use std::collections::HashSet;
use std::sync::Arc;

use audience_binding::VersionBinding;
use audience_core::{
    AudienceError, BackendKind, ContentItem, ContentSerializer, PipelineConfig, Recipient,
};
use tracing::{debug, info, warn};

use crate::backend::{DeliveryBackend, DeliveryOutcome, Prepared};
use crate::packet::PacketBackend;
use crate::plain_text::PlainTextBackend;
use crate::report::{DeliveryReport, StageReport, StageStatus};

pub struct DeliveryPipeline {
    backends: Vec<Box<dyn DeliveryBackend>>,
}

impl DeliveryPipeline {
    pub fn new(backends: Vec<Box<dyn DeliveryBackend>>) -> Self {
        Self { backends }
    }

    /// Build the configured backend order. The packet backend is present
    /// even without a binding so reports show why it was skipped.
    pub fn from_config(
        config: &PipelineConfig,
        binding: Option<Arc<VersionBinding>>,
        serializer: Arc<dyn ContentSerializer>,
    ) -> Self {
        let backends = config
            .backends
            .iter()
            .map(|kind| -> Box<dyn DeliveryBackend> {
                match kind {
                    BackendKind::Packet => {
                        Box::new(PacketBackend::new(binding.clone(), Arc::clone(&serializer)))
                    }
                    BackendKind::PlainText => {
                        Box::new(PlainTextBackend::new(Arc::clone(&serializer)))
                    }
                }
            })
            .collect();
        Self::new(backends)
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn has_fallback(&self) -> bool {
        self.backends.iter().any(|b| b.is_fallback())
    }

    /// Deliver `item` to `recipients`, each at most once.
    pub fn deliver(&self, item: &ContentItem, recipients: Vec<Arc<dyn Recipient>>) -> DeliveryReport {
        let kind = item.kind();
        let mut working = distinct(recipients);
        let total = working.len();
        let mut stages = Vec::with_capacity(self.backends.len());
        let mut undelivered = Vec::new();

        for backend in &self.backends {
            if !backend.is_available(kind) {
                debug!(backend = backend.name(), %kind, "backend unavailable");
                stages.push(StageReport::new(backend.name(), StageStatus::Unavailable));
                continue;
            }
            let (stage, remaining, dropped) = run_stage(backend.as_ref(), item, working);
            undelivered.extend(dropped);
            stages.push(stage);
            working = remaining;
        }

        if !working.is_empty() {
            info!(
                %kind,
                count = working.len(),
                "no backend accepted recipients"
            );
        }
        undelivered.extend(working.iter().map(|r| r.name().to_owned()));

        DeliveryReport {
            kind,
            recipients: total,
            stages,
            undelivered,
        }
    }
}

type Working = Vec<Arc<dyn Recipient>>;

/// Drop repeated handles to the same recipient, keeping first occurrences.
fn distinct(recipients: Working) -> Working {
    let passed = recipients.len();
    let mut seen = HashSet::with_capacity(passed);
    let working: Working = recipients
        .into_iter()
        .filter(|r| seen.insert(Arc::as_ptr(r).cast::<()>()))
        .collect();
    if working.len() < passed {
        debug!(duplicates = passed - working.len(), "dropped repeated recipients");
    }
    working
}

/// Run one backend over the working set. Returns its report, the recipients
/// still waiting, and the names of recipients a fallback failed to reach.
fn run_stage(
    backend: &dyn DeliveryBackend,
    item: &ContentItem,
    working: Working,
) -> (StageReport, Working, Vec<String>) {
    let kind = item.kind();
    let name = backend.name();
    let mut prepared: Option<Result<Prepared, AudienceError>> = None;
    let mut remaining = Vec::with_capacity(working.len());
    let mut dropped = Vec::new();
    let mut stage = StageReport::new(name, StageStatus::Idle);

    for recipient in working {
        if !backend.accepts(recipient.as_ref(), kind) {
            remaining.push(recipient);
            continue;
        }
        let ready = prepared.get_or_insert_with(|| {
            let result = backend.prepare(item);
            if let Err(err) = &result {
                warn!(backend = name, %kind, error = %err, "preparation failed, skipping backend");
            }
            result
        });
        let Ok(ready) = ready else {
            remaining.push(recipient);
            continue;
        };

        stage.offered += 1;
        match backend.deliver(ready, recipient.as_ref()) {
            DeliveryOutcome::Served => stage.served += 1,
            DeliveryOutcome::ServedPartially(err) => {
                warn!(backend = name, recipient = recipient.name(), error = %err, "delivery incomplete");
                stage.served += 1;
                stage.failed += 1;
            }
            DeliveryOutcome::Rejected(err) if backend.is_fallback() => {
                warn!(backend = name, recipient = recipient.name(), error = %err, "fallback delivery failed");
                stage.served += 1;
                stage.failed += 1;
                dropped.push(recipient.name().to_owned());
            }
            DeliveryOutcome::Rejected(err) => {
                debug!(backend = name, recipient = recipient.name(), error = %err, "recipient left for next backend");
                stage.failed += 1;
                remaining.push(recipient);
            }
        }
    }

    stage.status = match &prepared {
        None => StageStatus::Idle,
        Some(Err(_)) => StageStatus::PreparationFailed,
        Some(Ok(ready)) => {
            stage.packets = ready.packet_count();
            StageStatus::Delivered
        }
    };
    (stage, remaining, dropped)
}
