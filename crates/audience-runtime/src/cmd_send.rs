//! `audience send`: deliver one content item to a manifest host's
//! recipients and print the report with everything the host received.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use audience_core::{AudienceConfig, ContentItem, Document, Title};
use audience_host::ManifestHost;
use audience_runtime::AudienceFacade;

use crate::cli::{Content, TitleOpts};

pub fn cmd_send(config: &AudienceConfig, manifest: &Path, content: Content) -> anyhow::Result<()> {
    let host = Arc::new(
        ManifestHost::load(manifest)
            .with_context(|| format!("loading host manifest {}", manifest.display()))?,
    );
    let facade = AudienceFacade::new(host.clone(), config);
    if let Some(err) = facade.probe_error() {
        tracing::info!(error = %err, "native delivery off, using configured fallbacks");
    }

    let report = facade.deliver(&content_item(content), host.recipients());
    let output = serde_json::json!({
        "report": report,
        "journal": host.journal(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn content_item(content: Content) -> ContentItem {
    match content {
        Content::Message { text } => ContentItem::Message(Document::text(text)),
        Content::ActionBar { text } => ContentItem::ActionBar(Document::text(text)),
        Content::Title(opts) => ContentItem::Title(title(opts)),
    }
}

fn title(opts: TitleOpts) -> Title {
    Title {
        title: opts.title.map(Document::text),
        subtitle: opts.subtitle.map(Document::text),
        action_bar: opts.action_bar.map(Document::text),
        times: opts.times,
        clear: opts.clear,
        reset: opts.reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_core::Times;

    #[test]
    fn title_options_map_to_title() {
        let item = content_item(Content::Title(TitleOpts {
            title: Some("Welcome".to_owned()),
            times: Some(Times::new(10, 60, 10)),
            reset: true,
            ..TitleOpts::default()
        }));
        let expected = Title::new()
            .with_title("Welcome")
            .with_times(Times::new(10, 60, 10))
            .resetting();
        assert_eq!(item, ContentItem::Title(expected));
    }

    #[test]
    fn message_maps_to_plain_document() {
        let item = content_item(Content::Message {
            text: "Hello".to_owned(),
        });
        assert_eq!(item, ContentItem::Message(Document::text("Hello")));
    }
}
