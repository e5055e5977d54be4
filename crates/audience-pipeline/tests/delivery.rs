//! End-to-end traversals against manifest hosts from `fixtures/hosts/`.

use std::path::PathBuf;
use std::sync::Arc;

use audience_binding::{CapabilityProbe, VersionBinding};
use audience_core::{
    ContentItem, Document, HostValue, PipelineConfig, Recipient, StandardSerializer, Times, Title,
};
use audience_host::ManifestHost;
use audience_pipeline::{DeliveryPipeline, StageStatus};

const CHAT_PACKET: &str = "net.minecraft.server.v1_12_R1.PacketPlayOutChat";
const TITLE_PACKET: &str = "net.minecraft.server.v1_12_R1.PacketPlayOutTitle";
const LEGACY_CHAT_PACKET: &str = "net.minecraft.server.v1_7_R4.PacketPlayOutChat";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/hosts")
        .join(name)
}

fn load(name: &str) -> Arc<ManifestHost> {
    Arc::new(ManifestHost::load(&fixture(name)).expect("load fixture"))
}

fn bind(host: &Arc<ManifestHost>) -> Option<Arc<VersionBinding>> {
    CapabilityProbe::default().attempt(host.clone()).ok().map(Arc::new)
}

fn pipeline(binding: Option<Arc<VersionBinding>>) -> DeliveryPipeline {
    DeliveryPipeline::from_config(
        &PipelineConfig::default(),
        binding,
        Arc::new(StandardSerializer),
    )
}

fn players(host: &ManifestHost, n: usize) -> Vec<Arc<dyn Recipient>> {
    (0..n)
        .map(|i| Arc::new(host.spawn_player(&format!("player{i}"), false)) as Arc<dyn Recipient>)
        .collect()
}

/// Title action name carried by a title packet, or `None` for times packets.
fn title_action(packet: &HostValue) -> Option<String> {
    match packet.as_object()?.args.first()? {
        HostValue::Enum(constant) => Some(constant.name.clone()),
        _ => None,
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────

#[test]
fn welcome_title_to_mixed_recipients() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let title = Title::new()
        .with_title("Welcome")
        .with_times(Times::new(10, 60, 10));

    let report = pipeline.deliver(&ContentItem::Title(title), host.recipients());

    for player in ["alice", "bob"] {
        let packets = host.packets_for(player);
        assert_eq!(packets.len(), 2, "{player}");
        let times = packets[0].as_object().expect("times packet");
        assert_eq!(
            times.args,
            vec![HostValue::Int(10), HostValue::Int(60), HostValue::Int(10)]
        );
        assert_eq!(title_action(&packets[1]).as_deref(), Some("TITLE"));
    }
    assert_eq!(host.plain_text_for("console"), vec!["Welcome".to_owned()]);
    assert!(host.packets_for("console").is_empty());

    assert_eq!(report.stage("packet").expect("packet stage").served, 2);
    assert_eq!(report.stage("plain_text").expect("fallback stage").served, 1);
    assert!(report.undelivered.is_empty());
}

#[test]
fn hello_to_nobody_does_nothing() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));

    let report = pipeline.deliver(&ContentItem::Message(Document::text("Hello")), Vec::new());

    assert_eq!(host.total_constructions(), 0);
    assert!(host.journal().is_empty());
    assert_eq!(report.recipients, 0);
    assert!(report.undelivered.is_empty());
    assert!(report.stages.iter().all(|s| s.status == StageStatus::Idle));
}

#[test]
fn construction_runs_once_per_send() {
    for n in [0usize, 1, 5] {
        let host = load("v1_12_R1.toml");
        let pipeline = pipeline(bind(&host));
        let recipients = players(&host, n);

        pipeline.deliver(&ContentItem::Message(Document::text("Hello")), recipients);

        let expected = usize::from(n > 0);
        assert_eq!(host.constructions(CHAT_PACKET), expected, "n = {n}");
        for i in 0..n {
            assert_eq!(host.packets_for(&format!("player{i}")).len(), 1);
        }
    }
}

#[test]
fn title_packet_order_is_fixed() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let title = Title::new()
        .with_title("T")
        .with_subtitle("S")
        .with_action_bar("A")
        .with_times(Times::new(1, 2, 3))
        .clearing()
        .resetting();

    pipeline.deliver(&ContentItem::Title(title), players(&host, 1));

    let order: Vec<Option<String>> = host
        .packets_for("player0")
        .iter()
        .map(title_action)
        .collect();
    assert_eq!(
        order,
        vec![
            Some("CLEAR".to_owned()),
            Some("RESET".to_owned()),
            Some("ACTIONBAR".to_owned()),
            None,
            Some("SUBTITLE".to_owned()),
            Some("TITLE".to_owned()),
        ]
    );
    assert_eq!(host.constructions(TITLE_PACKET), 6);
}

#[test]
fn action_bar_uses_title_packet() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));

    let report = pipeline.deliver(&ContentItem::ActionBar("hp 20".into()), host.recipients());

    assert_eq!(
        title_action(&host.packets_for("alice")[0]).as_deref(),
        Some("ACTIONBAR")
    );
    // No plain-text form; the console is consumed without output.
    assert!(host.plain_text_for("console").is_empty());
    assert!(report.undelivered.is_empty());
}

#[test]
fn repeated_recipient_gets_one_delivery() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let alice: Arc<dyn Recipient> = Arc::new(host.spawn_player("alice", false));

    let report = pipeline.deliver(
        &ContentItem::Message(Document::text("Hello")),
        vec![Arc::clone(&alice), alice],
    );

    assert_eq!(host.packets_for("alice").len(), 1);
    assert_eq!(report.recipients, 1);
    assert_eq!(report.served(), 1);
}

#[test]
fn connection_closing_mid_title_still_counts_as_served() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let carol: Arc<dyn Recipient> = Arc::new(host.spawn_player_closing_after("carol", 1));
    let title = Title::new()
        .with_title("Welcome")
        .with_times(Times::new(10, 60, 10));

    let report = pipeline.deliver(&ContentItem::Title(title), vec![carol]);

    // Times went out, the title line did not.
    assert_eq!(host.packets_for("carol").len(), 1);
    assert!(host.plain_text_for("carol").is_empty());
    let stage = report.stage("packet").expect("packet stage");
    assert_eq!(stage.served, 1);
    assert_eq!(stage.failed, 1);
    assert_eq!(report.stage("plain_text").expect("fallback stage").status, StageStatus::Idle);
    assert!(report.undelivered.is_empty());
}

// ─── Degradation ────────────────────────────────────────────────────

#[test]
fn action_bar_without_titles_goes_as_chat() {
    let host = load("v1_7_R4.toml");
    let pipeline = pipeline(bind(&host));

    let report = pipeline.deliver(&ContentItem::ActionBar("hp 20".into()), host.recipients());

    let packets = host.packets_for("alice");
    assert_eq!(packets.len(), 1);
    assert_eq!(
        packets[0].as_object().expect("packet").type_name,
        LEGACY_CHAT_PACKET
    );
    assert_eq!(host.constructions(LEGACY_CHAT_PACKET), 1);
    assert_eq!(report.stage("packet").expect("packet stage").status, StageStatus::Delivered);
    assert!(host.plain_text_for("console").is_empty());
}

#[test]
fn title_without_expressible_text_falls_back_to_text() {
    let raw = std::fs::read_to_string(fixture("v1_12_R1.toml")).expect("read fixture");
    let raw = raw.replace(
        r#"constants = ["TITLE", "SUBTITLE", "ACTIONBAR", "TIMES", "CLEAR", "RESET"]"#,
        "constants = []",
    );
    let host = Arc::new(ManifestHost::from_toml_str(&raw).expect("manifest"));
    let binding = bind(&host).expect("bound");
    assert!(binding.supports_titles());
    let pipeline = pipeline(Some(binding));

    let title = Title::new()
        .with_title("Welcome")
        .with_times(Times::new(10, 60, 10));
    let report = pipeline.deliver(&ContentItem::Title(title), host.recipients());

    assert_eq!(
        report.stage("packet").expect("packet stage").status,
        StageStatus::PreparationFailed
    );
    for name in ["alice", "bob", "console"] {
        assert_eq!(host.plain_text_for(name), vec!["Welcome".to_owned()], "{name}");
        assert!(host.packets_for(name).is_empty(), "{name}");
    }
}

#[test]
fn title_without_text_parts_is_served_silently() {
    let raw = std::fs::read_to_string(fixture("v1_12_R1.toml")).expect("read fixture");
    let raw = raw.replace(
        r#"constants = ["TITLE", "SUBTITLE", "ACTIONBAR", "TIMES", "CLEAR", "RESET"]"#,
        "constants = []",
    );
    let host = Arc::new(ManifestHost::from_toml_str(&raw).expect("manifest"));
    let pipeline = pipeline(bind(&host));

    let report = pipeline.deliver(&ContentItem::Title(Title::new().clearing()), players(&host, 1));

    assert_eq!(report.stage("packet").expect("packet stage").served, 1);
    assert!(host.journal().is_empty());
}

#[test]
fn host_without_titles_falls_back_to_text() {
    let host = load("v1_7_R4.toml");
    let pipeline = pipeline(bind(&host));
    let title = Title::new().with_title("Welcome");

    let report = pipeline.deliver(&ContentItem::Title(title), host.recipients());

    assert_eq!(
        report.stage("packet").expect("packet stage").status,
        StageStatus::Unavailable
    );
    assert_eq!(host.plain_text_for("alice"), vec!["Welcome".to_owned()]);
    assert_eq!(host.plain_text_for("console"), vec!["Welcome".to_owned()]);
    assert_eq!(host.total_constructions(), 0);
}

#[test]
fn messages_still_go_native_without_titles() {
    let host = load("v1_7_R4.toml");
    let pipeline = pipeline(bind(&host));

    pipeline.deliver(&ContentItem::Message("Hi".into()), host.recipients());

    assert_eq!(host.packets_for("alice").len(), 1);
    assert!(host.plain_text_for("alice").is_empty());
    assert_eq!(host.plain_text_for("console"), vec!["Hi".to_owned()]);
}

#[test]
fn unavailable_host_uses_plain_text_only() {
    let host = load("incompatible.toml");
    let binding = bind(&host);
    assert!(binding.is_none());
    let pipeline = pipeline(binding);

    let report = pipeline.deliver(&ContentItem::Message("Hi".into()), host.recipients());

    assert_eq!(host.plain_text_for("alice"), vec!["Hi".to_owned()]);
    assert_eq!(host.plain_text_for("console"), vec!["Hi".to_owned()]);
    assert_eq!(report.served(), 2);
}

#[test]
fn broken_connection_falls_back_to_text() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let recipients: Vec<Arc<dyn Recipient>> = vec![
        Arc::new(host.spawn_player("alice", false)),
        Arc::new(host.spawn_player("mallory", true)),
    ];

    let report = pipeline.deliver(&ContentItem::Message("Hi".into()), recipients);

    assert_eq!(host.packets_for("alice").len(), 1);
    assert!(host.plain_text_for("alice").is_empty());
    assert!(host.packets_for("mallory").is_empty());
    assert_eq!(host.plain_text_for("mallory"), vec!["Hi".to_owned()]);
    assert_eq!(report.stage("packet").expect("packet stage").failed, 1);
}

#[test]
fn without_fallback_leftovers_are_reported() {
    let host = load("v1_12_R1.toml");
    let config = PipelineConfig {
        backends: vec![audience_core::BackendKind::Packet],
    };
    let pipeline = DeliveryPipeline::from_config(&config, bind(&host), Arc::new(StandardSerializer));

    let report = pipeline.deliver(&ContentItem::Message("Hi".into()), host.recipients());

    assert_eq!(report.undelivered, vec!["console".to_owned()]);
    assert!(host.plain_text_for("console").is_empty());
}

#[test]
fn report_serializes() {
    let host = load("v1_12_R1.toml");
    let pipeline = pipeline(bind(&host));
    let report = pipeline.deliver(&ContentItem::Message("Hi".into()), host.recipients());
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["kind"], "message");
    assert_eq!(json["stages"][0]["backend"], "packet");
    assert_eq!(json["stages"][0]["status"], "delivered");
    assert_eq!(json["stages"][0]["packets"], 1);
}
