//! # Confirmation Scenario Tests
//!
//! End-to-end runs through `ConfirmationService`: peers discovered from the
//! serving node, responses cross-checked against sampled validators, trust
//! indicator published to the sink.

use std::sync::Arc;
use std::time::Duration;

use remote_node_confirmation::ports::MockReply;
use remote_node_confirmation::{
    ConfigSettings, ConfirmationApi, ConfirmationConfig, ConfirmationService, MockTransport, Node,
    RecordingSink, DISTRUSTED_COLOR, PEER_REFRESH_INTERVAL, ROLLING_LOG_CAPACITY, TRUSTED_COLOR,
};
use serde_json::{json, Value};

fn block_x(payload_hash: &str) -> Value {
    json!({
        "block": "1234567890",
        "height": 1000,
        "payloadHash": payload_hash,
        "previousBlock": "1234567889",
        "nextBlock": "1234567891",
        "transactions": [],
        "requestProcessingTime": 2
    })
}

fn peers(addresses: &[&str]) -> Value {
    json!({
        "peers": addresses
            .iter()
            .map(|a| json!({ "address": a, "announcedAddress": a, "version": "1.12.0" }))
            .collect::<Vec<_>>()
    })
}

fn service_with(
    config: ConfirmationConfig,
    transport: MockTransport,
) -> (ConfirmationService, Arc<MockTransport>, Arc<RecordingSink>, Arc<ConfigSettings>) {
    let transport = Arc::new(transport);
    let sink = Arc::new(RecordingSink::new());
    let settings = Arc::new(ConfigSettings::new(&config));
    let service =
        ConfirmationService::new(config, transport.clone(), settings.clone(), sink.clone())
            .expect("valid config");
    (service, transport, sink, settings)
}

/// Serving node A answers getBlock; B agrees, C returns a different hash.
#[tokio::test]
async fn test_scenario_a_one_confirm_one_reject() {
    let (service, transport, sink, _) = service_with(
        ConfirmationConfig::for_testing(),
        MockTransport::new()
            .with_serving_reply(peers(&["A", "B", "C"]))
            .with_reply("B", block_x("aaaa"))
            .with_reply("C", block_x("bbbb")),
    );
    service.refresh_peers().await.unwrap();

    let serving = Node::new("A");
    let mut answer = block_x("aaaa");
    answer["requestProcessingTime"] = json!(17);
    let handle = service
        .confirm_response("getBlock", &json!({ "height": 1000 }), &answer, Some(&serving))
        .expect("getBlock is confirmable");
    assert_eq!(handle.dispatched(), 2);
    handle.wait().await;

    let rows = service.report_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].request_type, "getBlock");
    assert_eq!(rows[0].confirming_addresses, vec!["B".to_string()]);
    assert_eq!(rows[0].rejecting_addresses, vec!["C".to_string()]);

    let snapshot = service.trust_snapshot();
    assert_eq!(snapshot.confirmations, 2);
    assert_eq!(snapshot.rejections, 1);
    assert_eq!(snapshot.rejection_ratio, 1.0);
    assert!(!snapshot.trusted);
    assert_eq!(snapshot.color, DISTRUSTED_COLOR);

    // The serving node never verifies its own answer.
    assert!(transport
        .sent()
        .iter()
        .filter_map(|r| r.options.remote_node.as_ref())
        .all(|n| n.address != "A"));
    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].rejections, 1);
    assert_eq!(sink.latest().unwrap().snapshot, snapshot);
}

/// Non-forwardable request types are never cross-checked.
#[tokio::test]
async fn test_scenario_b_non_forwardable_request() {
    let (service, transport, sink, _) = service_with(
        ConfirmationConfig::for_testing(),
        MockTransport::new().with_serving_reply(peers(&["B", "C"])),
    );
    service.refresh_peers().await.unwrap();
    let sent_before = transport.sent_count();

    let handle = service.confirm_response(
        "getTransaction",
        &json!({ "transaction": "42" }),
        &json!({ "transaction": "42", "confirmations": 3 }),
        None,
    );

    assert!(handle.is_none());
    assert!(service.report_rows().is_empty());
    assert_eq!(transport.sent_count(), sent_before);
    assert!(sink.updates().is_empty());
}

/// 21 sequential confirmations leave the 20 most recent in the log.
#[tokio::test]
async fn test_scenario_c_rolling_log_keeps_latest_twenty() {
    let transport = MockTransport::new()
        .with_serving_reply(peers(&["B"]))
        .with_reply("B", json!({ "balanceNQT": "5" }));
    let (service, _, _, _) = service_with(ConfirmationConfig::for_testing(), transport);
    service.refresh_peers().await.unwrap();

    let request_types: Vec<String> = (0..=ROLLING_LOG_CAPACITY)
        .map(|i| format!("getBalance+{}", i))
        .collect();
    for request_type in &request_types {
        service
            .confirm_response(request_type, &json!({}), &json!({ "balanceNQT": "5" }), None)
            .expect("confirmable")
            .wait()
            .await;
    }

    let rows = service.report_rows();
    assert_eq!(rows.len(), ROLLING_LOG_CAPACITY);
    let logged: Vec<&str> = rows.iter().map(|r| r.request_type.as_str()).collect();
    let expected: Vec<&str> = request_types[1..].iter().rev().map(String::as_str).collect();
    assert_eq!(logged, expected);
    assert!(!logged.contains(&"getBalance+0"));

    let snapshot = service.trust_snapshot();
    assert_eq!(snapshot.confirmations, 2 * ROLLING_LOG_CAPACITY);
    assert!(snapshot.trusted);
    assert_eq!(snapshot.color, TRUSTED_COLOR);
}

/// A validator that errors out is neither confirming nor rejecting.
#[tokio::test]
async fn test_failed_validator_excluded_from_tally() {
    let (service, _, sink, _) = service_with(
        ConfirmationConfig {
            validators_count: 3,
            ..ConfirmationConfig::for_testing()
        },
        MockTransport::new()
            .with_serving_reply(peers(&["B", "C"]))
            .with_reply("B", block_x("aaaa"))
            .with_failure("C", "connection refused"),
    );
    service.refresh_peers().await.unwrap();

    service
        .confirm_response("getBlock", &json!({}), &block_x("aaaa"), None)
        .unwrap()
        .wait()
        .await;

    let rows = service.report_rows();
    assert_eq!(rows[0].confirming_addresses, vec!["B".to_string()]);
    assert!(rows[0].rejecting_addresses.is_empty());
    assert!(service.trust_snapshot().trusted);
    assert!(sink.warnings().is_empty());
}

/// Two services never share registry or log.
#[tokio::test]
async fn test_services_are_isolated() {
    let (first, _, _, _) = service_with(
        ConfirmationConfig::for_testing(),
        MockTransport::new()
            .with_serving_reply(peers(&["B"]))
            .with_reply("B", block_x("zzzz")),
    );
    let (second, _, _, _) = service_with(ConfirmationConfig::for_testing(), MockTransport::new());
    first.refresh_peers().await.unwrap();

    first
        .confirm_response("getBlock", &json!({}), &block_x("aaaa"), None)
        .unwrap()
        .wait()
        .await;

    assert!(!first.trust_snapshot().trusted);
    assert!(second.trust_snapshot().trusted);
    assert!(second.registry().is_empty());
    assert!(second.report_rows().is_empty());
}

/// Discovery keeps the registry fresh until polling is switched off.
#[tokio::test(start_paused = true)]
async fn test_discovery_feeds_confirmation() {
    let config = ConfirmationConfig {
        polling_enabled: true,
        ..ConfirmationConfig::for_testing()
    };
    let (service, transport, _, settings) = service_with(
        config,
        MockTransport::new()
            .with_serving_reply(peers(&["B"]))
            .with_reply("B", block_x("aaaa"))
            .with_reply("C", block_x("aaaa")),
    );
    let discovery = service.spawn_discovery().expect("polling enabled");

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(service.registry().len(), 1);

    transport.set_serving_reply(MockReply::Payload(peers(&["B", "C"])));
    tokio::time::sleep(PEER_REFRESH_INTERVAL).await;
    assert_eq!(service.registry().len(), 2);

    let handle = service
        .confirm_response("getBlock", &json!({}), &block_x("aaaa"), None)
        .unwrap();
    assert_eq!(handle.dispatched(), 2);
    handle.wait().await;
    assert_eq!(service.report_rows()[0].confirming_addresses.len(), 2);

    settings.set_polling_enabled(false);
    tokio::time::sleep(PEER_REFRESH_INTERVAL).await;
    discovery.await.unwrap();
}
