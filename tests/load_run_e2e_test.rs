//! End-to-end runs of the load generator against a mock banking API

use anyhow::Result;
use bankload_config::{LoadConfig, ScenarioConfig, Variant};
use bankload_http::{BankClient, HttpConfig};
use bankload_runner::{LoadRunner, RunSummary, StopReason, StopSignal};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Hands out 12-digit string account ids, as the banking backend does
struct SequentialAccounts {
    next: AtomicU64,
}

impl SequentialAccounts {
    fn new() -> Self {
        Self {
            next: AtomicU64::new(100_000_000_001),
        }
    }
}

impl Respond for SequentialAccounts {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(json!({ "accountId": id.to_string() }))
    }
}

async fn mount_bank(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/simulation"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(SequentialAccounts::new())
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/transfers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transferId": "t-1" })))
        .mount(server)
        .await;
}

fn load(users: usize, run_time_ms: u64) -> LoadConfig {
    LoadConfig {
        users,
        spawn_rate: 100.0,
        run_time: Some(Duration::from_millis(run_time_ms)),
        stop_timeout: Duration::from_secs(2),
    }
}

fn scenario(variant: Variant) -> ScenarioConfig {
    ScenarioConfig {
        variant,
        think_time_min: Duration::from_millis(5),
        think_time_max: Duration::from_millis(15),
        ..ScenarioConfig::default()
    }
}

async fn run(host: &str, load: LoadConfig, scenario: ScenarioConfig) -> Result<RunSummary> {
    let client = BankClient::new(host, &HttpConfig::default())?;
    let runner = LoadRunner::new(Arc::new(client), load, scenario).with_seed(7);
    Ok(runner.run(StopSignal::new()).await?)
}

async fn transfer_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/transfers")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_shared_account_run_end_to_end() -> Result<()> {
    let server = MockServer::start().await;
    mount_bank(&server).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionalAccounts": 4,
            "loanAccounts": 0,
            "bankBalance": 0,
            "totalMoney": 2000000
        })))
        .mount(&server)
        .await;

    let summary = run(&server.uri(), load(3, 400), scenario(Variant::SharedAccount)).await?;

    assert_eq!(summary.stop_reason, StopReason::RunTimeElapsed);
    assert!(summary.setup.simulation_started);
    assert_eq!(summary.users_spawned, 3);
    assert_eq!(summary.users_with_account, 3);

    // Global setup creates the first account
    let shared = summary.shared_account.expect("shared account created");
    assert_eq!(shared.to_string(), "100000000001");

    let transfers = transfer_bodies(&server).await;
    assert!(!transfers.is_empty());
    for body in &transfers {
        assert_eq!(body["to"], json!("100000000001"));
        assert_ne!(body["from"], body["to"]);
        assert_eq!(body["amountCents"], json!(1));
        assert!(body["reference"].is_u64());
    }

    let stats = &summary.stats;
    assert_eq!(stats.label("Create Account").unwrap().requests, 3);
    assert_eq!(stats.label("Make Transfer").unwrap().requests, transfers.len() as u64);
    assert_eq!(stats.total.failures, 0);

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_peer_to_peer_run_end_to_end() -> Result<()> {
    let server = MockServer::start().await;
    mount_bank(&server).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server.uri(), load(4, 400), scenario(Variant::PeerToPeer)).await?;

    assert_eq!(summary.pool_size, 4);
    assert_eq!(summary.shared_account, None);

    let transfers = transfer_bodies(&server).await;
    assert!(!transfers.is_empty());
    let senders: HashSet<String> = transfers
        .iter()
        .map(|b| b["from"].as_str().unwrap().to_string())
        .collect();
    for body in &transfers {
        assert_ne!(body["from"], body["to"]);
    }
    assert!(senders.len() > 1);

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_failed_account_creation_sends_no_transfers() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/simulation"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/transfers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(&server.uri(), load(2, 200), scenario(Variant::PeerToPeer)).await?;

    assert_eq!(summary.users_with_account, 0);
    assert_eq!(summary.pool_size, 0);
    let created = summary.stats.label("Create Account").unwrap();
    assert_eq!(created.failures, 2);
    assert_eq!(created.status_codes.get(&500), Some(&2));
    assert!(summary.users.iter().all(|u| u.transfers == 0));

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_simulation_start_failure_does_not_stop_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/simulation"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(SequentialAccounts::new())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/transfers"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let summary = run(&server.uri(), load(2, 300), scenario(Variant::SharedAccount)).await?;

    assert!(!summary.setup.simulation_started);
    assert_eq!(summary.users_with_account, 2);

    // Rejected transfers are failed samples, not errors
    let transfers = summary.stats.label("Make Transfer").unwrap();
    assert_eq!(transfers.failures, transfers.requests);
    assert!(transfers.status_codes.contains_key(&409));

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_unreachable_backend_records_transport_errors() -> Result<()> {
    // Nothing listens on the discard port
    let summary = run(
        "http://127.0.0.1:9",
        load(2, 200),
        scenario(Variant::SharedAccount),
    )
    .await?;

    assert!(!summary.setup.simulation_started);
    assert_eq!(summary.shared_account, None);
    assert_eq!(summary.users_with_account, 0);

    let created = summary.stats.label("Create Account").unwrap();
    assert_eq!(created.transport_errors, 2);
    assert!(summary.stats.label("Make Transfer").is_none());
    Ok(())
}

#[tokio::test]
async fn test_external_stop_ends_unbounded_run() -> Result<()> {
    let server = MockServer::start().await;
    mount_bank(&server).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = BankClient::new(&server.uri(), &HttpConfig::default())?;
    let mut config = load(2, 0);
    config.run_time = None;
    let runner = LoadRunner::new(Arc::new(client), config, scenario(Variant::SharedAccount));

    let stop = StopSignal::new();
    let trigger = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger(StopReason::Interrupted);
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), runner.run(stop)).await??;
    assert_eq!(summary.stop_reason, StopReason::Interrupted);
    assert_eq!(summary.users_aborted, 0);
    Ok(())
}
