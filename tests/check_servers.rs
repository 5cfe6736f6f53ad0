mod common;

use std::time::Duration;

use electrum_health::check_servers;
use electrum_health::report::EndpointStatus;

use common::{closed_port, prober, start_mock_electrum};

const RESULT_REPLY: &[u8] = b"{\"id\":1,\"result\":[0,\"abc\"]}\n";

#[tokio::test]
async fn duplicate_urls_are_probed_once() {
    let server = start_mock_electrum(RESULT_REPLY, Duration::ZERO).await;
    let urls = vec![server.url(), server.url(), server.url()];

    let mut seen = Vec::new();
    let report = check_servers(urls, prober(Duration::from_secs(2)), 10, |o| {
        seen.push(o.url.clone())
    })
    .await;

    assert_eq!(seen, vec![server.url()]);
    assert_eq!(server.connections(), 1);
    assert_eq!(report.total(), 1);
    assert_eq!(report.working().len(), 1);
    assert!(report.is_healthy());
}

#[tokio::test]
async fn mixed_batch_partitions_every_server() {
    let good = start_mock_electrum(RESULT_REPLY, Duration::ZERO).await;
    let error_reply = start_mock_electrum(b"{\"id\":1,\"error\":\"busy\"}\n", Duration::ZERO).await;
    let empty_object = start_mock_electrum(b"{}\n", Duration::ZERO).await;
    let silent_close = start_mock_electrum(b"", Duration::ZERO).await;
    let refused = format!("tcp://127.0.0.1:{}", closed_port().await);

    let urls = vec![
        good.url(),
        error_reply.url(),
        empty_object.url(),
        silent_close.url(),
        refused.clone(),
        "ftp://host:21".to_string(),
        "tcp://".to_string(),
        good.url(),
    ];

    let mut calls = 0;
    let report = check_servers(urls, prober(Duration::from_secs(2)), 3, |_| calls += 1).await;

    assert_eq!(report.total(), 7);
    assert_eq!(calls, 7);
    assert_eq!(report.working().len() + report.broken().len(), report.total());
    assert_eq!(report.working().len(), 2);
    assert!(!report.is_healthy());

    assert_eq!(report.status(&good.url()), EndpointStatus::Working);
    assert_eq!(report.status(&error_reply.url()), EndpointStatus::Working);
    assert_eq!(
        report.status(&empty_object.url()),
        EndpointStatus::Broken("No valid response")
    );
    assert_eq!(
        report.status(&silent_close.url()),
        EndpointStatus::Broken("No valid response")
    );
    assert_eq!(
        report.status(&refused),
        EndpointStatus::Broken("Connection refused")
    );
    assert_eq!(
        report.status("ftp://host:21"),
        EndpointStatus::Broken("Unknown protocol: ftp")
    );
    assert_eq!(
        report.status("tcp://"),
        EndpointStatus::Broken("Invalid URL format")
    );
    assert_eq!(
        report.status("tcp://bitcoin.aranguren.org:50001"),
        EndpointStatus::Absent
    );
}

#[tokio::test]
async fn batch_completes_within_rounds_of_the_limit() {
    let server = start_mock_electrum(RESULT_REPLY, Duration::from_secs(1)).await;
    // 5 distinct raw URLs for one server, limit 2 => ceil(5 / 2) = 3 rounds
    let urls: Vec<String> = (0..5).map(|i| format!("{}/{}", server.url(), i)).collect();

    let start = tokio::time::Instant::now();
    let report = check_servers(urls, prober(Duration::from_secs(3)), 2, |_| {}).await;
    let elapsed = start.elapsed();

    assert_eq!(report.working().len(), 5);
    assert_eq!(server.connections(), 5);
    assert!(elapsed >= Duration::from_millis(2900), "too fast: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(4500), "too slow: {:?}", elapsed);
}
