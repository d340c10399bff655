//! Account-wide server scanning.
//!
//! Two fan-outs with different draining semantics, which must not be
//! conflated: within one server the endpoint race takes the *first*
//! success ([`crate::probe::select_best`]); across servers everything is
//! drained and every winner collected.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::debug;

use crate::api::auth::PlexAccount;
use crate::error::Result;
use crate::models::{EndpointStatus, PlexDevice, ReachableEndpoint};
use crate::probe::{probe, probe_client, select_best};

/// Default deadline for a server scan.
///
/// Scans always take the deadline as an explicit parameter; this is only
/// the value callers offer by default.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch the account's servers and return every one that answered.
///
/// One task per server, each racing its endpoints under the shared
/// deadline; results drain through a single channel receiver owned by
/// this task, so aggregation is serialised. Returns only after every
/// per-server task has terminated, in no particular order. A server with
/// no reachable endpoint is an absence, not an error; only the
/// device-list fetch itself can fail.
pub async fn enumerate_servers(
    account: &PlexAccount,
    timeout: Duration,
) -> Result<Vec<ReachableEndpoint>> {
    let servers = account.servers().await?;
    scan_servers(servers, timeout).await
}

/// Race the endpoints of each given server; collect every winner.
pub async fn scan_servers(
    servers: Vec<PlexDevice>,
    timeout: Duration,
) -> Result<Vec<ReachableEndpoint>> {
    let client = probe_client(timeout)?;

    let (tx, mut rx) = mpsc::channel(servers.len().max(1));
    for server in servers {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let winner = select_best(&client, &server, timeout).await;
            let _ = tx.send(winner).await;
        });
    }
    drop(tx);

    let mut reachable = Vec::new();
    while let Some(winner) = rx.recv().await {
        if let Some(endpoint) = winner {
            debug!(
                "{} answered at {}",
                endpoint.device.name, endpoint.connection.uri
            );
            reachable.push(endpoint);
        }
    }
    Ok(reachable)
}

/// Probe every endpoint of every server and report each one's status.
///
/// Support for `plex list`: unlike [`enumerate_servers`] this keeps the
/// losers. Rows are collected until `timeout`, then the report is
/// returned as-is. Probes completing later are dropped, trading
/// coverage for a predictable wait.
pub async fn probe_all(account: &PlexAccount, timeout: Duration) -> Result<Vec<EndpointStatus>> {
    let servers = account.servers().await?;
    probe_endpoints(servers, &account.username, timeout).await
}

/// Status rows for every (server, endpoint) pair.
pub async fn probe_endpoints(
    servers: Vec<PlexDevice>,
    username: &str,
    timeout: Duration,
) -> Result<Vec<EndpointStatus>> {
    let client = probe_client(timeout)?;

    let total: usize = servers.iter().map(|server| server.connections.len()).sum();
    let (tx, mut rx) = mpsc::channel(total.max(1));
    for server in servers {
        for connection in &server.connections {
            let client = client.clone();
            let tx = tx.clone();
            let mut row = EndpointStatus {
                server: server.name.clone(),
                owner: server.owner(username).to_string(),
                uri: connection.uri.clone(),
                reachable: false,
            };
            tokio::spawn(async move {
                row.reachable = probe(&client, &row.uri).await;
                let _ = tx.send(row).await;
            });
        }
    }
    drop(tx);

    let deadline = time::Instant::now() + timeout;
    let mut rows = Vec::new();
    loop {
        match time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break,
            // Deadline reached: whatever is still in flight is lost.
            Err(_) => break,
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlexConnection;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn device(name: &str, uris: &[String]) -> PlexDevice {
        PlexDevice {
            name: name.to_string(),
            provides: "server".to_string(),
            source_title: None,
            connections: uris
                .iter()
                .map(|uri| PlexConnection { uri: uri.clone() })
                .collect(),
        }
    }

    async fn mock_server(status: u16, delay: Duration) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(status).set_delay(delay))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_scan_collects_only_servers_with_a_reachable_endpoint() {
        let fast = mock_server(200, Duration::from_millis(50)).await;
        let broken = mock_server(500, Duration::ZERO).await;
        let late = mock_server(200, Duration::from_millis(300)).await;

        let servers = vec![
            device("alpha", &[fast.uri()]),
            device("bravo", &[broken.uri()]),
            device("charlie", &[late.uri()]),
        ];

        let started = Instant::now();
        let reachable = scan_servers(servers, Duration::from_secs(5)).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        let mut names: Vec<_> = reachable
            .iter()
            .map(|endpoint| endpoint.device.name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["alpha", "charlie"]);
    }

    #[tokio::test]
    async fn test_scan_returns_empty_when_nothing_answers() {
        let broken = mock_server(502, Duration::ZERO).await;
        let servers = vec![device("alpha", &[broken.uri()]), device("bravo", &[])];

        let reachable = scan_servers(servers, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(reachable.is_empty());
    }

    #[tokio::test]
    async fn test_probe_endpoints_reports_every_pair() {
        let up = mock_server(200, Duration::ZERO).await;
        let down = mock_server(500, Duration::ZERO).await;

        let servers = vec![
            device("alpha", &[up.uri(), down.uri()]),
            device("bravo", &[up.uri()]),
        ];

        let mut rows = probe_endpoints(servers, "me", Duration::from_secs(5))
            .await
            .unwrap();
        rows.sort_by(|a, b| (&a.server, &a.uri).cmp(&(&b.server, &b.uri)));

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.owner == "me"));
        let down_row = rows
            .iter()
            .find(|row| row.server == "alpha" && row.uri == down.uri())
            .unwrap();
        assert!(!down_row.reachable);
        assert!(rows
            .iter()
            .filter(|row| row.uri == up.uri())
            .all(|row| row.reachable));
    }

    #[tokio::test]
    async fn test_probe_endpoints_returns_at_the_deadline() {
        let up = mock_server(200, Duration::ZERO).await;
        let stalled = mock_server(200, Duration::from_secs(5)).await;

        let servers = vec![device("alpha", &[up.uri(), stalled.uri()])];

        let started = Instant::now();
        let rows = probe_endpoints(servers, "me", Duration::from_millis(400))
            .await
            .unwrap();

        // The stalled endpoint must not stretch the wait; its row either
        // arrives as unreachable at the cut-off or is dropped.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(rows
            .iter()
            .any(|row| row.uri == up.uri() && row.reachable));
        assert!(!rows
            .iter()
            .any(|row| row.uri == stalled.uri() && row.reachable));
    }
}
