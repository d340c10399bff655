//! Endpoint reachability probing.
//!
//! A probe is one HTTP GET against an endpoint's root URI, no retries.
//! [`select_best`] races every endpoint of a server and takes the first
//! success: LAN endpoints typically answer in milliseconds while public
//! ones can take seconds, so the caller waits close to the fastest
//! responder while still succeeding when only the slow path works.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time;
use tracing::debug;

use crate::error::Result;
use crate::models::{PlexDevice, ReachableEndpoint};

/// Build the process-scoped client shared by every probe task.
///
/// The per-probe timeout lives on the client; the client is cheap to
/// clone and safe to share across tasks.
pub fn probe_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Probe one endpoint.
///
/// Reachable means any response short of a server error arrived before
/// the client timeout. Transport errors, timeouts and 5xx all count as
/// unreachable; 4xx does not, an unauthenticated server still answers.
pub async fn probe(client: &Client, uri: &str) -> bool {
    match client.get(uri).send().await {
        Ok(response) => {
            debug!("probe {}: {}", uri, response.status());
            !response.status().is_server_error()
        }
        Err(error) => {
            debug!("probe {} failed: {}", uri, error);
            false
        }
    }
}

/// Race every endpoint of `device`; the first reachable one wins.
///
/// All probes start at the same instant. The function returns as soon as
/// one reports reachable, or `None` once the deadline passes or every
/// probe has failed; that is a normal result, not an error. Probes still in
/// flight after the winner is chosen finish into a closed channel;
/// nothing shared is mutated after return.
pub async fn select_best(
    client: &Client,
    device: &PlexDevice,
    timeout: Duration,
) -> Option<ReachableEndpoint> {
    if device.connections.is_empty() {
        return None;
    }

    let (tx, mut rx) = mpsc::channel(device.connections.len());
    for connection in device.connections.clone() {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if probe(&client, &connection.uri).await {
                let _ = tx.send(connection).await;
            }
        });
    }
    // A closed channel below means every probe has already failed.
    drop(tx);

    match time::timeout(timeout, rx.recv()).await {
        Ok(Some(connection)) => Some(ReachableEndpoint {
            device: device.clone(),
            connection,
        }),
        Ok(None) | Err(_) => None,
    }
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
    async fn test_probe_accepts_any_non_server_error() {
        let ok = mock_server(200, Duration::ZERO).await;
        let unauthorized = mock_server(401, Duration::ZERO).await;
        let broken = mock_server(500, Duration::ZERO).await;
        let client = probe_client(Duration::from_secs(2)).unwrap();

        assert!(probe(&client, &ok.uri()).await);
        assert!(probe(&client, &unauthorized.uri()).await);
        assert!(!probe(&client, &broken.uri()).await);
    }

    #[tokio::test]
    async fn test_probe_fails_on_transport_error() {
        let client = probe_client(Duration::from_millis(500)).unwrap();
        // Reserved port, nothing listens there.
        assert!(!probe(&client, "http://127.0.0.1:1/").await);
    }

    #[tokio::test]
    async fn test_select_best_returns_the_first_responder() {
        let fast = mock_server(200, Duration::from_millis(20)).await;
        let slow = mock_server(200, Duration::from_millis(2000)).await;
        // Slow endpoint listed first: arrival order must beat listing order.
        let device = device("office", &[slow.uri(), fast.uri()]);
        let client = probe_client(Duration::from_secs(5)).unwrap();

        let started = Instant::now();
        let winner = select_best(&client, &device, Duration::from_secs(5))
            .await
            .expect("one endpoint is reachable");

        assert_eq!(winner.connection.uri, fast.uri());
        assert!(
            started.elapsed() < Duration::from_millis(1500),
            "winner should be selected well before the slow endpoint answers"
        );
    }

    #[tokio::test]
    async fn test_select_best_honours_the_deadline() {
        let stalled = mock_server(200, Duration::from_secs(5)).await;
        let device = device("office", &[stalled.uri()]);
        let client = probe_client(Duration::from_secs(5)).unwrap();

        let started = Instant::now();
        let winner = select_best(&client, &device, Duration::from_millis(300)).await;

        assert!(winner.is_none());
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "deadline should cut the wait short"
        );
    }

    #[tokio::test]
    async fn test_select_best_returns_early_when_every_probe_fails() {
        let broken = mock_server(500, Duration::ZERO).await;
        let device = device("office", &[broken.uri()]);
        let client = probe_client(Duration::from_secs(2)).unwrap();

        let started = Instant::now();
        let winner = select_best(&client, &device, Duration::from_secs(30)).await;

        assert!(winner.is_none());
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "all probes failed, no reason to wait for the deadline"
        );
    }

    #[tokio::test]
    async fn test_select_best_handles_a_server_without_endpoints() {
        let device = device("empty", &[]);
        let client = probe_client(Duration::from_secs(1)).unwrap();

        assert!(select_best(&client, &device, Duration::from_secs(1))
            .await
            .is_none());
    }
}
