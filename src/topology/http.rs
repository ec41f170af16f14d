use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    network::element::{Elements, ElementsWire},
    topology::source::{TopologyError, TopologyResult, TopologySource},
};

pub const ELEMENTS_PATH: &str = "/api/nodes_and_edges";

/// Fetches the element set from `GET {base}/api/nodes_and_edges`.
pub struct ApiSource {
    client: Client,
    url: String,
}

impl ApiSource {
    pub fn new(base_url: &str, timeout: Duration) -> TopologyResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), ELEMENTS_PATH),
        })
    }
}

#[async_trait]
impl TopologySource for ApiSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_elements(&self) -> TopologyResult<Elements> {
        debug!(url = %self.url, "Requesting topology");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TopologyError::Status {
                url: self.url.clone(),
                status,
            });
        }
        let body = response.bytes().await?;
        let wire: ElementsWire = serde_json::from_slice(&body)?;
        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves exactly one canned HTTP response and reports the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{addr}/"), handle)
    }

    #[tokio::test]
    async fn fetches_elements_from_the_endpoint() {
        let (base, server) = serve_once("200 OK", include_str!("../../test_data/three_hop.json")).await;
        let source = ApiSource::new(&base, Duration::from_secs(5)).unwrap();

        let elements = source.fetch_elements().await.unwrap();
        assert_eq!(elements.nodes.len(), 3);
        assert_eq!(elements.edges.len(), 2);

        let request_line = server.await.unwrap();
        assert_eq!(request_line, "GET /api/nodes_and_edges HTTP/1.1");
    }

    #[tokio::test]
    async fn empty_object_is_an_empty_topology() {
        let (base, _server) = serve_once("200 OK", "{}").await;
        let source = ApiSource::new(&base, Duration::from_secs(5)).unwrap();
        assert!(source.fetch_elements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (base, _server) = serve_once("500 Internal Server Error", "oops").await;
        let source = ApiSource::new(&base, Duration::from_secs(5)).unwrap();
        let err = source.fetch_elements().await.unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (base, _server) = serve_once("200 OK", "[1, 2").await;
        let source = ApiSource::new(&base, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.fetch_elements().await,
            Err(TopologyError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = ApiSource::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        assert!(matches!(
            source.fetch_elements().await,
            Err(TopologyError::Http(_))
        ));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let source = ApiSource::new("http://example.net/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.describe(), "http://example.net/api/nodes_and_edges");
    }
}
