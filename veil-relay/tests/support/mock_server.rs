//! Mock HTTP server standing in for the relay provider
//!
//! The server can:
#![allow(dead_code)] // Test utility module - not all methods used in every test
//! - Answer every request with a configured status and body
//! - Delay its response to exercise client timeouts
//! - Record every request it receives for verification
//!
//! # Example
//!
//! ```rust,no_run
//! use support::mock_server::MockHttpServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MockHttpServer::builder()
//!     .with_response(401, "Unauthorized")
//!     .build()
//!     .await?;
//!
//! // POST to server.url("/v3.1/send")
//! let requests = server.requests().await;
//! # Ok(())
//! # }
//! ```

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    task::JoinHandle,
};

/// A request as received by the mock server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The body parsed as JSON
    ///
    /// # Panics
    ///
    /// If the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|err| panic!("request body is not JSON: {err}"))
    }
}

#[derive(Debug, Clone)]
struct MockServerConfig {
    status: u16,
    body: String,
    response_delay: Option<Duration>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: r#"{"Messages":[{"Status":"success"}]}"#.to_string(),
            response_delay: None,
        }
    }
}

pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockHttpServer {
    #[must_use]
    pub fn builder() -> MockHttpServerBuilder {
        MockHttpServerBuilder {
            config: MockServerConfig::default(),
        }
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }

    async fn handle_client(
        mut stream: TcpStream,
        config: Arc<MockServerConfig>,
        requests: Arc<RwLock<Vec<RecordedRequest>>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                return Ok(());
            }
            buffer.extend_from_slice(&chunk[..read]);

            if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                break end;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split(' ');
        let method = request_line.next().unwrap_or_default().to_string();
        let path = request_line.next().unwrap_or_default().to_string();

        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(key, _)| key == "content-length")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = buffer[header_end + 4..].to_vec();
        while body.len() < content_length {
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }

        requests.write().await.push(RecordedRequest {
            method,
            path,
            headers,
            body,
        });

        if let Some(delay) = config.response_delay {
            tokio::time::sleep(delay).await;
        }

        let response = format!(
            "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            config.status,
            config.body.len(),
            config.body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        Ok(())
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct MockHttpServerBuilder {
    config: MockServerConfig,
}

impl MockHttpServerBuilder {
    /// Answer every request with `status` and `body`
    #[must_use]
    pub fn with_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.config.status = status;
        self.config.body = body.into();
        self
    }

    /// Wait before answering
    #[must_use]
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.config.response_delay = Some(delay);
        self
    }

    pub async fn build(self) -> std::io::Result<MockHttpServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let config = Arc::new(self.config);
        let requests = Arc::new(RwLock::new(Vec::new()));

        let handle = {
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let config = Arc::clone(&config);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        if let Err(err) =
                            MockHttpServer::handle_client(stream, config, requests).await
                        {
                            eprintln!("Mock server connection failed: {err}");
                        }
                    });
                }
            })
        };

        Ok(MockHttpServer {
            addr,
            requests,
            handle,
        })
    }
}
