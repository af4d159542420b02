//! In-process HTTP server answering like Vault's `sys/` endpoints
//!
//! Speaks just enough HTTP/1.1 for `reqwest`: one request per connection,
//! `Connection: close` on every response. Routes are matched on method and
//! path; unknown routes get a Vault-style 404.

use log::{debug, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: String,
}

#[derive(Default)]
struct ServerState {
    routes: HashMap<(String, String), CannedResponse>,
    requests: Vec<RecordedRequest>,
}

/// Mock Vault server bound to an ephemeral localhost port
pub struct MockVaultServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    handle: JoinHandle<()>,
}

impl MockVaultServer {
    /// Bind to `127.0.0.1:0` and start serving in the background
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ServerState::default()));

        let accept_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            loop {
                let (stream, peer) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Mock server accept failed: {e}");
                        break;
                    }
                };
                debug!("Mock server connection from {peer}");
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, state).await {
                        warn!("Mock server connection error: {e}");
                    }
                });
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Address to configure the client with, e.g. `http://127.0.0.1:41234`
    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` with `status` and `body`
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.state.lock().unwrap().routes.insert(
            (method.to_ascii_uppercase(), path.to_string()),
            CannedResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Route `PUT /v1/sys/rotate` to a 204
    pub fn accept_rotation(&self) {
        self.respond("PUT", "/v1/sys/rotate", 204, "");
    }

    /// Route `GET /v1/sys/key-status` to the given term and install time
    pub fn report_key_status(&self, term: u32, install_time: &str) {
        let body = format!(r#"{{"term": {term}, "install_time": "{install_time}"}}"#);
        self.respond("GET", "/v1/sys/key-status", 200, &body);
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Drop for MockVaultServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<Mutex<ServerState>>,
) -> std::io::Result<()> {
    let Some(request) = read_request(&mut stream).await? else {
        return Ok(());
    };

    let response = {
        let mut state = state.lock().unwrap();
        let key = (request.method.clone(), request.path.clone());
        let response = state.routes.get(&key).cloned().unwrap_or(CannedResponse {
            status: 404,
            body: r#"{"errors": []}"#.to_string(),
        });
        state.requests.push(request);
        response
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(response.body.as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<RecordedRequest>> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buffer) {
            break pos;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    }))
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
