#![allow(dead_code)]

use async_trait::async_trait;
use graphcli::graph_api::{GraphContext, TokenSource};
use graphcli::settings::{MenuDefaults, Settings};
use graphcli::Result;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-access-token";

pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
}

/// Minimal HTTP/1.1 responder standing in for Graph and the sign-in
/// authority. Each route answers a fixed method and path; anything else gets
/// a Graph-style 404.
pub struct FakeGraph {
    routes: Vec<Route>,
}

pub struct RunningGraph {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Route under the Graph `/v1.0` base.
    pub fn route(self, method: &str, path: &str, status: u16, body: serde_json::Value) -> Self {
        self.route_at(method, &format!("/v1.0{}", path), status, body)
    }

    /// Route at an absolute path, e.g. the sign-in endpoints.
    pub fn route_at(mut self, method: &str, path: &str, status: u16, body: serde_json::Value) -> Self {
        self.routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: if body.is_null() {
                String::new()
            } else {
                body.to_string()
            },
        });
        self
    }

    pub async fn start(self) -> RunningGraph {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let routes = Arc::new(self.routes);
        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve_one(stream, &routes, &recorded).await;
                });
            }
        });

        RunningGraph {
            base_url: format!("http://{}/v1.0", addr),
            requests,
        }
    }
}

impl RunningGraph {
    pub fn authority(&self) -> &str {
        self.base_url.trim_end_matches("/v1.0")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn context(&self) -> GraphContext {
        let mut context = GraphContext::new();
        context
            .initialize_with_credential(
                test_settings(&self.base_url),
                Arc::new(StaticToken(TEST_TOKEN.to_string())),
            )
            .unwrap();
        context
    }
}

pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        tenant_id: "contoso.onmicrosoft.com".to_string(),
        client_id: "11111111-2222-3333-4444-555555555555".to_string(),
        graph_user_scopes: vec!["user.read".to_string(), "mail.read".to_string()],
        graph_base_url: base_url.to_string(),
        login_authority: base_url.trim_end_matches("/v1.0").to_string(),
        cache_tokens: false,
        defaults: MenuDefaults::default(),
    }
}

async fn serve_one(
    stream: tokio::net::TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target, String::new()),
    };

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value.to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query,
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body) = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or_else(|| {
            (
                404,
                serde_json::json!({
                    "error": { "code": "itemNotFound", "message": "No route for this request." }
                })
                .to_string(),
            )
        });

    let response = format!(
        "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    write_half.write_all(response.as_bytes()).await?;
    write_half.shutdown().await?;
    Ok(())
}
