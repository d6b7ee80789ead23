use crate::error::{GraphError, Result};
use crate::graph_api::auth::{DeviceCodeCredential, SignInPrompter, TokenSource};
use crate::settings::Settings;
use crate::types::ErrorResponse;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated connection to Graph: settings, credential and HTTP client.
pub struct Session {
    settings: Settings,
    credential: Arc<dyn TokenSource>,
    http: Client,
}

/// Explicit handle every facade call goes through.
///
/// Starts empty; `initialize` fills it exactly once. Calls made before that
/// fail with [`GraphError::Uninitialized`].
#[derive(Default)]
pub struct GraphContext {
    session: Option<Session>,
}

impl GraphContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the device-code credential and the HTTP client. No network
    /// traffic happens until the first token is needed.
    pub async fn initialize(
        &mut self,
        settings: Settings,
        prompter: Arc<dyn SignInPrompter>,
    ) -> Result<()> {
        let credential = DeviceCodeCredential::new(&settings, prompter).await?;
        self.initialize_with_credential(settings, Arc::new(credential))
    }

    pub fn initialize_with_credential(
        &mut self,
        settings: Settings,
        credential: Arc<dyn TokenSource>,
    ) -> Result<()> {
        if self.session.is_some() {
            return Err(GraphError::Config(
                "Graph has already been initialized".to_string(),
            ));
        }

        let http = build_http_client()?;
        tracing::info!(
            tenant = %settings.tenant_id,
            base_url = %settings.graph_base_url,
            "graph client initialized"
        );
        self.session = Some(Session {
            settings,
            credential,
            http,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(GraphError::Uninitialized)
    }
}

fn build_http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("graphcli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

impl Session {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn token(&self) -> Result<String> {
        self.credential.token().await
    }

    /// `{base}/{segments...}` with every segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.settings.graph_base_url)
            .map_err(|e| GraphError::Config(format!("invalid graph base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GraphError::Config("graph base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.token().await?;
        tracing::debug!(%method, %url, "graph request");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/json"))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.request(Method::GET, url).await?.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, url)
            .await?
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST whose success response carries nothing worth reading (202/204).
    pub async fn post_empty<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<()> {
        let response = self
            .request(Method::POST, url)
            .await?
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let err = service_error(status.as_u16(), &text);
    tracing::warn!("graph returned {}", err);
    Err(err)
}

/// Maps a failed Graph response onto [`GraphError::Service`], falling back to
/// the HTTP reason when the body is not the usual error envelope.
pub fn service_error(status: u16, body: &str) -> GraphError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) => GraphError::Service {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => GraphError::Service {
            status,
            code: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("HttpError")
                .to_string(),
            message: body.trim().to_string(),
        },
    }
}
