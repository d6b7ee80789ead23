use crate::error::{GraphError, Result};
use crate::settings::Settings;
use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::authenticator_delegate::{DeviceAuthResponse, DeviceFlowDelegate};
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::{ApplicationSecret, DeviceFlowAuthenticator};

pub const KEYRING_SERVICE_NAME: &str = "graphcli-token-cache";

/// RFC 8628 grant type; Entra ID rejects the legacy Google value yup-oauth2 defaults to.
const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// What the operator needs to finish signing in on another device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCodePrompt {
    pub verification_uri: String,
    pub user_code: String,
    pub expires_at: OffsetDateTime,
}

impl DeviceCodePrompt {
    pub fn message(&self) -> String {
        format!(
            "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
            self.verification_uri, self.user_code
        )
    }
}

impl From<&DeviceAuthResponse> for DeviceCodePrompt {
    fn from(resp: &DeviceAuthResponse) -> Self {
        Self {
            verification_uri: resp.verification_uri.clone(),
            user_code: resp.user_code.clone(),
            expires_at: resp.expires_at,
        }
    }
}

// Shows the device code to the operator; swapped for a mock in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignInPrompter: Send + Sync {
    async fn present(&self, prompt: &DeviceCodePrompt);
}

pub struct ConsolePrompter;

#[async_trait]
impl SignInPrompter for ConsolePrompter {
    async fn present(&self, prompt: &DeviceCodePrompt) {
        println!("{}", prompt.message());
        if let Ok(expiry) = prompt.expires_at.format(&Rfc3339) {
            println!("(the code expires at {})", expiry);
        }
        tracing::info!("waiting for device-code sign-in");
    }
}

// Adapts a SignInPrompter to the delegate yup-oauth2 calls during the device flow
struct PrompterDelegate {
    prompter: Arc<dyn SignInPrompter>,
}

impl DeviceFlowDelegate for PrompterDelegate {
    fn present_user_code<'a>(
        &'a self,
        device_auth_resp: &'a DeviceAuthResponse,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let prompt = DeviceCodePrompt::from(device_auth_resp);
        Box::pin(async move { self.prompter.present(&prompt).await })
    }
}

// Define a trait for Keyring operations to allow mocking
#[cfg_attr(test, mockall::automock)]
pub trait KeyringEntry: Send + Sync {
    fn get_password(&self) -> Result<String, keyring::Error>;
    fn set_password(&self, password: &str) -> Result<(), keyring::Error>;
    fn delete_password(&self) -> Result<(), keyring::Error>;
}

impl KeyringEntry for Entry {
    fn get_password(&self) -> Result<String, keyring::Error> {
        self.get_password()
    }
    fn set_password(&self, password: &str) -> Result<(), keyring::Error> {
        self.set_password(password)
    }
    fn delete_password(&self) -> Result<(), keyring::Error> {
        self.delete_password()
    }
}

#[derive(Serialize, Deserialize)]
struct CachedToken {
    scopes: Vec<String>,
    token: TokenInfo,
}

/// Token cache kept in the OS keyring, one entry per app registration.
pub struct KeyringTokenStorage<K: KeyringEntry> {
    entry: K,
}

impl<K: KeyringEntry> KeyringTokenStorage<K> {
    pub fn new(entry: K) -> Self {
        Self { entry }
    }
}

fn normalize_scopes<S: AsRef<str>>(scopes: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = scopes
        .iter()
        .map(|s| s.as_ref().to_ascii_lowercase())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

#[async_trait]
impl<K: KeyringEntry> TokenStorage for KeyringTokenStorage<K> {
    async fn set(&self, scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let cached = CachedToken {
            scopes: normalize_scopes(scopes),
            token,
        };
        let json = serde_json::to_string(&cached)?;
        self.entry.set_password(&json)?;
        tracing::debug!("cached token in keyring");
        Ok(())
    }

    async fn get(&self, scopes: &[&str]) -> Option<TokenInfo> {
        let json = match self.entry.get_password() {
            Ok(json) => json,
            Err(keyring::Error::NoEntry) => return None,
            Err(e) => {
                tracing::warn!("cannot read token cache from keyring: {}", e);
                return None;
            }
        };

        let cached: CachedToken = match serde_json::from_str(&json) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("ignoring unreadable token cache: {}", e);
                return None;
            }
        };

        if cached.scopes == normalize_scopes(scopes) {
            Some(cached.token)
        } else {
            tracing::debug!("cached token was issued for different scopes");
            None
        }
    }
}

/// Removes the cached token for this app registration. Missing entries are fine.
pub fn clear_token_cache<K: KeyringEntry>(entry: &K) -> Result<bool> {
    match entry.delete_password() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(GraphError::Keyring(e)),
    }
}

/// Anything that can hand out a bearer token for Graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Device-code credential for a single tenant/app registration.
///
/// The first `token()` call runs the device flow: the prompter is shown the
/// code and the call suspends until the operator signs in or the code
/// expires. Later calls reuse or refresh the cached token.
pub struct DeviceCodeCredential {
    authenticator: DefaultAuthenticator,
    scopes: Vec<String>,
}

impl DeviceCodeCredential {
    pub async fn new(settings: &Settings, prompter: Arc<dyn SignInPrompter>) -> Result<Self> {
        let secret = ApplicationSecret {
            client_id: settings.client_id.clone(),
            token_uri: settings.token_url(),
            ..Default::default()
        };

        let mut builder = DeviceFlowAuthenticator::builder(secret)
            .device_code_url(settings.device_code_url())
            .grant_type(DEVICE_CODE_GRANT_TYPE)
            .flow_delegate(Box::new(PrompterDelegate { prompter }));

        if settings.cache_tokens {
            let entry = Entry::new(KEYRING_SERVICE_NAME, &settings.keyring_username())?;
            builder = builder.with_storage(Box::new(KeyringTokenStorage::new(entry)));
        } else {
            tracing::debug!("token cache disabled, tokens stay in memory");
        }

        let authenticator = builder
            .build()
            .await
            .map_err(|e| GraphError::Auth(format!("cannot build authenticator: {}", e)))?;

        Ok(Self {
            authenticator,
            scopes: settings.graph_user_scopes.clone(),
        })
    }
}

#[async_trait]
impl TokenSource for DeviceCodeCredential {
    async fn token(&self) -> Result<String> {
        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        let access_token = self.authenticator.token(&scopes).await?;
        access_token
            .token()
            .map(str::to_string)
            .ok_or_else(|| GraphError::Auth("token response carried no access token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token() -> TokenInfo {
        TokenInfo {
            access_token: Some("eyJ0eXAi.access".to_string()),
            refresh_token: Some("refresh-123".to_string()),
            expires_at: None,
            id_token: None,
        }
    }

    #[test]
    fn test_prompt_message_matches_entra_wording() {
        let prompt = DeviceCodePrompt {
            verification_uri: "https://microsoft.com/devicelogin".to_string(),
            user_code: "F7KQ2XBNM".to_string(),
            expires_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(
            prompt.message(),
            "To sign in, use a web browser to open the page https://microsoft.com/devicelogin \
             and enter the code F7KQ2XBNM to authenticate."
        );
    }

    #[tokio::test]
    async fn test_delegate_forwards_code_to_prompter() {
        let mut prompter = MockSignInPrompter::new();
        prompter
            .expect_present()
            .withf(|p| p.user_code == "ABCD-1234" && p.verification_uri.ends_with("devicelogin"))
            .times(1)
            .return_const(());

        let delegate = PrompterDelegate {
            prompter: Arc::new(prompter),
        };
        let resp = DeviceAuthResponse {
            device_code: "device-code".to_string(),
            user_code: "ABCD-1234".to_string(),
            verification_uri: "https://microsoft.com/devicelogin".to_string(),
            expires_at: OffsetDateTime::UNIX_EPOCH,
            interval: std::time::Duration::from_secs(5),
        };

        delegate.present_user_code(&resp).await;
    }

    #[tokio::test]
    async fn test_storage_round_trips_for_same_scopes() {
        let stored = Arc::new(std::sync::Mutex::new(None::<String>));

        let mut entry = MockKeyringEntry::new();
        let writer = stored.clone();
        entry.expect_set_password().times(1).returning(move |json| {
            *writer.lock().unwrap() = Some(json.to_string());
            Ok(())
        });
        let reader = stored.clone();
        entry.expect_get_password().returning(move || {
            reader
                .lock()
                .unwrap()
                .clone()
                .ok_or(keyring::Error::NoEntry)
        });

        let storage = KeyringTokenStorage::new(entry);
        storage
            .set(&["Mail.Read", "user.read"], sample_token())
            .await
            .unwrap();

        let hit = storage.get(&["user.read", "mail.read"]).await.unwrap();
        assert_eq!(hit.refresh_token.as_deref(), Some("refresh-123"));

        assert!(storage.get(&["user.read"]).await.is_none());
    }

    #[tokio::test]
    async fn test_storage_miss_when_keyring_empty() {
        let mut entry = MockKeyringEntry::new();
        entry
            .expect_get_password()
            .returning(|| Err(keyring::Error::NoEntry));

        let storage = KeyringTokenStorage::new(entry);
        assert!(storage.get(&["user.read"]).await.is_none());
    }

    #[tokio::test]
    async fn test_storage_ignores_corrupt_entry() {
        let mut entry = MockKeyringEntry::new();
        entry
            .expect_get_password()
            .returning(|| Ok("not json".to_string()));

        let storage = KeyringTokenStorage::new(entry);
        assert!(storage.get(&["user.read"]).await.is_none());
    }

    #[test]
    fn test_clear_token_cache() {
        let mut entry = MockKeyringEntry::new();
        entry.expect_delete_password().times(1).returning(|| Ok(()));
        assert!(clear_token_cache(&entry).unwrap());

        let mut empty = MockKeyringEntry::new();
        empty
            .expect_delete_password()
            .returning(|| Err(keyring::Error::NoEntry));
        assert!(!clear_token_cache(&empty).unwrap());
    }

    #[test]
    fn test_normalize_scopes() {
        assert_eq!(
            normalize_scopes(&["User.Read", "mail.read", "user.read"]),
            vec!["mail.read", "user.read"]
        );
    }
}
