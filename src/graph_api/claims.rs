use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawClaims {
    aud: Option<String>,
    scp: Option<String>,
    exp: Option<i64>,
    upn: Option<String>,
    preferred_username: Option<String>,
}

/// The parts of an Entra ID access token worth showing next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub audience: Option<String>,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: Option<String>,
}

impl TokenClaims {
    /// Reads the payload of a JWT without verifying it. Tokens issued to
    /// personal accounts are opaque, those give `None`.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() {
            return None;
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let raw: RawClaims = serde_json::from_slice(&bytes).ok()?;

        Some(Self {
            audience: raw.aud,
            scopes: raw
                .scp
                .map(|scp| scp.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            expires_at: raw.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
            user: raw.upn.or(raw.preferred_username),
        })
    }
}
