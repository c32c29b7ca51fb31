//! Confidential client authentication for the Microsoft identity platform.
//!
//! Implements the OAuth2 client-credentials grant against
//! `{authority}/{tenant}/oauth2/v2.0/token`, with either a client secret or
//! an RS256 certificate assertion as the credential. Tokens are cached until
//! shortly before expiry.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{GraphError, Result};
use crate::models::{ConfidentialClientCredentials, TokenResponse};

/// Default Microsoft identity platform login host.
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Scope covering the application's granted Graph permissions.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Assertion type for certificate-based client credentials.
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// JWT claims for a certificate client assertion.
#[derive(Debug, Serialize)]
struct Claims {
    aud: String, // Audience (token endpoint)
    iss: String, // Issuer (client/application id)
    sub: String, // Subject (client/application id)
    jti: String, // Unique assertion id
    nbf: u64,    // Not before
    iat: u64,    // Issued at
    exp: u64,    // Expiration time
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Authenticator for Microsoft Graph using confidential client credentials.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<ConfidentialClientCredentials>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator from a JSON credentials file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: ConfidentialClientCredentials = serde_json::from_str(&content)?;
        Ok(Self::new(credentials))
    }

    /// Create a new authenticator from credentials.
    pub fn new(credentials: ConfidentialClientCredentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Token endpoint for the credential's tenant.
    fn token_endpoint(&self) -> String {
        let authority = self
            .credentials
            .authority
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY)
            .trim_end_matches('/');
        format!("{}/{}/oauth2/v2.0/token", authority, self.credentials.tenant_id)
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // Add 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // Request a fresh token
        let new_token = self.request_token().await?;

        // Cache the new token
        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Request an access token with the client-credentials grant.
    async fn request_token(&self) -> Result<CachedToken> {
        let endpoint = self.token_endpoint();
        let credentials = &self.credentials;

        let mut params: Vec<(&str, String)> = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", credentials.client_id.clone()),
            ("scope", GRAPH_SCOPE.to_string()),
        ];

        if let Some(secret) = &credentials.client_secret {
            params.push(("client_secret", secret.clone()));
        } else if let (Some(key), Some(thumbprint)) = (
            &credentials.private_key,
            &credentials.certificate_thumbprint,
        ) {
            let assertion = self.build_client_assertion(&endpoint, key, thumbprint)?;
            params.push(("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()));
            params.push(("client_assertion", assertion));
        } else {
            return Err(GraphError::AuthenticationError(
                "credentials need either client_secret or private_key with certificate_thumbprint"
                    .to_string(),
            ));
        }

        let response = self.client.post(&endpoint).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::TokenRefreshError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Build the signed JWT assertion for certificate credentials.
    fn build_client_assertion(
        &self,
        endpoint: &str,
        private_key: &str,
        thumbprint: &str,
    ) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_secs();

        let claims = Claims {
            aud: endpoint.to_string(),
            iss: self.credentials.client_id.clone(),
            sub: self.credentials.client_id.clone(),
            jti: Uuid::new_v4().to_string(),
            nbf: now,
            iat: now,
            exp: now + 600, // 10 minutes
        };

        let mut header = Header::new(Algorithm::RS256);
        header.x5t = Some(thumbprint_x5t(thumbprint)?);
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        Ok(jwt)
    }
}

/// Convert a hex certificate thumbprint (as the Azure portal shows it,
/// colons optional) into the base64url `x5t` header value.
fn thumbprint_x5t(thumbprint: &str) -> Result<String> {
    let digest = hex::decode(thumbprint.replace(':', ""))?;
    Ok(URL_SAFE_NO_PAD.encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            aud: "https://login.microsoftonline.com/tenant/oauth2/v2.0/token".to_string(),
            iss: "app-id".to_string(),
            sub: "app-id".to_string(),
            jti: "0af1dbbc-2418-4191-a06c-8b78e2b4421e".to_string(),
            nbf: 1234567890,
            iat: 1234567890,
            exp: 1234568490,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("oauth2/v2.0/token"));
        assert!(json.contains("app-id"));
        assert!(json.contains("1234568490"));
    }

    #[test]
    fn test_thumbprint_x5t() {
        let x5t = thumbprint_x5t("9F86D081884C7D659A2FEAA0C55AD015A3BF4F1B").unwrap();
        assert_eq!(x5t, "n4bQgYhMfWWaL-qgxVrQFaO_Txs");

        // Colon-separated portal copy-paste form decodes the same.
        let with_colons = thumbprint_x5t("9F:86:D0:81:88:4C:7D:65:9A:2F:EA:A0:C5:5A:D0:15:A3:BF:4F:1B");
        assert_eq!(with_colons.unwrap(), "n4bQgYhMfWWaL-qgxVrQFaO_Txs");
    }

    #[test]
    fn test_thumbprint_rejects_non_hex() {
        assert!(thumbprint_x5t("not-a-thumbprint").is_err());
    }

    #[test]
    fn test_token_endpoint_formatting() {
        let auth = Authenticator::new(ConfidentialClientCredentials {
            tenant_id: "my-tenant".to_string(),
            client_id: "app".to_string(),
            client_secret: Some("s".to_string()),
            private_key: None,
            certificate_thumbprint: None,
            authority: None,
        });
        assert_eq!(
            auth.token_endpoint(),
            "https://login.microsoftonline.com/my-tenant/oauth2/v2.0/token"
        );

        let auth = Authenticator::new(ConfidentialClientCredentials {
            tenant_id: "my-tenant".to_string(),
            client_id: "app".to_string(),
            client_secret: Some("s".to_string()),
            private_key: None,
            certificate_thumbprint: None,
            authority: Some("http://127.0.0.1:9999/".to_string()),
        });
        assert_eq!(
            auth.token_endpoint(),
            "http://127.0.0.1:9999/my-tenant/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn test_missing_credential_material() {
        let auth = Authenticator::new(ConfidentialClientCredentials {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: None,
            private_key: None,
            certificate_thumbprint: None,
            authority: None,
        });
        let err = auth.get_access_token().await.unwrap_err();
        assert!(matches!(err, GraphError::AuthenticationError(_)));
    }
}
