//! REST client for an identity-toolkit-style provider.

use super::{IdentityError, IdentityProvider, IdentityUser, NewIdentityUser};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct RestIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

impl RestIdentityProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads `IDENTITY_API_URL` and `IDENTITY_API_KEY`. None when the key is
    /// unset, in which case the registration routes are not mounted.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("IDENTITY_API_KEY").ok()?;
        let base_url = std::env::var("IDENTITY_API_URL")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".into());
        Some(Self::new(base_url, api_key))
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key)
    }

    async fn error_from(resp: reqwest::Response) -> IdentityError {
        let body: ProviderErrorBody = match resp.json().await {
            Ok(b) => b,
            Err(e) => return IdentityError::Unavailable(e.to_string()),
        };
        let message = body
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "unknown provider error".into());
        match message.as_str() {
            m if m.starts_with("EMAIL_EXISTS") => IdentityError::EmailExists,
            m if m.starts_with("INVALID_PHONE_NUMBER") => IdentityError::InvalidPhone,
            m if m.starts_with("PHONE_NUMBER_EXISTS") => IdentityError::PhoneExists,
            _ => IdentityError::Unavailable(message),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn create_user(&self, new_user: NewIdentityUser) -> Result<IdentityUser, IdentityError> {
        let mut payload = json!({
            "email": new_user.email,
            "password": new_user.password,
            "returnSecureToken": false,
        });
        if let Some(name) = &new_user.display_name {
            payload["displayName"] = json!(name);
        }
        // The sign-up endpoint does not enroll phone numbers; the phone is
        // kept on the local users row instead.
        let resp = self
            .http
            .post(self.endpoint("signUp"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        let created: SignUpResponse = resp
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(IdentityUser {
            uid: created.local_id,
            email: created.email.or(Some(new_user.email)),
            display_name: new_user.display_name,
            phone: None,
        })
    }

    async fn fetch_user(&self, uid: &str) -> Result<IdentityUser, IdentityError> {
        let resp = self
            .http
            .post(self.endpoint("lookup"))
            .json(&json!({ "localId": [uid] }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        let body: LookupResponse = resp
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let user = body.users.into_iter().next().ok_or(IdentityError::NotFound)?;
        Ok(IdentityUser {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            phone: user.phone_number,
        })
    }
}
