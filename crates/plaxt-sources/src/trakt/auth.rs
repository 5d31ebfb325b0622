use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

/// What is being exchanged at the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    AuthorizationCode(String),
    RefreshToken(String),
}

impl TokenGrant {
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode(_) => "authorization_code",
            TokenGrant::RefreshToken(_) => "refresh_token",
        }
    }

    pub(crate) fn payload(&self, client_id: &str, client_secret: &str, redirect_uri: &str) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": redirect_uri,
            "grant_type": self.grant_type(),
        });
        match self {
            TokenGrant::AuthorizationCode(code) => payload["code"] = code.clone().into(),
            TokenGrant::RefreshToken(token) => payload["refresh_token"] = token.clone().into(),
        }
        payload
    }
}

/// Validated token endpoint response. Both tokens are required and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenSet {
    pub(crate) fn validate(self) -> Result<Self, String> {
        if self.access_token.is_empty() {
            return Err("empty access_token".to_string());
        }
        if self.refresh_token.is_empty() {
            return Err("empty refresh_token".to_string());
        }
        Ok(self)
    }
}

/// Redirect URI registered for this service: `{origin}/authorize?username={username}`.
pub fn redirect_uri(origin: &str, username: &str) -> String {
    format!(
        "{}/authorize?username={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(username)
    )
}

/// Link that starts the Trakt OAuth consent screen.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri)
    )
}
