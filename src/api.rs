// API client module: a small blocking HTTP client for the privacyIDEA REST
// API. A run makes exactly two calls, one after the other: POST /auth for a
// token, then GET /user/ for the realm's users.

use crate::error::{AppError, AppResult};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Skip TLS certificate verification. Off unless asked for.
    pub insecure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
        }
    }
}

/// Holds a reqwest blocking client, the base URL of the privacyIDEA server
/// and, once logged in, the auth token for subsequent calls.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

/// Login request payload.
#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Every privacyIDEA response wraps its payload in `result`.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    result: ResultBody<T>,
}

#[derive(Deserialize, Debug)]
struct ResultBody<T> {
    #[serde(default)]
    status: bool,
    value: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Debug)]
struct TokenValue {
    token: String,
}

/// One user as returned by `GET /user/`.
///
/// LDAP-backed resolvers may hand back multi-valued attributes, so the
/// scalar fields also accept a list (joined with `, `) or `null`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "givenname", deserialize_with = "lenient_string")]
    pub given_name: String,
    #[serde(rename = "memberOf", alias = "groups", deserialize_with = "lenient_list")]
    pub member_of: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub mobile: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub resolver: String,
    #[serde(deserialize_with = "lenient_string")]
    pub surname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
}

fn scalar_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other),
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        other => vec![scalar_to_string(other)],
    })
}

impl ApiClient {
    /// Build a client for the server at `base_url`. A trailing `/` is fine.
    pub fn new(base_url: &str, options: &ClientOptions) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .build()
            .map_err(|e| AppError::RequestFailure(format!("failed to build HTTP client: {}", e)))?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Store the auth token for subsequent requests.
    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// privacyIDEA expects the bare token in the Authorization header.
    fn auth_headers(&self) -> AppResult<HeaderMap> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| AppError::AuthFailure("not logged in".into()))?;
        let mut value = HeaderValue::from_str(token.expose_secret())
            .map_err(|_| AppError::AuthFailure("token is not a valid header value".into()))?;
        value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// POST /auth and return the token on success.
    pub fn login(&self, username: &str, password: &SecretString) -> AppResult<SecretString> {
        let url = format!("{}/auth", self.base_url);
        debug!(%url, user = %username, "requesting api token");
        let res = self
            .client
            .post(&url)
            .json(&AuthRequest {
                username,
                password: password.expose_secret(),
            })
            .send()?;
        let value: TokenValue = read_result(check_status(res, "auth")?, "auth")?;
        Ok(SecretString::new(value.token))
    }

    /// Log in and keep the token on the client.
    pub fn authenticate(&mut self, username: &str, password: &SecretString) -> AppResult<()> {
        let token = self.login(username, password)?;
        self.set_token(token);
        Ok(())
    }

    /// GET /user/?realm=<realm>. Requires a token.
    pub fn users_by_realm(&self, realm: &str) -> AppResult<Vec<User>> {
        let url = format!("{}/user/", self.base_url);
        debug!(%url, %realm, "requesting users");
        let res = self
            .client
            .get(&url)
            .query(&[("realm", realm)])
            .headers(self.auth_headers()?)
            .send()?;
        read_result(check_status(res, "get users")?, "get users")
    }
}

/// 401 is an auth failure; anything else but 200 is a request failure.
fn check_status(res: Response, what: &str) -> AppResult<Response> {
    let status = res.status();
    if status == StatusCode::OK {
        return Ok(res);
    }
    let txt = res.text().unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        Err(AppError::AuthFailure(format!("{}: {} - {}", what, status, txt)))
    } else {
        Err(AppError::RequestFailure(format!("{}: {} - {}", what, status, txt)))
    }
}

fn read_result<T: DeserializeOwned>(res: Response, what: &str) -> AppResult<T> {
    let envelope: Envelope<T> = res
        .json()
        .map_err(|e| AppError::RequestFailure(format!("{}: invalid response body: {}", what, e)))?;
    let body = envelope.result;
    if !body.status {
        let message = body.error.map(|e| e.message).unwrap_or_default();
        return Err(AppError::AuthFailure(format!("{}: server refused: {}", what, message)));
    }
    body.value
        .ok_or_else(|| AppError::RequestFailure(format!("{}: response has no value", what)))
}
