//! FreeIPA directory backend.
//!
//! Talks to the FreeIPA JSON-RPC API over HTTPS:
//!
//! ```text
//! POST /ipa/session/login_password   user=..&password=..   -> ipa_session cookie
//! POST /ipa/session/json             {"method": "user_find/1", ...}
//! POST /ipa/session/json             {"method": "user_mod/1", ...}
//! ```
//!
//! The card's employee number is stored in the `employeenumber` attribute and
//! the last card code in `employeetype`.
//!
//! # Design Principles
//!
//! - **No automatic retry**: an expired session or a dropped connection is
//!   reported as a connection failure; the gate decides whether to call
//!   [`DirectoryService::reconnect`].
//! - **Fresh session on reconnect**: the HTTP client and its cookie jar are
//!   rebuilt, then the login is repeated.

use crate::error::{DirectoryError, Result};
use crate::service::{DirectoryRecord, DirectoryService, UserLookup};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// JSON-RPC API version sent with every call.
pub const API_VERSION: &str = "2.251";

/// Timeout for every HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a FreeIPA server.
#[derive(Clone)]
pub struct FreeIpaConfig {
    /// Server host name, e.g. `ipa.example.org`.
    pub host: String,

    /// Verify the server's TLS certificate.
    pub verify_ssl: bool,

    /// Service account used to log in.
    pub username: String,

    /// Password of the service account.
    pub password: String,
}

impl fmt::Debug for FreeIpaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeIpaConfig")
            .field("host", &self.host)
            .field("verify_ssl", &self.verify_ssl)
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

/// Directory backed by a FreeIPA server.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_directory::{DirectoryService, FreeIpaConfig, FreeIpaDirectory};
///
/// # async fn example() -> gatekeeper_directory::Result<()> {
/// let config = FreeIpaConfig {
///     host: "ipa.example.org".to_string(),
///     verify_ssl: true,
///     username: "gatekeeper".to_string(),
///     password: "secret".to_string(),
/// };
///
/// let directory = FreeIpaDirectory::connect(config).await?;
/// let lookup = directory.find_by_employee_id("12345678").await?;
/// println!("{}", lookup.match_summary);
/// # Ok(())
/// # }
/// ```
pub struct FreeIpaDirectory {
    config: FreeIpaConfig,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for FreeIpaDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeIpaDirectory")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FreeIpaDirectory {
    /// Create a client without logging in.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: FreeIpaConfig) -> Result<Self> {
        let base_url = format!("https://{}", config.host.trim_end_matches('/'));
        let http = Self::build_http(&config)?;

        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    /// Create a client and log in.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the login is refused, or a
    /// transport error if the server cannot be reached.
    pub async fn connect(config: FreeIpaConfig) -> Result<Self> {
        let directory = Self::new(config)?;
        directory.login().await?;
        Ok(directory)
    }

    fn build_http(config: &FreeIpaConfig) -> Result<reqwest::Client> {
        if !config.verify_ssl {
            warn!("TLS certificate verification is disabled for {}", config.host);
        }

        reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::configuration(e.to_string()))
    }

    fn referer(&self) -> String {
        format!("{}/ipa", self.base_url)
    }

    async fn login(&self) -> Result<()> {
        info!(
            "Logging in to FreeIPA at {} as {}",
            self.base_url, self.config.username
        );

        let response = self
            .http
            .post(format!("{}/ipa/session/login_password", self.base_url))
            .header(reqwest::header::REFERER, self.referer())
            .header(reqwest::header::ACCEPT, "text/plain")
            .form(&[
                ("user", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                debug!("FreeIPA session established");
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(DirectoryError::authentication(format!(
                "login rejected for {}",
                self.config.username
            ))),
            status if status.is_server_error() => Err(DirectoryError::transport(format!(
                "login returned HTTP {status}"
            ))),
            status => Err(DirectoryError::authentication(format!(
                "login returned HTTP {status}"
            ))),
        }
    }

    async fn call(&self, method: &str, args: Value, mut options: Value) -> Result<Value> {
        if let Some(options) = options.as_object_mut() {
            options.insert("version".to_string(), json!(API_VERSION));
        }
        let body = json!({
            "method": method,
            "params": [args, options],
            "id": 0,
        });

        debug!("FreeIPA call {}", method);
        let response = self
            .http
            .post(format!("{}/ipa/session/json", self.base_url))
            .header(reqwest::header::REFERER, self.referer())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DirectoryError::SessionExpired);
        }
        if status.is_server_error() {
            return Err(DirectoryError::transport(format!(
                "{method} returned HTTP {status}"
            )));
        }
        if !status.is_success() {
            return Err(DirectoryError::invalid_response(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let reply: RpcReply = response.json().await?;
        reply.into_result()
    }
}

impl DirectoryService for FreeIpaDirectory {
    async fn find_by_employee_id(&self, employee_id: &str) -> Result<UserLookup> {
        let result = self
            .call(
                "user_find/1",
                json!([]),
                json!({ "employeenumber": employee_id }),
            )
            .await?;
        parse_user_find(result)
    }

    async fn update_lcc(&self, net_id: &str, lcc: &str) -> Result<()> {
        self.call("user_mod/1", json!([net_id]), json!({ "employeetype": lcc }))
            .await?;
        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.http = Self::build_http(&self.config)?;
        self.login().await
    }
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl RpcReply {
    fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(DirectoryError::rpc(err.code, err.name, err.message));
        }
        self.result
            .ok_or_else(|| DirectoryError::invalid_response("reply has neither result nor error"))
    }
}

/// `result` object of a `user_find` reply.
#[derive(Debug, Deserialize)]
struct FindResult {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    result: Vec<FoundUser>,
}

/// FreeIPA returns every attribute as a list of values.
#[derive(Debug, Deserialize)]
struct FoundUser {
    #[serde(default)]
    uid: Vec<String>,
    #[serde(default)]
    employeetype: Vec<String>,
    #[serde(default)]
    memberof_group: Vec<String>,
}

/// Convert the `result` of a `user_find` reply into a lookup.
///
/// # Errors
///
/// Returns an invalid response error if the shape is wrong or a record has
/// no `uid`.
pub fn parse_user_find(result: Value) -> Result<UserLookup> {
    let found: FindResult = serde_json::from_value(result)?;

    let records = found
        .result
        .into_iter()
        .map(|user| -> Result<DirectoryRecord> {
            let net_id = user
                .uid
                .into_iter()
                .next()
                .ok_or_else(|| DirectoryError::invalid_response("user record without uid"))?;
            Ok(DirectoryRecord {
                net_id,
                lcc: user.employeetype.into_iter().next(),
                groups: user.memberof_group,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UserLookup::new(found.summary.unwrap_or_default(), records))
}
