//! Chorus Pro API calls: pre-post gate, commitment numbers, status
//! synchronisation and flow deposit.
//!
//! All calls go through a [`ChorusTransport`]. The crate ships
//! [`ReplayTransport`] for tests and, with the `http` feature, a blocking
//! HTTP transport.
//!
//! # Example
//!
//! ```
//! use chorus_pro::api::*;
//! use serde_json::json;
//!
//! let transport = ReplayTransport::new()
//!     .respond(HISTORY_PATH, json!({"idFacture": 4242, "statutCourantCode": "MISE_A_DISPOSITION"}));
//! let chorus = Chorus::new(transport);
//! assert!(chorus.context().raise_if_ko);
//! ```

mod cache;
mod commitment;
#[cfg(feature = "payload")]
mod deposit;
#[cfg(feature = "http")]
mod http;
mod post;
mod replay;
mod status;
mod structure;

pub use cache::IdentifierCache;
pub use commitment::{COMMITMENT_SEARCH_PATH, CommitmentCheck, commitment_note};
#[cfg(feature = "payload")]
pub use deposit::DEPOSIT_PATH;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use post::AuditNote;
pub use replay::{RecordedRequest, ReplayTransport};
pub use status::{HISTORY_PATH, StatusUpdateReport};
pub use structure::STRUCTURE_SEARCH_PATH;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ChorusError, Invoice};

/// Chorus Pro platform targeted by the API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiEnvironment {
    /// Production platform.
    #[default]
    Prod,
    /// Qualification (sandbox) platform.
    Qualif,
}

impl ApiEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Prod => "https://api.piste.gouv.fr/cpro/",
            Self::Qualif => "https://sandbox-api.piste.gouv.fr/cpro/",
        }
    }
}

/// Credentials and endpoint of a company's Chorus Pro API access.
///
/// The OAuth token is obtained outside this crate. `Debug` output hides
/// the token and the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub environment: ApiEnvironment,
    pub oauth_token: String,
    /// Technical account login on Chorus Pro.
    pub login: String,
    pub password: String,
    /// Overrides the environment base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ApiParams {
    pub fn new(
        environment: ApiEnvironment,
        oauth_token: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            oauth_token: oauth_token.into(),
            login: login.into(),
            password: password.into(),
            base_url: None,
        }
    }

    /// Full URL of an API path, e.g. `factures/v1/consulter/historique`.
    pub fn url(&self, url_path: &str) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url_path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ApiParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiParams")
            .field("environment", &self.environment)
            .field("oauth_token", &"<redacted>")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Request/response exchange with the Chorus Pro API.
///
/// Implementations may keep a session (connection pool, cookies) between
/// calls; it carries no meaning for the callers.
pub trait ChorusTransport {
    fn post(
        &mut self,
        params: &ApiParams,
        url_path: &str,
        payload: &Value,
    ) -> Result<Value, ChorusError>;
}

impl<T: ChorusTransport + ?Sized> ChorusTransport for &mut T {
    fn post(
        &mut self,
        params: &ApiParams,
        url_path: &str,
        payload: &Value,
    ) -> Result<Value, ChorusError> {
        (**self).post(params, url_path, payload)
    }
}

/// Chatter-like log receiving notes about invoices.
pub trait AuditLog {
    fn message_post(&mut self, invoice: &Invoice, body: &str);
}

impl<F: FnMut(&Invoice, &str)> AuditLog for F {
    fn message_post(&mut self, invoice: &Invoice, body: &str) {
        self(invoice, body)
    }
}

/// In-memory [`AuditLog`] keeping (invoice name, body) pairs.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    pub entries: Vec<(String, String)>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes posted on the given invoice.
    pub fn notes_for(&self, invoice: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(name, _)| name == invoice)
            .map(|(_, body)| body.as_str())
            .collect()
    }
}

impl AuditLog for AuditTrail {
    fn message_post(&mut self, invoice: &Invoice, body: &str) {
        self.entries.push((invoice.name.clone(), body.to_string()));
    }
}

/// Execution context of the API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChorusContext {
    /// The acting user may call the Chorus Pro API.
    pub api_access: bool,
    /// Fail on missing identifiers or credentials instead of skipping.
    pub raise_if_ko: bool,
}

impl Default for ChorusContext {
    fn default() -> Self {
        Self {
            api_access: true,
            raise_if_ko: true,
        }
    }
}

/// Entry point for everything that talks to Chorus Pro.
pub struct Chorus<T> {
    transport: T,
    context: ChorusContext,
    identifiers: IdentifierCache,
}

impl<T: ChorusTransport> Chorus<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            context: ChorusContext::default(),
            identifiers: IdentifierCache::default(),
        }
    }

    pub fn with_context(mut self, context: ChorusContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &ChorusContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ChorusContext {
        &mut self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn identifiers(&self) -> &IdentifierCache {
        &self.identifiers
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

/// Deserialize an API answer, reporting shape mismatches as [`ChorusError::Api`].
pub(crate) fn parse_answer<A: serde::de::DeserializeOwned>(
    url_path: &str,
    answer: Value,
) -> Result<A, ChorusError> {
    serde_json::from_value(answer).map_err(|e| ChorusError::Api {
        url_path: url_path.to_string(),
        message: format!("unexpected answer: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let params = ApiParams::new(ApiEnvironment::Qualif, "tok", "login", "pwd");
        assert_eq!(
            params.url("factures/v1/consulter/historique"),
            "https://sandbox-api.piste.gouv.fr/cpro/factures/v1/consulter/historique"
        );
    }

    #[test]
    fn url_override() {
        let mut params = ApiParams::new(ApiEnvironment::Prod, "tok", "login", "pwd");
        params.base_url = Some("http://localhost:8080/".into());
        assert_eq!(params.url("/a/b"), "http://localhost:8080/a/b");
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: ApiParams = serde_json::from_str(
            r#"{"oauth_token":"t","login":"TECH_1@cpro.fr","password":"secret"}"#,
        )
        .unwrap();
        assert_eq!(params.environment, ApiEnvironment::Prod);
        assert!(params.base_url.is_none());
    }

    #[test]
    fn debug_hides_secrets() {
        let params = ApiParams::new(ApiEnvironment::Qualif, "tok-123", "TECH_1@cpro.fr", "s3cret");
        let shown = format!("{params:?}");
        assert!(shown.contains("TECH_1@cpro.fr"));
        assert!(!shown.contains("tok-123"));
        assert!(!shown.contains("s3cret"));
    }

    #[test]
    fn default_context_is_strict() {
        let ctx = ChorusContext::default();
        assert!(ctx.api_access);
        assert!(ctx.raise_if_ko);
    }
}
