//! Blocking HTTP transport for the Chorus Pro API (PISTE gateway).

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use super::{ApiParams, ChorusTransport};
use crate::core::ChorusError;

/// [`ChorusTransport`] over HTTPS. The underlying client (connection pool)
/// is reused across calls.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Transport with a 60 second timeout per request.
    pub fn new() -> Result<Self, ChorusError> {
        Self::with_timeout(Duration::from_secs(60))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ChorusError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChorusError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Value of the `cpro-account` header: base64 of `login:password`.
fn cpro_account(params: &ApiParams) -> String {
    STANDARD.encode(format!("{}:{}", params.login, params.password))
}

impl ChorusTransport for HttpTransport {
    fn post(
        &mut self,
        params: &ApiParams,
        url_path: &str,
        payload: &Value,
    ) -> Result<Value, ChorusError> {
        let url = params.url(url_path);
        tracing::debug!(%url, "Chorus Pro API call");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&params.oauth_token)
            .header("cpro-account", cpro_account(params))
            .header(reqwest::header::ACCEPT, "application/json;charset=utf-8")
            .json(payload)
            .send()
            .map_err(|e| ChorusError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| ChorusError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%url, %status, "Chorus Pro API error");
            return Err(ChorusError::Api {
                url_path: url_path.to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| ChorusError::Api {
            url_path: url_path.to_string(),
            message: format!("invalid JSON answer: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEnvironment;

    #[test]
    fn cpro_account_header() {
        let params = ApiParams::new(ApiEnvironment::Qualif, "t", "TECH_1@cpro.fr", "s3cret");
        assert_eq!(cpro_account(&params), "VEVDSF8xQGNwcm8uZnI6czNjcmV0");
    }
}
