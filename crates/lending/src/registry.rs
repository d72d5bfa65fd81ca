//! Client for the off-chain validator registration service.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::classify::ErrorCategory;

/// Registration service failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("invalid registry url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("registration rejected ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Rejected { status: reqwest::StatusCode, message: Option<String> },
}

impl RegistrationError {
    /// Category used when surfacing this failure alongside borrow-flow
    /// failures.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Rejected { status, .. } if status.is_client_error() => ErrorCategory::InvalidInput,
            _ => ErrorCategory::Unknown,
        }
    }
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    validator_id: &'a str,
}

#[derive(Deserialize)]
struct RegistrationReply {
    message: String,
}

/// One idempotent-on-the-client-side POST; no chain access, no multi-step
/// state.
#[derive(Clone, Debug)]
pub struct RegistrationClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RegistrationClient {
    pub fn new(registry_url: &str) -> Result<Self, RegistrationError> {
        let base: Url = registry_url.parse()?;
        let endpoint = base.join("/validator")?;
        Ok(Self { http: reqwest::Client::new(), endpoint })
    }

    /// Submits the validator id; returns the server's display message.
    ///
    /// A non-2xx response surfaces the body's embedded `message` verbatim
    /// when one is present.
    pub async fn register(&self, validator_id: &str) -> Result<String, RegistrationError> {
        debug!(target: "vale::registry", %validator_id, url = %self.endpoint, "registering validator");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&RegistrationBody { validator_id })
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            let reply: RegistrationReply = response.json().await?;
            Ok(reply.message)
        } else {
            let message = response.json::<RegistrationReply>().await.ok().map(|r| r.message);
            Err(RegistrationError::Rejected { status, message })
        }
    }
}
