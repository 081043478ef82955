use std::sync::Arc;

use crate::auth::{LoginRequest, TokenResponse};
use crate::session::{Session, LOGIN_ROUTE};

use super::{build_http_client, classify_status, transport_error, ClientError, ErrorBody, ResponseClass};

const LOGIN_PATH: &str = "/api/auth/login";

/// Signs the operator in and keeps the token in the session.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self, ClientError> {
        Ok(Self::with_http_client(build_http_client()?, base_url, session))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        match classify_status(status) {
            ResponseClass::Success => {
                let token: TokenResponse = serde_json::from_slice(&bytes).map_err(|e| {
                    ClientError::ServiceUnavailable(format!("undecodable login response: {}", e))
                })?;
                if token.dev_mode {
                    log::warn!("Server accepted development credentials");
                }
                self.session.login(&token.access_token, token.user.clone())?;
                Ok(token)
            }
            ResponseClass::Rejected | ResponseClass::Unauthorized => {
                Err(ClientError::Unauthorized {
                    message: ErrorBody::parse(&bytes).message_or("Invalid username or password"),
                    redirect: LOGIN_ROUTE,
                })
            }
            ResponseClass::Unavailable => Err(ClientError::ServiceUnavailable(format!(
                "login failed with {}",
                status
            ))),
        }
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.logout()?;
        Ok(())
    }
}
