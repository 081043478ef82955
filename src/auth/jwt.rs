use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::model::Claims;

const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 60 * 60; // 1 hour

/// Issues and validates HS256 access tokens.
///
/// There is no refresh token: when a token expires the operator logs in again.
pub struct TokenService {
    secret: String,
    expiry_seconds: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiry_seconds: ACCESS_TOKEN_EXPIRY_SECONDS,
        }
    }

    pub fn with_expiry(mut self, expiry_seconds: i64) -> Self {
        self.expiry_seconds = expiry_seconds;
        self
    }

    /// Generate access token
    pub fn generate_access_token(
        &self,
        user_id: &str,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate_access_token_at(user_id, username, chrono::Utc::now().timestamp())
    }

    /// Generate an access token as if issued at `issued_at` (unix seconds).
    pub fn generate_access_token_at(
        &self,
        user_id: &str,
        username: &str,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (issued_at + self.expiry_seconds).max(0) as usize,
            iat: issued_at.max(0) as usize,
            token_type: "access".to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.expiry_seconds
    }
}
