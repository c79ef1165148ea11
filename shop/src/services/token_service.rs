// shop/src/services/token_service.rs

//! Signed session tokens (HS256 JWT) carrying the user id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: Uuid,
  iat: i64,
  exp: i64,
}

pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
  }
}

impl TokenIssuer {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
  }

  /// Returns the user id of a valid, unexpired token.
  pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
    decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
      .map(|data| data.claims.sub)
      .map_err(|e| {
        debug!(error = %e, "Rejected session token.");
        AppError::Unauthorized("Not authorized, token failed.".to_string())
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issued_token_verifies_to_the_same_user() {
    let issuer = TokenIssuer::new("secret-a", Duration::days(7));
    let user = Uuid::new_v4();
    let token = issuer.issue(user).unwrap();
    assert_eq!(issuer.verify(&token).unwrap(), user);
  }

  #[test]
  fn token_signed_with_another_secret_is_rejected() {
    let token = TokenIssuer::new("secret-a", Duration::days(7)).issue(Uuid::new_v4()).unwrap();
    let other = TokenIssuer::new("secret-b", Duration::days(7));
    assert!(matches!(other.verify(&token), Err(AppError::Unauthorized(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let issuer = TokenIssuer::new("secret-a", Duration::hours(-2));
    let token = issuer.issue(Uuid::new_v4()).unwrap();
    assert!(matches!(issuer.verify(&token), Err(AppError::Unauthorized(_))));
  }

  #[test]
  fn garbage_is_rejected() {
    let issuer = TokenIssuer::new("secret-a", Duration::days(1));
    assert!(issuer.verify("not.a.jwt").is_err());
  }
}
