//! Authentication middleware
//!
//! Verifies the JWT carried in the `Authorization: Bearer` header or the
//! `token` cookie. Tokens are issued elsewhere; only verification happens here.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "_id")]
    pub sub: String,
    pub exp: i64,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Preflight requests carry no credentials
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let Some(token) = extract_token(request.headers()) else {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    };

    let claims = match decode_jwt(&token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected token");
            return AppError::InvalidToken.into_response();
        }
    };

    request.extensions_mut().insert(AuthUser { user_id: claims.sub });
    next.run(request).await
}

/// Bearer header first, then the `token` cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == "token" && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Decode and validate a JWT token
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_token() {
        assert!(extract_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_decode_checks_secret_and_expiry() {
        let future = chrono::Utc::now().timestamp() + 3600;
        assert_eq!(decode_jwt(&token("s3cret", future), "s3cret").unwrap().sub, "user-1");
        assert!(decode_jwt(&token("s3cret", future), "other").is_err());

        let past = chrono::Utc::now().timestamp() - 3600;
        assert!(decode_jwt(&token("s3cret", past), "s3cret").is_err());
    }
}
