use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use crate::utils::{GalleryError, GalleryResult};

/// Claims read from the identity token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decodes the payload segment of a JWT. The signature is not verified;
/// the token came straight from the identity provider over TLS.
pub fn decode_id_token(token: &str) -> GalleryResult<IdTokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| GalleryError::auth("malformed identity token"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| GalleryError::auth(format!("identity token payload decode failed: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| GalleryError::auth(format!("identity token claims invalid: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fake_id_token;

    #[test]
    fn decodes_subject_name_and_email() {
        let token = fake_id_token(r#"{"sub":"abc-123","name":"Ada","email":"ada@example.com"}"#);
        let claims = decode_id_token(&token).unwrap();
        assert_eq!(claims.sub, "abc-123");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn optional_claims_may_be_missing() {
        let claims = decode_id_token(&fake_id_token(r#"{"sub":"s"}"#)).unwrap();
        assert_eq!(claims.name, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_id_token("not-a-jwt").is_err());
        assert!(decode_id_token("a.!!!.c").is_err());
        assert!(decode_id_token(&fake_id_token(r#"{"name":"no sub"}"#)).is_err());
    }
}
