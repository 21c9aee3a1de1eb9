use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::models::{SessionUser, Token};

const NONCE_SIZE: usize = 12;

/// Everything a session carries between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub user: SessionUser,
    pub token: Token,
    pub iat: i64,
    pub exp: i64,
}

/// The JWT payload. The token record travels sealed, so holding the session
/// token does not reveal the access or refresh token.
#[derive(Serialize, Deserialize)]
struct SignedClaims {
    sub: String,
    user: SessionUser,
    token: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens (HS256 with the configured secret) and
/// seals the embedded token record with ChaCha20-Poly1305 under a key derived
/// from the same secret.
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    cipher: ChaCha20Poly1305,
    max_age: i64,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        let key = Sha256::digest(config.secret.as_bytes());
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
            cipher: ChaCha20Poly1305::new(Key::from_slice(key.as_slice())),
            max_age: config.max_age,
        }
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Issue a session token valid for `max_age` seconds from `issued_at`.
    pub fn encode(&self, user: &SessionUser, token: &Token, issued_at: i64) -> Result<String, AuthError> {
        let exp = issued_at
            .checked_add(self.max_age)
            .ok_or_else(|| AuthError::InvalidSession("session expiry out of range".to_string()))?;
        let claims = SignedClaims {
            sub: user.id.clone(),
            user: user.clone(),
            token: self.seal(token)?,
            iat: issued_at,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidSession(format!("failed to sign session: {}", e)))
    }

    /// Verify the signature, reject sessions whose expiry is not after `now`
    /// and open the sealed token record.
    pub fn decode(&self, session_token: &str, now: i64) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        let claims = decode::<SignedClaims>(session_token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidSession(e.to_string()))?;

        if claims.exp <= now {
            return Err(AuthError::InvalidSession(format!(
                "session expired at {}",
                claims.exp
            )));
        }

        Ok(SessionClaims {
            token: self.open(&claims.token)?,
            sub: claims.sub,
            user: claims.user,
            iat: claims.iat,
            exp: claims.exp,
        })
    }

    fn seal(&self, token: &Token) -> Result<String, AuthError> {
        let plaintext = serde_json::to_vec(token)
            .map_err(|e| AuthError::InvalidSession(format!("failed to serialize token: {}", e)))?;

        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|e| AuthError::InvalidSession(format!("failed to seal token: {}", e)))?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn open(&self, sealed: &str) -> Result<Token, AuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|e| AuthError::InvalidSession(format!("malformed token record: {}", e)))?;
        if bytes.len() <= NONCE_SIZE {
            return Err(AuthError::InvalidSession("truncated token record".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| AuthError::InvalidSession(format!("failed to open token record: {}", e)))?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| AuthError::InvalidSession(format!("invalid token record: {}", e)))
    }
}
