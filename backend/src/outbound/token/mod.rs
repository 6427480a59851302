//! HMAC-SHA256 session tokens in compact JWT form.
//!
//! A token is `base64url(header) "." base64url(claims) "." base64url(signature)`
//! with an `HS256` header, so standard JWT tooling can decode it. Claims are
//! the caller's identity plus an `exp` Unix timestamp. Signatures are compared
//! in constant time through `Mac::verify_slice`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore as _;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AuthToken, Caller};

type HmacSha256 = Hmac<Sha256>;

const EPHEMERAL_SECRET_LEN: usize = 32;
const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_owned(),
            typ: Some("JWT".to_owned()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    caller: Caller,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret.
pub struct HmacTokenService {
    secret: Zeroizing<Vec<u8>>,
    ttl: TimeDelta,
}

impl HmacTokenService {
    /// Tokens issued by this service expire `ttl` after issue.
    pub fn new(secret: impl AsRef<[u8]>, ttl: TimeDelta) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            ttl,
        }
    }

    /// A service keyed with random bytes. Tokens stop verifying on restart.
    pub fn ephemeral(ttl: TimeDelta) -> Self {
        let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
        rand::rngs::OsRng.fill_bytes(secret.as_mut_slice());
        Self { secret, ttl }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|err| TokenError::encoding(err.to_string()))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|err| TokenError::encoding(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let json = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::malformed())?;
    serde_json::from_slice(&json).map_err(|_| TokenError::malformed())
}

impl TokenService for HmacTokenService {
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<AuthToken, TokenError> {
        let claims = Claims {
            caller: caller.clone(),
            exp: (now + self.ttl).timestamp(),
        };
        let signing_input = format!(
            "{}.{}",
            encode_segment(&Header::hs256())?,
            encode_segment(&claims)?
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(AuthToken::new(format!("{signing_input}.{signature}")))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, TokenError> {
        let (signing_input, signature) =
            token.trim().rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::malformed());
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::malformed())?;

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::invalid_signature())?;

        let claims: Claims = decode_segment(claims)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::expired());
        }
        Ok(claims.caller)
    }
}
