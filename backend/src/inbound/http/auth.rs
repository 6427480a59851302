//! Authentication gate for HTTP handlers.
//!
//! Handlers that need a signed-in caller take an [`AuthenticatedCaller`]
//! argument. Extraction reads the `x-auth-token` header, verifies it through
//! the [`TokenService`] port, and rejects the request with 401 before the
//! handler body runs.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::TokenService;
use crate::domain::{AuthToken, Caller, Error};

use super::state::HttpState;

/// Request and response header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

const SIGN_IN_REQUIRED: &str = "You need to be signed in to perform this operation";
const INVALID_TOKEN: &str = "Invalid token";

/// Token verification shared by every authenticated route.
#[derive(Clone)]
pub struct TokenGate {
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl TokenGate {
    pub fn new(tokens: Arc<dyn TokenService>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }

    /// Resolve a raw header value to the caller it was issued for.
    pub fn verify(&self, raw: &str) -> Result<Caller, Error> {
        self.tokens
            .verify(raw, self.clock.utc())
            .map_err(|err| {
                debug!(error = %err, "token rejected");
                Error::unauthorized(INVALID_TOKEN)
            })
    }
}

/// The verified identity behind the request's `x-auth-token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller(pub Caller);

impl AuthenticatedCaller {
    pub fn caller(&self) -> &Caller {
        &self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<Caller, Error> {
    let header = req
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .ok_or_else(|| Error::unauthorized(SIGN_IN_REQUIRED))?;
    let raw = header
        .to_str()
        .map_err(|_| Error::unauthorized(INVALID_TOKEN))?
        .trim();
    if raw.is_empty() {
        return Err(Error::unauthorized(SIGN_IN_REQUIRED));
    }
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    state.gate.verify(raw)
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Self))
    }
}

/// Header pair attaching `token` to a response.
pub fn token_header(token: &AuthToken) -> (&'static str, String) {
    (AUTH_TOKEN_HEADER, token.as_str().to_owned())
}
