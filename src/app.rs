//! Application interface.
//!
//! An application is anything that can be called with a request [`Env`] and
//! either produces an [`AppResponse`], produces nothing, or fails.

use crate::http::body::Body;
use crate::http::env::Env;
use crate::http::headers::Headers;

/// Status value meaning "no response will be produced for this request".
pub const NO_RESPONSE: i32 = -1;

/// The `(status, headers, body)` triple an application returns.
#[derive(Debug)]
pub struct AppResponse {
    pub status: i32,
    pub headers: Headers,
    pub body: Body,
}

impl AppResponse {
    pub fn new(status: i32, headers: Headers, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// `200` with no extra headers.
    pub fn ok(body: impl Into<Body>) -> Self {
        Self::new(200, Headers::new(), body)
    }

    pub fn no_response() -> Self {
        Self::new(NO_RESPONSE, Headers::new(), Body::empty())
    }
}

pub trait App: Send + Sync {
    /// `Ok(None)` means the application produced no usable result.
    fn call(&self, env: &Env) -> anyhow::Result<Option<AppResponse>>;
}

impl<F> App for F
where
    F: Fn(&Env) -> anyhow::Result<Option<AppResponse>> + Send + Sync,
{
    fn call(&self, env: &Env) -> anyhow::Result<Option<AppResponse>> {
        self(env)
    }
}
