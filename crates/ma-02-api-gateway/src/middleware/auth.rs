//! Init-data authentication middleware.
//!
//! Guards routes that need a verified mini-app user. The raw init-data
//! string travels in a request header (`x-telegram-init-data` by default);
//! on success the verified claims are inserted into request extensions as
//! [`VerifiedInitData`] for handlers to extract.

use crate::domain::error::AuthRejection;
use axum::{
    body::Body,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
};
use ma_01_init_data::{InitDataClaims, InitDataVerificationApi};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Claims of a request that passed init-data authentication.
#[derive(Debug, Clone)]
pub struct VerifiedInitData(pub Arc<InitDataClaims>);

impl VerifiedInitData {
    pub fn claims(&self) -> &InitDataClaims {
        &self.0
    }
}

/// Authentication layer
#[derive(Clone)]
pub struct InitDataAuthLayer {
    verifier: Arc<dyn InitDataVerificationApi>,
    header: HeaderName,
    max_age: Option<u64>,
}

impl InitDataAuthLayer {
    pub fn new(
        verifier: Arc<dyn InitDataVerificationApi>,
        header: HeaderName,
        max_age: Option<u64>,
    ) -> Self {
        Self {
            verifier,
            header,
            max_age,
        }
    }
}

impl<S> Layer<S> for InitDataAuthLayer {
    type Service = InitDataAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InitDataAuthService {
            inner,
            verifier: Arc::clone(&self.verifier),
            header: self.header.clone(),
            max_age: self.max_age,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct InitDataAuthService<S> {
    inner: S,
    verifier: Arc<dyn InitDataVerificationApi>,
    header: HeaderName,
    max_age: Option<u64>,
}

impl<S> Service<Request<Body>> for InitDataAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        match authenticate(&req, &self.header, self.verifier.as_ref(), self.max_age) {
            Ok(verified) => {
                debug!(user_id = ?verified.claims().user_id(), "Init data accepted");
                req.extensions_mut().insert(verified);
                Box::pin(async move { inner.call(req).await })
            }
            Err(rejection) => Box::pin(async move { Ok(rejection.into_response()) }),
        }
    }
}

/// Validate the init-data header of a request.
fn authenticate<B>(
    req: &Request<B>,
    header: &HeaderName,
    verifier: &dyn InitDataVerificationApi,
    max_age: Option<u64>,
) -> Result<VerifiedInitData, AuthRejection> {
    let value = req.headers().get(header).ok_or_else(|| {
        debug!(header = %header, "Init data header missing");
        AuthRejection::MissingHeader
    })?;

    // Non-ASCII header bytes cannot be a valid url-encoded payload
    let raw = value.to_str().map_err(|_| {
        warn!(kind = "malformed_payload", "Init data rejected");
        AuthRejection::InvalidAuth
    })?;

    verifier
        .validate(raw, max_age)
        .map(|claims| VerifiedInitData(Arc::new(claims)))
        .map_err(|e| {
            warn!(kind = %e.kind(), "Init data rejected");
            AuthRejection::InvalidAuth
        })
}
