//! Rate limiting middleware for write endpoints readers can hit anonymously.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};

use quill_core::ports::RateLimiter;

use super::error::AppError;

/// Rate limiting middleware factory.
///
/// Requests are keyed by client address and `scope`, so each protected
/// resource has its own budget. Safe methods pass through unchecked.
///
/// The client address is the socket peer. `Forwarded` / `X-Forwarded-For`
/// are only read when the server sits behind a proxy that sets them.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    scope: &'static str,
    trust_forwarded: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>, scope: &'static str) -> Self {
        Self {
            limiter,
            scope,
            trust_forwarded: false,
        }
    }

    /// Key on the forwarded client address instead of the socket peer.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

fn client_addr(req: &ServiceRequest, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| req.connection_info().realip_remote_addr().map(str::to_owned))
        .flatten();
    forwarded
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            scope: self.scope,
            trust_forwarded: self.trust_forwarded,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    scope: &'static str,
    trust_forwarded: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if matches!(*req.method(), Method::GET | Method::HEAD) {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        }

        let limiter = self.limiter.clone();
        let key = format!("{}:{}", self.scope, client_addr(&req, self.trust_forwarded));

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(key = %key, "Rate limit exceeded");
                    let response = AppError::TooManyRequests(result.retry_after).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
                outcome => {
                    if let Err(e) = outcome {
                        tracing::error!(error = %e, "Rate limiter error, failing open");
                    }
                    Ok(service.call(req).await?.map_into_left_body())
                }
            }
        })
    }
}
