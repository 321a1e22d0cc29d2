use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota,
    RateLimiter as GovernorRateLimiter,
};
use std::future::{ready, Ready};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::core::AppError;

type ClientLimiter = GovernorRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Buckets idle long enough to be full again are dropped past this many clients
const RETAIN_THRESHOLD: usize = 10_000;

/// Rate limiting middleware using governor, keyed by client IP.
///
/// Each peer address gets its own bucket. Clones share the bucket map, so
/// wrapping several resources with clones of the same limiter gives each
/// client one budget across all of them.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<ClientLimiter>,
    message: Arc<str>,
}

impl RateLimiter {
    /// Allow `max_requests` per `window`, refilled evenly across the window
    pub fn per_window(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .map(|quota| quota.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst));

        let message = format!(
            "Too many requests. Maximum {} requests per {} minutes.",
            burst,
            (window.as_secs() / 60).max(1)
        );

        Self {
            limiter: Arc::new(GovernorRateLimiter::keyed(quota)),
            message: message.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<actix_web::body::BoxBody, B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            message: self.message.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<ClientLimiter>,
    message: Arc<str>,
}

/// Requests without a peer address (unix sockets, test requests) share one bucket
fn client_key(req: &ServiceRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<actix_web::body::BoxBody, B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let limiter = self.limiter.clone();
        let message = self.message.clone();

        Box::pin(async move {
            let client = client_key(&req);
            if limiter.len() > RETAIN_THRESHOLD {
                limiter.retain_recent();
            }

            if limiter.check_key(&client).is_ok() {
                return svc.call(req).await.map(|res| res.map_into_right_body());
            }

            tracing::warn!(path = %req.path(), client = %client, "Rate limit exceeded");
            let http_response = AppError::RateLimitExceeded(message.to_string()).error_response();
            Ok(req.into_response(http_response).map_into_left_body())
        })
    }
}
