use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
    Error, Result,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::CorsConfig;

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const ALLOW_METHODS: &str = "OPTIONS,POST,GET";

const DEV_ORIGINS: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    wildcard_suffix: String,
    fallback_origin: String,
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            wildcard_suffix: config.wildcard_suffix.clone(),
            fallback_origin: config.fallback_origin.clone(),
        }
    }

    /// The request origin when trusted, else the static fallback.
    pub fn allow_origin(&self, origin: Option<&str>) -> String {
        let origin = origin.map(str::trim).unwrap_or_default();
        if origin.is_empty() {
            return self.fallback_origin.clone();
        }

        if self.is_dev_origin(origin)
            || self.allowed_origins.iter().any(|allowed| allowed == origin)
            || self.matches_wildcard(origin)
        {
            origin.to_string()
        } else {
            self.fallback_origin.clone()
        }
    }

    pub fn headers(&self, origin: Option<&str>) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "Access-Control-Allow-Origin".to_string(),
                self.allow_origin(origin),
            ),
            ("Vary".to_string(), "Origin".to_string()),
            (
                "Access-Control-Allow-Headers".to_string(),
                ALLOW_HEADERS.to_string(),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                ALLOW_METHODS.to_string(),
            ),
        ])
    }

    fn is_dev_origin(&self, origin: &str) -> bool {
        DEV_ORIGINS.iter().any(|dev| {
            origin
                .strip_prefix(dev)
                .map(|rest| rest.is_empty() || rest.starts_with(':'))
                .unwrap_or(false)
        })
    }

    fn matches_wildcard(&self, origin: &str) -> bool {
        if self.wildcard_suffix.is_empty() {
            return false;
        }
        let host = match origin.strip_prefix("https://") {
            Some(host) => host,
            None => return false,
        };
        !host.contains('/')
            && !host.contains('@')
            && host.len() > self.wildcard_suffix.len()
            && host.ends_with(&self.wildcard_suffix)
    }
}

/// Adds CORS headers to responses that don't already carry them.
pub struct CorsMiddleware {
    policy: Arc<CorsPolicy>,
}

impl CorsMiddleware {
    pub fn new(policy: Arc<CorsPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CorsMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CorsMiddlewareService {
            service: Rc::new(service),
            policy: self.policy.clone(),
        })
    }
}

pub struct CorsMiddlewareService<S> {
    service: Rc<S>,
    policy: Arc<CorsPolicy>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let cors_headers = self.policy.headers(origin.as_deref());

        Box::pin(async move {
            let mut res = service.call(req).await?;

            let headers = res.headers_mut();
            if !headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
                for (name, value) in cors_headers {
                    if let (Ok(name), Ok(value)) = (
                        HeaderName::from_bytes(name.as_bytes()),
                        HeaderValue::from_str(&value),
                    ) {
                        headers.insert(name, value);
                    }
                }
            }

            Ok(res)
        })
    }
}
