//! Request logging middleware.
//!
//! Every request runs inside a `request` span carrying the method, path and a
//! session id prefix, so log lines emitted by handlers and the Qase gateway can be
//! traced back to the session that caused them. The Qase token never reaches the
//! logs: clients only ever send the opaque session id.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::time::{Duration, Instant};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::auth::session_id_prefix;
use crate::config::SESSION_ID_HEADER;

/// Paths polled by load balancers and container health checks.
const DEFAULT_QUIET_PATHS: &[&str] = &["/api/v1/health"];

/// Request logger middleware factory.
///
/// Requests to quiet paths are logged at debug level only.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    quiet_paths: Rc<Vec<String>>,
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::with_quiet_paths(DEFAULT_QUIET_PATHS.iter().copied())
    }
}

impl RequestLogger {
    pub fn with_quiet_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            quiet_paths: Rc::new(paths.into_iter().map(str::to_string).collect()),
        }
    }

    fn is_quiet(&self, path: &str) -> bool {
        self.quiet_paths.iter().any(|quiet| quiet == path)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware {
            service,
            logger: self.clone(),
        }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
    logger: RequestLogger,
}

/// How a finished request is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    ClientError,
    ServerError,
}

impl Outcome {
    fn of(status: StatusCode) -> Self {
        if status.is_server_error() {
            Outcome::ServerError
        } else if status.is_client_error() {
            Outcome::ClientError
        } else {
            Outcome::Completed
        }
    }
}

fn log_completion(outcome: Outcome, quiet: bool, status: u16, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;
    match outcome {
        Outcome::Completed if quiet => {
            debug!(target: "api", status, duration_ms, "Request completed")
        }
        Outcome::Completed => info!(target: "api", status, duration_ms, "Request completed"),
        Outcome::ClientError => warn!(target: "api", status, duration_ms, "Client error"),
        Outcome::ServerError => error!(target: "api", status, duration_ms, "Server error"),
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let quiet = self.logger.is_quiet(req.path());

        let session = req
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(session_id_prefix)
            .unwrap_or_else(|| "none".to_string());
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let span = info_span!(
            target: "api",
            "request",
            method = %req.method(),
            path = %req.path(),
            session = %session,
        );

        span.in_scope(|| {
            if quiet {
                debug!(target: "api", remote_addr = %remote_addr, "Request started");
            } else {
                info!(target: "api", remote_addr = %remote_addr, "Request started");
            }
        });

        let fut = self.service.call(req);

        Box::pin(
            async move {
                let res = fut.await?;
                log_completion(
                    Outcome::of(res.status()),
                    quiet,
                    res.status().as_u16(),
                    start.elapsed(),
                );
                Ok(res)
            }
            .instrument(span),
        )
    }
}
