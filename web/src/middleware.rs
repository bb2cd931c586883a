//! Request logging middleware.
//!
//! Every request gets:
//! - a generated request id (UUID v4), stored in request extensions and
//!   echoed in the `X-Request-ID` response header
//! - an `http_request` span carrying the id, method and path
//! - one `info` event on completion with status and latency
//! - `http_requests_total` and `http_request_duration_seconds` samples
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/health", get(health))
//!     .layer(request_logging_layer());
//! ```

use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header echoing the generated request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Counter of completed requests, labelled by method and status.
pub const REQUESTS_TOTAL: &str = "http_requests_total";

/// Histogram of request latency in seconds, labelled by method.
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Id assigned to a request by [`RequestLoggingLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Create the request logging layer.
#[must_use]
pub const fn request_logging_layer() -> RequestLoggingLayer {
    RequestLoggingLayer
}

/// Layer installing [`RequestLogging`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLoggingLayer;

impl<S> Layer<S> for RequestLoggingLayer {
    type Service = RequestLogging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogging { inner }
    }
}

/// Middleware service that logs and measures each request.
#[derive(Clone, Debug)]
pub struct RequestLogging<S> {
    inner: S,
}

impl<S> Service<Request> for RequestLogging<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let request_id = Uuid::new_v4();
        req.extensions_mut().insert(RequestId(request_id));

        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %method,
            path = %path,
            user = tracing::field::Empty,
        );

        let started = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let mut response = fut.await?;

                let status = response.status();
                let latency = started.elapsed();

                tracing::info!(
                    status = status.as_u16(),
                    latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    "Request completed"
                );

                metrics::counter!(
                    REQUESTS_TOTAL,
                    "method" => method.to_string(),
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
                metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
                    .record(latency.as_secs_f64());

                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
