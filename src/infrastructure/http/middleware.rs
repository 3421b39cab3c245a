//! HTTP Middleware
//!
//! 错误状态码日志中间件

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 记录 4xx / 5xx 响应及耗时
///
/// 业务错误的详细信息在 `ApiError::into_response()` 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, "Request rejected");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    fn router_returning(status: StatusCode) -> Router {
        Router::new()
            .route("/api/generate", post(move || async move { status }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn call(status: StatusCode) -> StatusCode {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/api/generate")
            .body(Body::empty())
            .unwrap();
        router_returning(status)
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_status_passes_through() {
        for status in [
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_eq!(call(status).await, status);
        }
    }
}
