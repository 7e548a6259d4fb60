use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one request, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Tags every request with a correlation id and echoes it on the response.
///
/// A caller-supplied `x-request-id` header wins; otherwise a fresh UUID is
/// minted. Handlers read the id from request extensions and stamp it into
/// response metadata, so one id ties logs, body, and headers together.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(supplied) => supplied.to_owned(),
        None => Uuid::new_v4().to_string(),
    };

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
