//! Router construction: routes plus CORS, tracing and panic layers.

use std::any::Any;

use axum::{
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, Any as AnyOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::error;

use crate::relay::RelayError;
use crate::web::handlers::{
    health, relay_webhook, root, webhook_liveness, AppState, FALLBACK_SIGNATURE_HEADER,
};

/// Methods advertised to cross-origin callers.
const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let allowed_headers = allowed_headers(&state.config.signature_header);

    // CorsLayer only emits allow-methods/allow-headers on preflight; the
    // set-header layers put them on every other response too.
    let methods_value = HeaderValue::from_static("GET, POST, OPTIONS");
    let headers_value = join_header_names(&allowed_headers);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook", get(webhook_liveness).post(relay_webhook))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(allowed_headers))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            methods_value,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            headers_value,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `content-type`, the fallback signature header and the configured one.
pub fn allowed_headers(signature_header: &str) -> Vec<HeaderName> {
    let mut allowed = vec![
        CONTENT_TYPE,
        HeaderName::from_static(FALLBACK_SIGNATURE_HEADER),
    ];
    match HeaderName::from_bytes(signature_header.as_bytes()) {
        Ok(name) if !allowed.contains(&name) => allowed.push(name),
        Ok(_) => {}
        Err(_) => error!(header = %signature_header, "cors_invalid_signature_header"),
    }
    allowed
}

/// Permissive CORS: any origin, GET/POST/OPTIONS, and the given headers.
pub fn cors_layer(allowed_headers: Vec<HeaderName>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(AllowHeaders::list(allowed_headers))
}

fn join_header_names(names: &[HeaderName]) -> HeaderValue {
    let joined = names
        .iter()
        .map(HeaderName::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    // Header names are tokens, which are always valid header values
    HeaderValue::from_str(&joined).unwrap_or_else(|_| HeaderValue::from_static("content-type"))
}

/// Render a handler panic as a 500 with the panic message.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    error!(panic = %detail, "handler_panicked");

    RelayError::Internal(format!("Internal error: {}", detail)).into_response()
}
