use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

const INDEX: &str = include_str!("assets/index.html");

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

pub fn bytes_response(status: u16, content_type: &str, body: Vec<u8>) -> HttpResponse {
    let len = body.len();
    Response::new(
        StatusCode(status),
        header("Content-Type", content_type).into_iter().collect(),
        Cursor::new(body),
        Some(len),
        None,
    )
}

pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    bytes_response(status, "application/json; charset=utf-8", body.to_string().into_bytes())
}

pub fn json_error(status: u16, message: &str) -> HttpResponse {
    json_response(status, &serde_json::json!({ "error": message }))
}

pub fn html_response(body: &str) -> HttpResponse {
    bytes_response(200, "text/html; charset=utf-8", body.as_bytes().to_vec())
}

pub fn not_found() -> HttpResponse {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get, "/") => html_response(INDEX),
        (Method::Post, "/api/upload") => handlers::upload::handle_upload(&mut request, &state),
        (Method::Get, "/api/status") => handlers::status::handle_status(&state),
        (Method::Get, p) if p.starts_with("/uploads/") => {
            handlers::files::handle_get(&p["/uploads/".len()..], &state)
        }
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        tracing::debug!("client went away before the response was sent: {}", e);
    }
}
