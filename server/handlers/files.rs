use std::path::Path;

use crate::routes::{bytes_response, not_found, HttpResponse};
use crate::state::SharedState;
use crate::util::filename::is_plain_name;

/// GET /uploads/<name>
pub fn handle_get(name: &str, state: &SharedState) -> HttpResponse {
    if !is_plain_name(name) {
        return not_found();
    }
    let path = state.config.upload_dir.join(name);
    match std::fs::read(&path) {
        Ok(bytes) => bytes_response(200, content_type(&path), bytes),
        Err(_) => not_found(),
    }
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
