use std::io::Read;
use std::sync::Arc;

use ferrite_food::Outcome;
use serde_json::json;
use tiny_http::Request;
use tracing::{error, info, warn};

use crate::routes::{json_error, json_response, HttpResponse};
use crate::state::SharedState;
use crate::util::filename::secure_filename;
use crate::util::multipart::{extract_boundary, extract_file_part};
use crate::util::storage::save_unique;

// ---------------------------------------------------------------------------
// POST /api/upload
// ---------------------------------------------------------------------------

pub fn handle_upload(request: &mut Request, state: &SharedState) -> HttpResponse {
    let limit = state.config.max_upload_bytes;
    if request.body_length().is_some_and(|len| len > limit) {
        return json_error(413, "Arquivo muito grande");
    }

    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let Some(boundary) = extract_boundary(&content_type) else {
        return json_error(400, "Nenhum arquivo enviado");
    };

    // Chunked bodies carry no length; cap what we read instead.
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().take(limit as u64 + 1).read_to_end(&mut body) {
        warn!("failed to read upload body: {}", e);
        return json_error(400, "Nenhum arquivo enviado");
    }
    if body.len() > limit {
        return json_error(413, "Arquivo muito grande");
    }

    let Some(part) = extract_file_part(&body, &boundary, "file") else {
        return json_error(400, "Nenhum arquivo enviado");
    };
    if part.filename.is_empty() {
        return json_error(400, "Arquivo vazio");
    }
    if !state.config.is_allowed_file(&part.filename) {
        return json_error(400, "Formato não permitido");
    }

    let safe = secure_filename(&part.filename);
    let name = format!("{}{}", chrono::Local::now().format("%Y%m%d_%H%M%S_"), safe);
    let (stored, path) = match save_unique(&state.config.upload_dir, &name, &part.bytes) {
        Ok(saved) => saved,
        Err(e) => {
            error!(file = %name, "failed to save upload: {}", e);
            return json_error(500, "Falha ao salvar arquivo");
        }
    };
    info!(file = %stored, bytes = part.bytes.len(), "upload received");

    let predictor = Arc::clone(&state.predictor);
    match predictor.predict_with_timeout(&path, state.config.request_timeout()) {
        Ok(result) => {
            info!(file = %stored, label = %result.label, confidence = result.confidence, "prediction result");
            let code = if result.outcome == Outcome::Overloaded { 503 } else { 200 };
            json_response(
                code,
                &json!({
                    "imagem": stored,
                    "alimento_reconhecido": result.label,
                    "confianca": result.confidence,
                    "status": result.outcome,
                }),
            )
        }
        Err(e) => {
            warn!(file = %stored, "{}", e);
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), "could not remove undecodable upload: {}", e);
            }
            json_error(400, "Imagem inválida")
        }
    }
}
