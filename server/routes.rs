use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use image_tiles::TilesError;

use crate::handlers;
use crate::state::SharedState;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    let headers = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
        .into_iter()
        .collect();
    Response::new(StatusCode(status), headers, Cursor::new(bytes), Some(len), None)
}

pub fn html_response(body: String) -> HttpResponse {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> HttpResponse {
    bytes_response(200, "application/json", body.into_bytes())
}

pub fn image_response(bytes: Vec<u8>, mime_type: &str) -> HttpResponse {
    bytes_response(200, mime_type, bytes)
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    bytes_response(status, "text/plain; charset=utf-8", body.as_bytes().to_vec())
}

pub fn not_found() -> HttpResponse {
    text_response(404, "404 Not Found")
}

/// HTTP status for a failed load or render.
pub fn error_status(err: &TilesError) -> u16 {
    match err {
        TilesError::NotFound { .. } => 404,
        TilesError::UnsupportedFormat { .. } => 415,
        TilesError::Decode { .. }
        | TilesError::ChannelMismatch { .. }
        | TilesError::Normalization { .. } => 422,
        TilesError::InvalidOption { .. } | TilesError::InvalidLocation(_) => 400,
        TilesError::Encode(_) => 500,
    }
}

pub fn error_response(err: &TilesError) -> HttpResponse {
    let status = error_status(err);
    text_response(status, &format!("{} {}", status, err))
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Routes a request to its handler and sends the response.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let url = request.url().to_owned();

    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path.to_owned(), query.to_owned()),
        None => (url.clone(), String::new()),
    };
    log::debug!("{} {}", method, url);

    let response = match (method, path.as_str()) {
        (Method::Get, "/") => handlers::gallery::handle_get(&query, &state),
        (Method::Get, "/api/images") => handlers::api::handle_list(&query, &state),
        (Method::Get, p) if p.starts_with("/images/") => {
            handlers::images::handle_get(&p["/images/".len()..], &query, &state)
        }
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        log::debug!("Client went away before the response for {} was sent: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&TilesError::not_found("a.png")), 404);
        assert_eq!(error_status(&TilesError::unsupported("a.xyz", "no codec")), 415);
        assert_eq!(error_status(&TilesError::decode("a.png", "truncated")), 422);
        assert_eq!(
            error_status(&TilesError::ChannelMismatch { mode: "sentinel", required: 4, found: 3 }),
            422
        );
        assert_eq!(error_status(&TilesError::normalization("sigmoid", "no finite values")), 422);
        assert_eq!(
            error_status(&TilesError::InvalidOption { name: "render_mode", value: "cmyk".into() }),
            400
        );
    }

    #[test]
    fn test_error_response_has_text_body() {
        let resp = error_response(&TilesError::not_found("missing.tif"));
        assert_eq!(resp.status_code(), StatusCode(404));
    }
}
