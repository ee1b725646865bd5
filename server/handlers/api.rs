use serde::Serialize;

use image_tiles::RenderOptions;

use crate::handlers::{list_tiles, parse_count, parse_options, Tile};
use crate::routes::{error_response, json_response, text_response, HttpResponse};
use crate::state::SharedState;
use crate::util::form::parse_form;

#[derive(Serialize)]
struct Listing {
    root: String,
    options: RenderOptions,
    items: Vec<Tile>,
}

// ---------------------------------------------------------------------------
// GET /api/images
// ---------------------------------------------------------------------------

pub fn handle_list(query: &str, state: &SharedState) -> HttpResponse {
    let config = &state.config;
    let pairs = parse_form(query);

    let parsed = parse_options(&pairs, config.defaults).and_then(|options| {
        let num_items = parse_count(&pairs, "num_items", config.num_items)?;
        Ok((options, num_items))
    });
    let (options, num_items) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Rejected listing query '{}': {}", query, e);
            return error_response(&e);
        }
    };

    let items = match list_tiles(state, &options, num_items) {
        Ok(items) => items,
        Err(e) => {
            log::error!("Listing {} failed: {}", config.root, e);
            return error_response(&e);
        }
    };

    let listing = Listing {
        root: config.root.to_string(),
        options,
        items,
    };
    match serde_json::to_string(&listing) {
        Ok(body) => json_response(body),
        Err(e) => {
            log::error!("Could not serialize listing: {}", e);
            text_response(500, "500 Internal Server Error")
        }
    }
}
