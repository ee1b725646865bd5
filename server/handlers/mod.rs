pub mod api;
pub mod gallery;
pub mod images;

use rand::seq::SliceRandom;
use serde::Serialize;

use image_tiles::loader::is_supported_file;
use image_tiles::storage::encode_path;
use image_tiles::{Location, RenderOptions, Result, TilesError};

use crate::state::AppState;
use crate::util::form::form_get;

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

/// Render options for one request: the configured defaults, overridden by
/// `render_mode`, `normalization_mode` and `format` when present.
pub fn parse_options(pairs: &[(String, String)], defaults: RenderOptions) -> Result<RenderOptions> {
    let mut options = defaults;
    if let Some(v) = nonempty(form_get(pairs, "render_mode")) {
        options.render_mode = v.parse()?;
    }
    if let Some(v) = nonempty(form_get(pairs, "normalization_mode")) {
        options.normalization = v.parse()?;
    }
    if let Some(v) = nonempty(form_get(pairs, "format")) {
        options.output = v.parse()?;
    }
    Ok(options)
}

/// Positive integer query parameter, or `default` when absent.
pub fn parse_count(pairs: &[(String, String)], name: &'static str, default: usize) -> Result<usize> {
    match nonempty(form_get(pairs, name)) {
        None => Ok(default),
        Some(v) => match v.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(TilesError::InvalidOption {
                name,
                value: v.to_owned(),
            }),
        },
    }
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One gallery entry.
#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    /// Path relative to the served root.
    pub name: String,
    /// URL rendering the image with the request's options.
    pub url: String,
}

/// Image URL for `relative` carrying the chosen options.
pub fn image_url(relative: &str, options: &RenderOptions) -> String {
    format!(
        "/images/{}?render_mode={}&normalization_mode={}&format={}",
        encode_path(relative),
        options.render_mode,
        options.normalization,
        options.output
    )
}

/// Lists decodable images under the root, shuffled and cut to `num_items`.
pub fn list_tiles(state: &AppState, options: &RenderOptions, num_items: usize) -> Result<Vec<Tile>> {
    let config = &state.config;
    let entries = state
        .storage
        .list(&config.root, &config.pattern, config.recursive)?;
    Ok(select_tiles(entries, &config.root, options, num_items))
}

fn select_tiles(
    entries: Vec<Location>,
    root: &Location,
    options: &RenderOptions,
    num_items: usize,
) -> Vec<Tile> {
    let mut names: Vec<String> = entries
        .iter()
        .filter(|loc| is_supported_file(loc.file_name()))
        .filter_map(|loc| loc.relative_to(root))
        .filter(|rel| !rel.is_empty())
        .collect();
    let total = names.len();

    names.shuffle(&mut rand::thread_rng());
    names.truncate(num_items);
    log::info!("Listed {} images under {}, showing {}", total, root, names.len());

    names
        .into_iter()
        .map(|name| Tile {
            url: image_url(&name, options),
            name,
        })
        .collect()
}
