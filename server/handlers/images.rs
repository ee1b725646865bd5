use image_tiles::{load, render, Location, RenderOptions, Result};

use crate::handlers::parse_options;
use crate::routes::{error_response, image_response, not_found, HttpResponse};
use crate::state::SharedState;
use crate::util::form::{parse_form, path_decode};

// ---------------------------------------------------------------------------
// GET /images/<relative path>
// ---------------------------------------------------------------------------

pub fn handle_get(raw_path: &str, query: &str, state: &SharedState) -> HttpResponse {
    let relative = path_decode(raw_path);
    let location = match resolve(&state.config.root, &relative) {
        Some(location) => location,
        None => return not_found(),
    };

    let pairs = parse_form(query);
    let options = match parse_options(&pairs, state.config.defaults) {
        Ok(options) => options,
        Err(e) => return error_response(&e),
    };

    match render_image(state, &location, &options) {
        Ok(bytes) => image_response(bytes, options.output.mime_type()),
        Err(e) => {
            log::warn!(
                "Rendering {} with {}/{} failed: {}",
                location,
                options.render_mode,
                options.normalization,
                e
            );
            error_response(&e)
        }
    }
}

fn render_image(
    state: &SharedState,
    location: &Location,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let buffer = load(&state.storage, location, None)?;
    log::debug!(
        "Loaded {}: {}x{}x{} {:?}",
        location,
        buffer.height(),
        buffer.width(),
        buffer.channels(),
        buffer.sample_format()
    );
    render(&buffer, options)
}

/// Joins a request path onto the served root. Empty paths and paths that
/// step outside the root are refused.
fn resolve(root: &Location, relative: &str) -> Option<Location> {
    let relative = relative.trim_start_matches('/');
    let escapes = relative
        .split(['/', '\\'])
        .any(|segment| segment == "..");
    if relative.is_empty() || escapes {
        return None;
    }
    Some(root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_parent_segments() {
        let root = Location::Local("/data".into());
        assert!(resolve(&root, "../etc/passwd").is_none());
        assert!(resolve(&root, "sub/../../x.png").is_none());
        assert!(resolve(&root, "sub\\..\\x.png").is_none());
        assert!(resolve(&root, "").is_none());
    }

    #[test]
    fn test_resolve_joins_relative_path() {
        let root = Location::parse("s3://bucket/tiles").unwrap();
        assert_eq!(
            resolve(&root, "2023/B04.tif"),
            Some(Location::S3 {
                bucket: "bucket".into(),
                key: "tiles/2023/B04.tif".into()
            })
        );
        let local = Location::Local("/data".into());
        assert_eq!(resolve(&local, "a..b.png"), Some(local.join("a..b.png")));
    }
}
