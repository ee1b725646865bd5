use image_tiles::{Normalization, OutputFormat, RenderMode};

use crate::handlers::{list_tiles, parse_count, parse_options, Tile};
use crate::render::{render_page, select_options};
use crate::routes::{error_response, html_response, HttpResponse};
use crate::state::SharedState;
use crate::util::form::{html_escape, parse_form};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_get(query: &str, state: &SharedState) -> HttpResponse {
    let config = &state.config;
    let pairs = parse_form(query);

    let parsed = parse_options(&pairs, config.defaults).and_then(|options| {
        let num_items = parse_count(&pairs, "num_items", config.num_items)?;
        let items_per_row = parse_count(&pairs, "items_per_row", config.items_per_row)?;
        Ok((options, num_items, items_per_row))
    });
    let (options, num_items, items_per_row) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    let (tiles, message) = match list_tiles(state, &options, num_items) {
        Ok(tiles) if tiles.is_empty() => (tiles, Some("No images found.".to_owned())),
        Ok(tiles) => (tiles, None),
        Err(e) => {
            log::error!("Listing {} failed: {}", config.root, e);
            (Vec::new(), Some(format!("Could not list images: {}", e)))
        }
    };

    let render_names: Vec<&str> = RenderMode::ALL.iter().map(|m| m.name()).collect();
    let norm_names: Vec<&str> = Normalization::ALL.iter().map(|n| n.name()).collect();
    let format_names = [OutputFormat::Png.name(), OutputFormat::Jpeg.name()];

    let page = render_page(|html| {
        html.replace("{{ROOT}}", &html_escape(&config.root.to_string()))
            .replace("{{COUNT}}", &tiles.len().to_string())
            .replace("{{NUM_ITEMS}}", &num_items.to_string())
            .replace("{{ITEMS_PER_ROW}}", &items_per_row.to_string())
            .replace("{{RENDER_OPTIONS}}", &select_options(&render_names, options.render_mode.name()))
            .replace("{{NORMALIZATION_OPTIONS}}", &select_options(&norm_names, options.normalization.name()))
            .replace("{{FORMAT_OPTIONS}}", &select_options(&format_names, options.output.name()))
            .replace("{{MESSAGE}}", &message_html(message.as_deref()))
            .replace("{{TILES}}", &tiles_html(&tiles))
    });
    html_response(page)
}

// ---------------------------------------------------------------------------
// HTML fragments
// ---------------------------------------------------------------------------

fn message_html(message: Option<&str>) -> String {
    match message {
        Some(m) => format!("<div class=\"message\">{}</div>", html_escape(m)),
        None => String::new(),
    }
}

fn tiles_html(tiles: &[Tile]) -> String {
    tiles
        .iter()
        .map(|tile| {
            let name = html_escape(&tile.name);
            let url = html_escape(&tile.url);
            format!(
                "<a class=\"tile\" href=\"{url}\" target=\"_blank\" title=\"{name}\">\
                 <img src=\"{url}\" alt=\"{name}\" loading=\"lazy\">\
                 <span class=\"name\">{name}</span></a>",
                url = url,
                name = name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_are_escaped() {
        let tiles = vec![Tile {
            name: "<b>.png".into(),
            url: "/images/%3Cb%3E.png?render_mode=rgb&normalization_mode=standard&format=png".into(),
        }];
        let html = tiles_html(&tiles);
        assert!(html.contains("&lt;b&gt;.png"));
        assert!(html.contains("render_mode=rgb&amp;normalization_mode"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_no_message_renders_nothing() {
        assert_eq!(message_html(None), "");
        assert!(message_html(Some("No images found.")).contains("No images found."));
    }
}
