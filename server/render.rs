/// Template renderer for the gallery page.
///
/// The page is a single HTML template (`server/assets/image_tiles.html`) with
/// placeholder tokens like `{{TOKEN}}`, embedded at compile time. Callers
/// substitute their tokens in a closure; anything left over is blanked so no
/// raw `{{TOKEN}}` reaches the browser.

const TEMPLATE: &str = include_str!("assets/image_tiles.html");

pub fn render_page<F>(fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    blank_remaining(fill(TEMPLATE.to_owned()))
}

/// Builds `<option>` tags for a `<select>`, marking `selected` as chosen.
pub fn select_options(names: &[&str], selected: &str) -> String {
    names
        .iter()
        .map(|name| {
            let sel = if *name == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", name, sel)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        match html[start..].find("}}") {
            Some(end) => html.replace_range(start..start + end + 2, ""),
            None => break,
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfilled_tokens_are_blanked() {
        let page = render_page(|html| html.replace("{{ROOT}}", "/data/tiles"));
        assert!(page.contains("/data/tiles"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_select_options_marks_selection() {
        let html = select_options(&["rgb", "bgr"], "bgr");
        assert!(html.contains("<option value=\"bgr\" selected>bgr</option>"));
        assert!(html.contains("<option value=\"rgb\">rgb</option>"));
    }
}
