/// Decodes `%XX` escapes, and also `+` as space when `plus_as_space` is set.
/// Invalid UTF-8 in the result is replaced rather than rejected.
fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(((h << 4) | l) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Decodes a query-string component: `%XX` escapes and `+` as space.
pub fn url_decode(s: &str) -> String {
    percent_decode(s, true)
}

/// Decodes a URL path. `+` is a literal character in paths.
pub fn path_decode(s: &str) -> String {
    percent_decode(s, false)
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(k), url_decode(v))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("a+b%20c"), "a b c");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn test_path_keeps_plus() {
        assert_eq!(path_decode("a+b/c%2Bd.tif"), "a+b/c+d.tif");
    }

    #[test]
    fn test_path_decode_inverts_encode_path() {
        let raw = "sub dir/B02 #1+.tif";
        let encoded = image_tiles::storage::encode_path(raw);
        assert_eq!(path_decode(&encoded), raw);
    }

    #[test]
    fn test_parse_form() {
        let pairs = parse_form("render_mode=bgr&num_items=&flag&&x=1%262");
        assert_eq!(form_get(&pairs, "render_mode"), Some("bgr"));
        assert_eq!(form_get(&pairs, "num_items"), Some(""));
        assert_eq!(form_get(&pairs, "flag"), Some(""));
        assert_eq!(form_get(&pairs, "x"), Some("1&2"));
        assert_eq!(form_get(&pairs, "missing"), None);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
