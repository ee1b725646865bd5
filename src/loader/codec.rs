use image::ImageFormat;

/// Decoder chosen for a file, from its extension, an explicit hint or its
/// leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Consumer formats handled by the `image` crate.
    Generic(ImageFormat),
    /// TIFF with any band count, including multi-page band stacks.
    Tiff,
    /// JPEG 2000 (JP2 container or raw codestream).
    Jp2,
}

const GENERIC_EXTENSIONS: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("jpe", ImageFormat::Jpeg),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("webp", ImageFormat::WebP),
];

const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

const JP2_EXTENSIONS: &[&str] = &["jp2", "j2k", "j2c", "jpx", "jpf"];

impl Codec {
    /// Looks up a codec by lower- or upper-case extension, with or without a
    /// leading dot.
    pub fn from_extension(ext: &str) -> Option<Codec> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if TIFF_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Codec::Tiff);
        }
        if JP2_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Codec::Jp2);
        }
        GENERIC_EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| Codec::Generic(*format))
    }

    /// Detects the codec from magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Codec> {
        if data.len() < 4 {
            return None;
        }

        // TIFF: II*\0 (little endian), MM\0* (big endian), plus BigTIFF.
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
            || data.starts_with(&[0x49, 0x49, 0x2B, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2B])
        {
            return Some(Codec::Tiff);
        }

        // JP2 signature box, or a bare J2K codestream (SOC + SIZ markers).
        if data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20])
            || data.starts_with(&[0xFF, 0x4F, 0xFF, 0x51])
        {
            return Some(Codec::Jp2);
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Codec::Generic(ImageFormat::Png));
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Codec::Generic(ImageFormat::Jpeg));
        }
        if data.starts_with(b"GIF8") {
            return Some(Codec::Generic(ImageFormat::Gif));
        }
        if data.starts_with(b"BM") {
            return Some(Codec::Generic(ImageFormat::Bmp));
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Codec::Generic(ImageFormat::WebP));
        }

        None
    }

    /// Whether this build can actually decode the codec.
    pub fn is_available(self) -> bool {
        match self {
            Codec::Generic(_) | Codec::Tiff => true,
            Codec::Jp2 => cfg!(feature = "jp2"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Codec::Generic(ImageFormat::Png) => "png",
            Codec::Generic(ImageFormat::Jpeg) => "jpeg",
            Codec::Generic(ImageFormat::Gif) => "gif",
            Codec::Generic(ImageFormat::Bmp) => "bmp",
            Codec::Generic(ImageFormat::WebP) => "webp",
            Codec::Generic(_) => "image",
            Codec::Tiff => "tiff",
            Codec::Jp2 => "jp2",
        }
    }
}

/// Whether a file name carries an extension this build can decode; used to
/// filter folder listings.
pub fn is_supported_file(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .and_then(Codec::from_extension)
        .map(Codec::is_available)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(Codec::from_extension("tif"), Some(Codec::Tiff));
        assert_eq!(Codec::from_extension(".TIFF"), Some(Codec::Tiff));
        assert_eq!(Codec::from_extension("JPG"), Some(Codec::Generic(ImageFormat::Jpeg)));
        assert_eq!(Codec::from_extension("jp2"), Some(Codec::Jp2));
        assert_eq!(Codec::from_extension("txt"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(Codec::sniff(&[0x49, 0x49, 0x2A, 0x00, 8, 0, 0, 0]), Some(Codec::Tiff));
        assert_eq!(
            Codec::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(Codec::Generic(ImageFormat::Png))
        );
        assert_eq!(
            Codec::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]),
            Some(Codec::Generic(ImageFormat::Jpeg))
        );
        assert_eq!(
            Codec::sniff(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A]),
            Some(Codec::Jp2)
        );
        assert_eq!(Codec::sniff(b"hello world"), None);
        assert_eq!(Codec::sniff(&[0x89]), None);
    }

    #[test]
    fn test_is_supported_file() {
        assert!(is_supported_file("scene.TIF"));
        assert!(is_supported_file("cat.png"));
        assert!(!is_supported_file("catdog.txt"));
        assert!(!is_supported_file("README"));
        assert_eq!(is_supported_file("T32TQM_B04.jp2"), cfg!(feature = "jp2"));
    }
}
