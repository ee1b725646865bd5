//! Anonymous access to S3-compatible object stores over plain HTTP.
//!
//! Objects are fetched with `GET`, checked with `HEAD`, and folders are listed
//! through the `ListObjectsV2` API. Requests are unsigned, so only public
//! buckets (or endpoints that allow anonymous reads) are reachable.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::encode_path;
use crate::error::{Result, TilesError};

/// Largest object body we are willing to buffer (satellite scenes are big).
const MAX_OBJECT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Where S3 requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Path-style endpoint such as `http://localhost:9000`; when unset the
    /// AWS virtual-hosted URL for `region` is used.
    pub endpoint: Option<String>,
    pub region: String,
}

impl Default for S3Config {
    fn default() -> Self {
        S3Config {
            endpoint: None,
            region: "us-east-1".to_owned(),
        }
    }
}

impl S3Config {
    /// Base URL of a bucket, without a trailing slash.
    pub fn bucket_url(&self, bucket: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, self.region),
        }
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}", self.bucket_url(bucket), encode_path(key))
    }

    /// `ListObjectsV2` request URL for one page.
    pub fn list_url(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation: Option<&str>,
    ) -> String {
        let mut url = format!(
            "{}/?list-type=2&prefix={}",
            self.bucket_url(bucket),
            urlencoding::encode(prefix)
        );
        if let Some(d) = delimiter {
            url.push_str("&delimiter=");
            url.push_str(&urlencoding::encode(d));
        }
        if let Some(token) = continuation {
            url.push_str("&continuation-token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

fn display(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}

pub fn read(config: &S3Config, bucket: &str, key: &str) -> Result<Vec<u8>> {
    let url = config.object_url(bucket, key);
    log::debug!("GET {}", url);
    let response = ureq::get(&url).call().map_err(|e| {
        log::warn!("Could not fetch {}: {}", display(bucket, key), e);
        TilesError::not_found(display(bucket, key))
    })?;
    let mut body = response.into_body();
    body.with_config()
        .limit(MAX_OBJECT_BYTES)
        .read_to_vec()
        .map_err(|e| {
            log::warn!("Transfer of {} failed: {}", display(bucket, key), e);
            TilesError::not_found(display(bucket, key))
        })
}

/// True when `key` is an object, or a prefix with at least one object below it.
pub fn exists(config: &S3Config, bucket: &str, key: &str) -> bool {
    if !key.is_empty() && ureq::head(&config.object_url(bucket, key)).call().is_ok() {
        return true;
    }
    let prefix = if key.is_empty() || key.ends_with('/') {
        key.to_owned()
    } else {
        format!("{}/", key)
    };
    fetch_page(config, bucket, &prefix, None, None)
        .map(|page| !page.keys.is_empty())
        .unwrap_or(false)
}

/// Lists object keys under `prefix`, following continuation tokens.
///
/// Non-recursive listings use `/` as delimiter so only direct children are
/// returned.
pub fn list(config: &S3Config, bucket: &str, prefix: &str, recursive: bool) -> Result<Vec<String>> {
    let prefix = if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_owned()
    } else {
        format!("{}/", prefix)
    };
    let delimiter = if recursive { None } else { Some("/") };

    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch_page(config, bucket, &prefix, delimiter, token.as_deref())?;
        keys.extend(page.keys.into_iter().filter(|k| !k.ends_with('/')));
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(keys)
}

fn fetch_page(
    config: &S3Config,
    bucket: &str,
    prefix: &str,
    delimiter: Option<&str>,
    continuation: Option<&str>,
) -> Result<ListPage> {
    let url = config.list_url(bucket, prefix, delimiter, continuation);
    log::debug!("GET {}", url);
    let xml = ureq::get(&url)
        .call()
        .and_then(|response| response.into_body().read_to_string())
        .map_err(|e| {
            log::warn!("Listing {} failed: {}", display(bucket, prefix), e);
            TilesError::not_found(display(bucket, prefix))
        })?;
    parse_list_page(&xml, &display(bucket, prefix))
}

/// One page of a `ListObjectsV2` response.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Set only when the listing is truncated.
    pub next_token: Option<String>,
}

/// Extracts `Contents/Key` values and the continuation token from a
/// `ListBucketResult` document. `location` names the listing in errors.
pub fn parse_list_page(xml: &str, location: &str) -> Result<ListPage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut page = ListPage::default();
    let mut truncated = false;
    let mut token: Option<String> = None;
    let mut saw_root = false;

    let mut in_contents = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "ListBucketResult" => saw_root = true,
                    "Contents" => in_contents = true,
                    _ => {}
                }
                current = name;
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"Contents" {
                    in_contents = false;
                }
                current.clear();
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| TilesError::decode(location, e))?
                    .to_string();
                match current.as_str() {
                    "Key" if in_contents => page.keys.push(text),
                    "IsTruncated" => truncated = text == "true",
                    "NextContinuationToken" => token = Some(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TilesError::decode(
                    location,
                    format!("malformed listing at byte {}: {}", reader.buffer_position(), e),
                ))
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(TilesError::decode(location, "response is not a ListBucketResult"));
    }
    if truncated {
        page.next_token = token;
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Location, Storage};

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>path</Name>
  <Prefix>scenes/</Prefix>
  <KeyCount>2</KeyCount>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=</NextContinuationToken>
  <Contents>
    <Key>scenes/cat.png</Key>
    <Size>6</Size>
  </Contents>
  <Contents>
    <Key>scenes/a&amp;b.tif</Key>
    <Size>6</Size>
  </Contents>
  <CommonPrefixes>
    <Prefix>scenes/sub/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;

    #[test]
    fn test_parse_list_page() {
        let page = parse_list_page(PAGE, "s3://path/scenes/").unwrap();
        assert_eq!(page.keys, vec!["scenes/cat.png", "scenes/a&b.tif"]);
        assert_eq!(
            page.next_token.as_deref(),
            Some("1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=")
        );
    }

    #[test]
    fn test_parse_empty_bucket() {
        let xml = r#"<ListBucketResult><Name>path</Name><KeyCount>0</KeyCount><IsTruncated>false</IsTruncated></ListBucketResult>"#;
        let page = parse_list_page(xml, "s3://path/").unwrap();
        assert!(page.keys.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn test_parse_rejects_error_document() {
        let xml = r#"<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>"#;
        assert!(matches!(
            parse_list_page(xml, "s3://private/"),
            Err(TilesError::Decode { .. })
        ));
    }

    #[test]
    fn test_urls() {
        let aws = S3Config::default();
        assert_eq!(
            aws.object_url("bucket", "dir/my image.tif"),
            "https://bucket.s3.us-east-1.amazonaws.com/dir/my%20image.tif"
        );

        let minio = S3Config {
            endpoint: Some("http://localhost:9000/".into()),
            region: "us-east-1".into(),
        };
        assert_eq!(
            minio.list_url("bucket", "scenes/", Some("/"), Some("a+b")),
            "http://localhost:9000/bucket/?list-type=2&prefix=scenes%2F&delimiter=%2F&continuation-token=a%2Bb"
        );
    }

    /// Nothing listens on port 1, so every request fails to connect.
    fn unreachable() -> Storage {
        Storage::new(S3Config {
            endpoint: Some("http://127.0.0.1:1".into()),
            region: "us-east-1".into(),
        })
    }

    #[test]
    fn test_unreachable_read_is_not_found() {
        let location = Location::parse("s3://bucket/scene.tif").unwrap();
        assert!(matches!(
            unreachable().read(&location),
            Err(TilesError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unreachable_exists_is_false() {
        let storage = unreachable();
        assert!(!storage.exists(&Location::parse("s3://bucket/scene.tif").unwrap()));
        assert!(!storage.exists(&Location::parse("s3://bucket/").unwrap()));
    }

    #[test]
    fn test_unreachable_list_is_not_found() {
        let root = Location::parse("s3://bucket/scenes").unwrap();
        for recursive in [false, true] {
            assert!(matches!(
                unreachable().list(&root, "*", recursive),
                Err(TilesError::NotFound { .. })
            ));
        }
    }
}
