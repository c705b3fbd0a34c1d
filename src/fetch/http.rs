//! Plain HTTP(S) fetcher.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, FetchError, Result};
use crate::fetch::{Fetcher, ProgressFn};
use crate::fs::{coerce_filename, extension_of, sanitize_filename, suggested_name};

/// Streams a GET response body into the staging directory.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given user agent and overall timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        locator: &str,
        dest_dir: &Path,
        on_progress: ProgressFn<'_>,
    ) -> std::result::Result<PathBuf, FetchError> {
        let url = Url::parse(locator)
            .map_err(|e| FetchError::Other(format!("invalid URL '{}': {}", locator, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::Other(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                locator: locator.to_string(),
            });
        }

        let total = response.content_length();
        let name = file_name_for(&url, response.headers());
        let path = dest_dir.join(&name);

        let mut file = File::create(&path).await?;
        let mut stream = response.bytes_stream();
        let mut done: u64 = 0;
        on_progress(0, total);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            done += chunk.len() as u64;
            on_progress(done, total);
        }

        file.flush().await?;

        if let Some(total) = total {
            if done < total {
                return Err(FetchError::Transport(format!(
                    "connection closed after {} of {} bytes",
                    done, total
                )));
            }
        }

        tracing::debug!("Fetched {} bytes into {}", done, path.display());
        Ok(path)
    }
}

fn disposition_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|;)\s*(filename\*?)\s*=\s*("(?:[^"\\]|\\.)*"|[^;]*)"#)
            .expect("content-disposition pattern is valid")
    })
}

/// File name carried by a `Content-Disposition` value.
///
/// The RFC 5987 `filename*` parameter wins over plain `filename`.
fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for caps in disposition_param_pattern().captures_iter(value) {
        let raw = caps[2].trim();
        if caps[1].ends_with('*') {
            extended = extended.or_else(|| decode_extended_value(raw));
        } else if plain.is_none() {
            let unquoted = raw.trim_matches('"').replace("\\\"", "\"");
            plain = Some(unquoted.trim().to_string()).filter(|name| !name.is_empty());
        }
    }

    extended.or(plain)
}

/// Decode `charset'language'percent-encoded` (RFC 5987).
fn decode_extended_value(raw: &str) -> Option<String> {
    let raw = raw.trim_matches('"');
    let mut parts = raw.splitn(3, '\'');
    let (charset, encoded) = match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_language), Some(encoded)) => (charset, encoded),
        _ => ("utf-8", raw),
    };

    let bytes = percent_decode_str(encoded);
    let decoded = if charset.eq_ignore_ascii_case("iso-8859-1") {
        bytes.map(char::from).collect::<String>()
    } else {
        bytes.decode_utf8().ok()?.into_owned()
    };

    Some(decoded.trim().to_string()).filter(|name| !name.is_empty())
}

/// Pick the staged file name from the response headers and URL.
///
/// Order: `Content-Disposition` filename, last URL path segment, fallback.
/// A missing extension is taken from `Content-Type`.
fn file_name_for(url: &Url, headers: &HeaderMap) -> String {
    let from_header = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition);

    let name = match from_header {
        Some(name) => sanitize_filename(&name).unwrap_or_else(|_| coerce_filename(&name)),
        None => suggested_name(url.as_str()),
    };

    if extension_of(&name).is_some() {
        return name;
    }

    let extension = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_lowercase())
        .and_then(|essence| preferred_extension(&essence));

    match extension {
        Some(ext) => format!("{}.{}", name, ext),
        None => name,
    }
}

fn preferred_extension(mime: &str) -> Option<&'static str> {
    match mime {
        "video/mp4" => Some("mp4"),
        "audio/mpeg" => Some("mp3"),
        "image/jpeg" => Some("jpg"),
        "application/octet-stream" | "" => None,
        other => mime_guess::get_mime_extensions_str(other).and_then(|exts| exts.first().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(reqwest::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_file_name_from_url() {
        let url = Url::parse("https://example.com/media/video.mp4?sig=1").unwrap();
        assert_eq!(file_name_for(&url, &HeaderMap::new()), "video.mp4");
    }

    #[test]
    fn test_file_name_from_content_disposition() {
        let url = Url::parse("https://example.com/video123").unwrap();
        let h = headers(&[(CONTENT_DISPOSITION, r#"attachment; filename="video.mp4""#)]);
        assert_eq!(file_name_for(&url, &h), "video.mp4");

        let h = headers(&[(CONTENT_DISPOSITION, "attachment; filename*=UTF-8''clip.webm")]);
        assert_eq!(file_name_for(&url, &h), "clip.webm");

        let h = headers(&[(CONTENT_DISPOSITION, r#"attachment; filename="../../x.sh""#)]);
        assert_eq!(file_name_for(&url, &h), "____x.sh");
    }

    #[test]
    fn test_extended_filename_is_decoded_and_preferred() {
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''my%20clip.webm").as_deref(),
            Some("my clip.webm")
        );
        assert_eq!(
            filename_from_disposition(
                r#"attachment; filename="fallback.bin"; filename*=UTF-8''real.mp4"#
            )
            .as_deref(),
            Some("real.mp4")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=utf-8'en'caf%C3%A9.mp3; filename=cafe.mp3")
                .as_deref(),
            Some("café.mp3")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=iso-8859-1''na%EFve.txt").as_deref(),
            Some("naïve.txt")
        );
    }

    #[test]
    fn test_plain_filename_forms() {
        assert_eq!(
            filename_from_disposition("inline; filename=report.pdf").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="a; b.txt""#).as_deref(),
            Some("a; b.txt")
        );
        // Undecodable extended value falls back to the plain one.
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''%FF%FE; filename=ok.bin")
                .as_deref(),
            Some("ok.bin")
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_decoded_header_name_feeds_file_name() {
        let url = Url::parse("https://example.com/download?id=7").unwrap();
        let h = headers(&[(
            CONTENT_DISPOSITION,
            r#"attachment; filename="fallback.bin"; filename*=UTF-8''my%20clip.webm"#,
        )]);
        assert_eq!(file_name_for(&url, &h), "my clip.webm");
    }

    #[test]
    fn test_extension_from_content_type() {
        let url = Url::parse("https://example.com/video123").unwrap();
        let h = headers(&[(CONTENT_TYPE, "video/mp4; charset=binary")]);
        assert_eq!(file_name_for(&url, &h), "video123.mp4");

        let h = headers(&[(CONTENT_TYPE, "application/octet-stream")]);
        assert_eq!(file_name_for(&url, &h), "video123");
    }

    #[tokio::test]
    async fn test_fetch_streams_body_and_reports_progress() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![42u8; 64 * 1024];
        let mock = server
            .mock("GET", "/video123")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_body(body.clone())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new("stagepub-test", Duration::from_secs(10)).unwrap();
        let seen = Mutex::new(Vec::new());
        let progress = |done: u64, total: Option<u64>| seen.lock().unwrap().push((done, total));

        let path = fetcher
            .fetch(&format!("{}/video123", server.url()), dir.path(), &progress)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(path, dir.path().join("video123.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), body);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&(0, Some(body.len() as u64))));
        assert_eq!(seen.last(), Some(&(body.len() as u64, Some(body.len() as u64))));
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new("stagepub-test", Duration::from_secs(10)).unwrap();
        let locator = format!("{}/missing", server.url());

        let err = fetcher
            .fetch(&locator, dir.path(), &|_: u64, _: Option<u64>| {})
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 404,
                locator
            }
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new("stagepub-test", Duration::from_secs(10)).unwrap();

        let err = fetcher
            .fetch("ftp://example.com/file", dir.path(), &|_: u64, _: Option<u64>| {})
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Other(_)));
    }
}
