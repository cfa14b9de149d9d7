//! Loading raw source bytes from HTTP or the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url} returned status {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Whether `source` names an HTTP(S) URL rather than a file path.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads `source` as a URL when [`is_url`], otherwise as a file path.
/// Gzip-compressed content is decompressed.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_url(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    maybe_gunzip(bytes)
}

fn maybe_gunzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut out)
        .context("gzip stream is corrupt")?;
    debug!(compressed = bytes.len(), decompressed = out.len(), "Decompressed gzip source");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    /// Answers every request with a fixed status and body.
    struct StaticClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for StaticClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(resp.into())
        }
    }

    fn temp_path(name: &str) -> String {
        format!("{}/{}", std::env::temp_dir().display(), name)
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://dsc106.com/stations.json"));
        assert!(is_url("http://localhost:8000/trips.csv"));
        assert!(!is_url("http_trips.csv"));
        assert!(!is_url("data/https.json"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body_on_success() {
        let client = StaticClient { status: 200, body: "a,b\n" };
        let bytes = fetch_bytes(&client, "http://example.test/trips.csv").await.unwrap();
        assert_eq!(bytes, b"a,b\n");
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_not_found() {
        let client = StaticClient { status: 404, body: "missing" };
        let err = fetch_bytes(&client, "http://example.test/trips.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_load_source_propagates_http_failure() {
        let client = StaticClient { status: 500, body: "" };
        assert!(load_source(&client, "https://example.test/stations.json").await.is_err());
    }

    #[tokio::test]
    async fn test_local_file_named_like_http_is_read_from_disk() {
        let path = "http_bluebikes_traffic_test_local.csv";
        std::fs::write(path, "y\n").unwrap();

        let client = StaticClient { status: 404, body: "" };
        let bytes = load_source(&client, path).await.unwrap();
        assert_eq!(bytes, b"y\n");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_plain_bytes_pass_through() {
        let out = maybe_gunzip(b"a,b\n1,2\n".to_vec()).unwrap();
        assert_eq!(out, b"a,b\n1,2\n");
    }

    #[test]
    fn test_gzip_is_decompressed() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello stations").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(maybe_gunzip(compressed).unwrap(), b"hello stations");
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        assert!(maybe_gunzip(vec![0x1f, 0x8b, 0x08]).is_err());
    }

    #[tokio::test]
    async fn test_load_source_reads_file() {
        let path = temp_path("bluebikes_traffic_test_source.csv");
        std::fs::write(&path, "x\n").unwrap();

        let bytes = load_source(&BasicClient::new().unwrap(), &path).await.unwrap();
        assert_eq!(bytes, b"x\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_source_missing_file() {
        let path = temp_path("bluebikes_traffic_does_not_exist.json");
        assert!(load_source(&BasicClient::new().unwrap(), &path).await.is_err());
    }
}
