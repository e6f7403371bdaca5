//! Network client configuration and the transport seam used by every fetch strategy.

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_WEB_BASE,
    DOWNLOAD_CHUNK_SIZE, GITHUB_ACCEPT,
};
use crate::errors::{io_error_with_path, Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

/// Immutable settings shared by all network components.
///
/// Built once and passed by reference into each operation; nothing about the
/// client lives in global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base of the REST API (`https://api.github.com`).
    pub api_base: String,
    /// Base of the web host serving branch archives (`https://github.com`).
    pub web_base: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Timeout applied to each individual request.
    pub timeout: Duration,
    /// Maximum number of parallel file downloads in a tree walk.
    pub concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            user_agent: format!("modfetch/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ClientConfig {
    /// Checks that both bases are absolute http(s) URLs and that the limits are sane.
    pub fn validate(&self) -> Result<()> {
        for (label, base) in [("API base", &self.api_base), ("web base", &self.web_base)] {
            let parsed = url::Url::parse(base)
                .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", label, base, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "{} '{}' must use http or https",
                    label, base
                )));
            }
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// The network seam: everything the engine needs from an HTTP client.
///
/// Implementors only provide [`Transport::open`]; buffering and streaming to
/// disk are shared.
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` with the given query parameters and returns the body.
    ///
    /// # Errors
    /// Returns [`Error::NetworkFailure`] on a transport error or a non-2xx status.
    fn open(&self, url: &str, query: &[(&str, &str)]) -> Result<Box<dyn Read + Send>>;

    /// Fetches the full body of `url` into memory.
    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut body = self.open(url, query)?;
        let mut buffer = Vec::new();
        body.read_to_end(&mut buffer)
            .map_err(|e| Error::network(url, e))?;
        Ok(buffer)
    }

    /// Streams the body of `url` into a new file at `destination`, chunk by chunk.
    ///
    /// The file is only created once the request has succeeded. A partially
    /// written file is removed if the stream breaks.
    fn download_to(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut body = self.open(url, &[])?;
        let file = File::create(destination).map_err(|e| io_error_with_path(e, destination))?;
        let mut writer = BufWriter::new(file);
        let result = copy_chunks(url, &mut body, &mut writer, destination).and_then(|written| {
            writer
                .flush()
                .map_err(|e| io_error_with_path(e, destination))?;
            Ok(written)
        });
        if result.is_err() {
            drop(writer);
            let _ = std::fs::remove_file(destination);
        }
        result
    }
}

fn copy_chunks(
    url: &str,
    body: &mut dyn Read,
    writer: &mut dyn Write,
    destination: &Path,
) -> Result<u64> {
    let mut chunk = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = match body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::network(url, e)),
        };
        writer
            .write_all(&chunk[..read])
            .map_err(|e| io_error_with_path(e, destination))?;
        total += read as u64;
    }
    Ok(total)
}

/// The production [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client carrying the configured identifying headers and timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::Config(format!("Invalid user agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn open(&self, url: &str, query: &[(&str, &str)]) -> Result<Box<dyn Read + Send>> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        log::debug!("GET {} {:?}", url, query);
        let response = request.send().map_err(|e| Error::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(url, status));
        }
        Ok(Box::new(response))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.user_agent.starts_with("modfetch/"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig {
            api_base: "ftp://example.com".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig {
            web_base: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig {
            concurrency: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_http_transport_builds_from_default_config() {
        assert!(HttpTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_download_to_streams_large_body() {
        let body: Vec<u8> = (0..(DOWNLOAD_CHUNK_SIZE * 3 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        let transport = FakeTransport::new().route("https://files/blob", body.clone());
        let dir = tempdir().unwrap();
        let target = dir.path().join("blob.bin");

        let written = transport.download_to("https://files/blob", &target).unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[test]
    fn test_download_to_failure_creates_no_file() {
        let transport = FakeTransport::new();
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing.txt");

        let err = transport
            .download_to("https://files/missing", &target)
            .unwrap_err();

        assert!(matches!(err, Error::NetworkFailure { .. }));
        assert!(!target.exists());
    }
}
