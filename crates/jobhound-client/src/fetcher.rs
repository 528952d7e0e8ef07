use std::net::IpAddr;

use jobhound_core::error::{AppError, FetchError};
use jobhound_core::traits::{FetchRequest, Fetcher};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use url::Url;

/// HTTP page fetcher using reqwest.
///
/// One pooled client is shared by every request; user agent, headers and the
/// wall-clock timeout come from each [`FetchRequest`]. By default, SSRF
/// protection is **enabled**: requests to private/reserved IP ranges are
/// refused. Use [`allow_private_urls`](Self::allow_private_urls) to disable
/// this (e.g., for CLI usage where the user controls the machine).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            ssrf_protection: true,
        })
    }

    /// Disable SSRF protection, allowing requests to private/reserved IPs.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }
}

fn build_headers(request: &FetchRequest) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(&request.user_agent)
        .map_err(|e| FetchError::InvalidRequest(format!("invalid user agent: {e}")))?;
    headers.insert(USER_AGENT, agent);

    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidRequest(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidRequest(format!("invalid header value: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        if self.ssrf_protection {
            validate_url(&request.url).await?;
        }

        let response = self
            .client
            .get(&request.url)
            .headers(build_headers(request)?)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(request.timeout)
                } else if e.is_connect() {
                    FetchError::Network(format!("Connection failed: {e}"))
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
                url: request.url.clone(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(request.timeout)
            } else {
                FetchError::Network(format!("Failed to read response body: {e}"))
            }
        })
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Refuse URLs that are not http(s) or whose host resolves to a
/// private/reserved address.
async fn validate_url(url: &str) -> Result<(), FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::Blocked(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FetchError::Blocked(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| FetchError::Blocked("URL has no host".to_string()))?;

    if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(FetchError::Blocked(format!(
                "SSRF blocked: {host} is a private/reserved IP"
            )));
        }
        return Ok(());
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| FetchError::Network(format!("DNS resolution failed for {host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(FetchError::Network(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }

    if let Some(addr) = addrs.iter().find(|a| is_private_ip(a.ip())) {
        return Err(FetchError::Blocked(format!(
            "SSRF blocked: {host} resolves to private/reserved IP {}",
            addr.ip()
        )));
    }

    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local() // includes cloud metadata
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64 // CGN
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                || v6
                    .to_ipv4_mapped()
                    .is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}
