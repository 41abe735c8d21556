//! Page fetching with SSRF protection
//!
//! URLs typed into the page are fetched by the server, so requests to
//! private/internal IP addresses are refused before any connection is made.
//! Redirects are re-checked hop by hop.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::{Host, Url};

use crate::{Error, Result};

const MAX_REDIRECTS: usize = 10;

/// Fetches the raw HTML of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return its body
    ///
    /// # Errors
    ///
    /// Returns `HttpStatus`, `Connection`, `Timeout` or `InvalidUrl`
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed page fetcher
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with the given timeout and User-Agent
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect_policy())
            .user_agent(user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client })
    }

    /// Validate scheme and host of a URL
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for malformed, non-http(s) or blocked targets
    pub async fn validate(url: &str) -> Result<Url> {
        let parsed =
            Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::InvalidUrl(format!(
                "scheme {scheme} is not allowed, use http or https"
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::InvalidUrl("URL has no host".to_string()))?
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(80);

        let addrs = tokio::net::lookup_host((host.as_str(), port))
            .await
            .map_err(|e| Error::Connection(format!("failed to resolve {host}: {e}")))?;

        for addr in addrs {
            if is_blocked_ip(addr.ip()) {
                return Err(Error::InvalidUrl(format!(
                    "{host} resolves to private/internal address {}",
                    addr.ip()
                )));
            }
        }

        Ok(parsed)
    }
}

/// Follow up to `MAX_REDIRECTS` hops, refusing any hop to a blocked host
fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_blocked_redirect(attempt.url()) {
            tracing::warn!(target_url = %attempt.url(), "redirect to internal address refused");
            attempt.error("redirect to a private/internal address")
        } else {
            attempt.follow()
        }
    })
}

/// Whether a redirect target names a blocked host directly
///
/// Domain targets other than `localhost` pass; their addresses are only
/// known once reqwest resolves them.
fn is_blocked_redirect(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_blocked_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_blocked_ipv6(ip),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        None => true,
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Self::validate(url).await?;

        tracing::debug!(url = %parsed, "fetching page");
        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| Error::from_fetch(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %parsed, status = %status, "page fetch rejected");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_fetch(&e, url))?;

        tracing::debug!(url = %parsed, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Check if an IP address is private or otherwise blocked
///
/// Blocks the following ranges:
/// - IPv4: 127.0.0.0/8 (loopback), 10.0.0.0/8, 172.16.0.0/12,
///   192.168.0.0/16 (private), 169.254.0.0/16 (link-local),
///   0.0.0.0/8 (current network)
/// - IPv6: `::1` (loopback), `fc00::/7` (unique local), `fe80::/10` (link-local)
#[must_use]
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_blocked_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_blocked_ipv6(ipv6),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();

    octets[0] == 0
        || octets[0] == 127
        || octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
        || (octets[0] == 169 && octets[1] == 254)
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }

    // IPv4-mapped addresses inherit the IPv4 rules
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }

    let segments = ip.segments();

    // fc00::/7 - unique local
    let first_byte = (segments[0] >> 8) as u8;
    if first_byte == 0xfc || first_byte == 0xfd {
        return true;
    }

    // fe80::/10 - link-local
    segments[0] & 0xffc0 == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(ip: &str) -> bool {
        is_blocked_ip(ip.parse().unwrap())
    }

    #[test]
    fn test_blocked_ipv4_ranges() {
        assert!(blocked("127.0.0.1"));
        assert!(blocked("10.255.255.255"));
        assert!(blocked("172.16.0.1"));
        assert!(blocked("172.31.255.255"));
        assert!(blocked("192.168.1.1"));
        assert!(blocked("169.254.0.1"));
        assert!(blocked("0.0.0.0"));
    }

    #[test]
    fn test_allowed_ipv4() {
        assert!(!blocked("8.8.8.8"));
        assert!(!blocked("172.15.0.1"));
        assert!(!blocked("172.32.0.1"));
        assert!(!blocked("192.169.0.1"));
    }

    #[test]
    fn test_blocked_ipv6() {
        assert!(blocked("::1"));
        assert!(blocked("::"));
        assert!(blocked("fd00::1"));
        assert!(blocked("fe80::1234:5678:abcd:ef01"));
        assert!(blocked("::ffff:127.0.0.1"));
        assert!(!blocked("2606:4700:4700::1111"));
    }

    fn redirect_blocked(url: &str) -> bool {
        is_blocked_redirect(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_redirect_to_internal_host_is_refused() {
        assert!(redirect_blocked("http://169.254.169.254/latest/meta-data/"));
        assert!(redirect_blocked("http://127.0.0.1:8080/admin"));
        assert!(redirect_blocked("http://[::1]/"));
        assert!(redirect_blocked("http://[::ffff:10.0.0.1]/"));
        assert!(redirect_blocked("http://localhost/"));
        assert!(redirect_blocked("http://api.LOCALHOST./"));
    }

    #[test]
    fn test_redirect_to_public_host_is_followed() {
        assert!(!redirect_blocked("https://example.com/article"));
        assert!(!redirect_blocked("http://93.184.216.34/"));
        assert!(!redirect_blocked("https://localhost.example.com/"));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_scheme() {
        let err = HttpPageFetcher::validate("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_validate_rejects_loopback() {
        let err = HttpPageFetcher::validate("http://127.0.0.1:8080/").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage() {
        let err = HttpPageFetcher::validate("not a url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
