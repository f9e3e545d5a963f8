//! IP address extraction utilities
//!
//! Provides secure extraction of client IP addresses from X-Forwarded-For
//! headers with validation to prevent header spoofing attacks.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract and validate the client IP from request headers.
///
/// Behind a load balancer, X-Forwarded-For carries a chain of addresses.
/// `trusted_proxy_count` says how many trailing entries belong to our own
/// proxies; the client is the entry just before them.
///
/// Returns the validated client IP as a string, or "unknown".
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&std::net::SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(header_value) = forwarded_for.to_str() {
            let ip = extract_from_forwarded_for(header_value, trusted_proxy_count);
            if ip != "unknown" {
                return ip;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(header_value) = real_ip.to_str() {
            let trimmed = header_value.trim();
            if is_valid_ip(trimmed) {
                return trimmed.to_string();
            }
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Extract the client IP from an X-Forwarded-For chain
/// (`client, proxy1, proxy2, ...`).
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> String {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if ips.is_empty() {
        return "unknown".to_string();
    }

    // Without trusted proxies the header is spoofable; fall back to the IP
    // closest to us, still validated.
    if trusted_proxy_count == 0 || ips.len() <= trusted_proxy_count {
        let last_ip = ips.last().unwrap_or(&"");
        if is_valid_ip(last_ip) {
            return last_ip.to_string();
        }
        return "unknown".to_string();
    }

    let client_ip_pos = ips.len().saturating_sub(trusted_proxy_count + 1);
    let client_ip = ips.get(client_ip_pos).unwrap_or(&"");

    if is_valid_ip(client_ip) {
        return client_ip.to_string();
    }

    "unknown".to_string()
}

fn is_valid_ip(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_single_entry_chain() {
        let headers = headers_with_xff("203.0.113.9");
        assert_eq!(extract_client_ip(&headers, None, 1), "203.0.113.9");
    }

    #[test]
    fn test_client_before_trusted_proxy() {
        let headers = headers_with_xff("203.0.113.9, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None, 1), "203.0.113.9");

        let headers = headers_with_xff("198.51.100.7, 10.0.0.3, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None, 2), "198.51.100.7");
    }

    #[test]
    fn test_spoofed_garbage_is_rejected() {
        let headers = headers_with_xff("not-an-ip, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None, 1), "unknown");
    }

    #[test]
    fn test_socket_fallback() {
        let headers = HeaderMap::new();
        let addr: std::net::SocketAddr = "192.0.2.4:51000".parse().unwrap();
        assert_eq!(extract_client_ip(&headers, Some(&addr), 1), "192.0.2.4");
        assert_eq!(extract_client_ip(&headers, None, 1), "unknown");
    }

    #[test]
    fn test_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.77"));
        assert_eq!(extract_client_ip(&headers, None, 1), "203.0.113.77");
    }
}
