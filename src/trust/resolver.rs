//! Trusted-proxy chain resolution.
//!
//! Computes the single address to treat as "the client" for a request,
//! honoring a client-supplied forwarding header only when every hop in the
//! chain is an explicitly trusted proxy and the socket peer itself is
//! trusted or loopback. Every ambiguous case denies.

use std::collections::HashSet;
use std::net::IpAddr;
use std::str::FromStr;

use crate::config::ForwardedConfig;
use crate::error::GatewayError;

/// Process-wide trust policy, built once at startup from config.
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    /// Forwarding header to honor. Unset means the header is ignored entirely.
    pub forwarded_header: Option<String>,
    /// Address literals accepted as legitimate forwarders.
    pub trusted_proxies: HashSet<String>,
    /// Reject requests lacking the forwarding header.
    pub enforce: bool,
}

impl TrustPolicy {
    pub fn from_config(config: &ForwardedConfig) -> Self {
        Self {
            forwarded_header: config.header.clone(),
            trusted_proxies: config
                .trusted_proxies
                .iter()
                .map(|p| p.trim().to_string())
                .collect(),
            enforce: config.enforce,
        }
    }
}

/// Resolve the socket peer only, never honoring forwarding headers.
///
/// Used for the administrative path where access must come from the
/// literal socket peer.
pub fn resolve_direct_peer(peer_address: &str) -> Result<IpAddr, GatewayError> {
    if peer_address.is_empty() {
        return Err(GatewayError::UntrustedSource);
    }
    parse_address(peer_address)
}

/// Resolve the client address for a request.
///
/// `forwarded_value` is the raw value of the configured forwarding header,
/// if the request carried one. Returns the address to treat as the client,
/// or a terminal trust failure. Never falls back to trusting the header on
/// error.
pub fn resolve_client_address(
    peer_address: &str,
    forwarded_value: Option<&str>,
    policy: &TrustPolicy,
) -> Result<IpAddr, GatewayError> {
    if peer_address.is_empty() {
        return Err(GatewayError::UntrustedSource);
    }

    let peer_addr = parse_address(peer_address)?;

    if policy.forwarded_header.is_none() {
        return Ok(peer_addr);
    }

    let value = match forwarded_value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            if policy.enforce {
                return Err(GatewayError::MissingForwardHeader);
            }
            return Ok(peer_addr);
        }
    };

    // First entry is the claimed original client; the rest is the proxy
    // chain it passed through, nearest-to-original first.
    let chain: Vec<&str> = value.split(',').map(str::trim).collect();

    if policy.trusted_proxies.is_empty() {
        return Err(GatewayError::NoTrustedProxiesConfigured);
    }

    let proxies_passed: Vec<&&str> = chain[1..]
        .iter()
        .filter(|hop| !policy.trusted_proxies.contains(**hop))
        .collect();

    tracing::debug!(
        untrusted_hops = proxies_passed.len(),
        chain_len = chain.len(),
        "forwarding chain inspected"
    );

    let peer_trusted =
        policy.trusted_proxies.contains(peer_address) || peer_addr.is_loopback();

    if !proxies_passed.is_empty() || !peer_trusted {
        return Err(GatewayError::UntrustedProxyChain);
    }

    let client = chain[0];
    if client.is_empty() {
        return Err(GatewayError::InvalidAddress(String::new()));
    }

    // Textually identical to the peer: reuse the already-parsed address.
    if client == peer_address {
        Ok(peer_addr)
    } else {
        parse_address(client)
    }
}

fn parse_address(candidate: &str) -> Result<IpAddr, GatewayError> {
    IpAddr::from_str(candidate)
        .map_err(|_| GatewayError::InvalidAddress(candidate.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(trusted: &[&str], enforce: bool) -> TrustPolicy {
        TrustPolicy {
            forwarded_header: Some("X-Forwarded-For".to_string()),
            trusted_proxies: trusted.iter().map(|s| s.to_string()).collect(),
            enforce,
        }
    }

    #[test]
    fn loopback_peer_without_header_resolves_to_itself() {
        let resolved =
            resolve_client_address("127.0.0.1", None, &policy(&["10.0.0.5"], false)).unwrap();
        assert_eq!(resolved, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn header_ignored_when_not_configured() {
        let no_header = TrustPolicy {
            forwarded_header: None,
            trusted_proxies: HashSet::new(),
            enforce: false,
        };
        let resolved =
            resolve_client_address("192.0.2.7", Some("203.0.113.9"), &no_header).unwrap();
        assert_eq!(resolved, "192.0.2.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_chain_resolves_to_first_entry() {
        let resolved = resolve_client_address(
            "10.0.0.5",
            Some("203.0.113.9, 10.0.0.5"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap();
        assert_eq!(resolved, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn untrusted_hop_in_chain_is_rejected() {
        let err = resolve_client_address(
            "10.0.0.5",
            Some("203.0.113.9, 10.0.0.6"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::UntrustedProxyChain));
    }

    #[test]
    fn untrusted_peer_is_rejected_even_with_trusted_chain() {
        let err = resolve_client_address(
            "198.51.100.2",
            Some("203.0.113.9, 10.0.0.5"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::UntrustedProxyChain));
    }

    #[test]
    fn loopback_peer_may_forward_through_trusted_chain() {
        let resolved = resolve_client_address(
            "127.0.0.1",
            Some("203.0.113.9, 10.0.0.5"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap();
        assert_eq!(resolved, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn single_entry_chain_from_trusted_peer() {
        let resolved = resolve_client_address(
            "10.0.0.5",
            Some("203.0.113.9"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap();
        assert_eq!(resolved, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn empty_trusted_set_fails_closed() {
        let err = resolve_client_address(
            "127.0.0.1",
            Some("203.0.113.9"),
            &policy(&[], false),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::NoTrustedProxiesConfigured));
    }

    #[test]
    fn missing_header_with_enforcement_is_rejected() {
        let err =
            resolve_client_address("10.0.0.5", None, &policy(&["10.0.0.5"], true)).unwrap_err();
        assert!(matches!(err, GatewayError::MissingForwardHeader));

        // whitespace-only values count as absent
        let err = resolve_client_address("10.0.0.5", Some("  "), &policy(&["10.0.0.5"], true))
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingForwardHeader));
    }

    #[test]
    fn empty_peer_is_untrusted_source() {
        let err = resolve_client_address("", None, &policy(&["10.0.0.5"], false)).unwrap_err();
        assert!(matches!(err, GatewayError::UntrustedSource));

        let err = resolve_direct_peer("").unwrap_err();
        assert!(matches!(err, GatewayError::UntrustedSource));
    }

    #[test]
    fn garbage_client_entry_is_invalid_address() {
        let err = resolve_client_address(
            "10.0.0.5",
            Some("not-an-address, 10.0.0.5"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAddress(_)));
    }

    #[test]
    fn chain_entry_equal_to_peer_reuses_parsed_peer() {
        let resolved = resolve_client_address(
            "10.0.0.5",
            Some("10.0.0.5, 10.0.0.5"),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap();
        assert_eq!(resolved, "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn whitespace_in_chain_entries_is_trimmed() {
        let resolved = resolve_client_address(
            "10.0.0.5",
            Some("  203.0.113.9 ,  10.0.0.5  "),
            &policy(&["10.0.0.5"], false),
        )
        .unwrap();
        assert_eq!(resolved, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn direct_peer_mode_resolves_loopback() {
        let resolved = resolve_direct_peer("127.0.0.1").unwrap();
        assert!(resolved.is_loopback());

        let resolved = resolve_direct_peer("::1").unwrap();
        assert!(resolved.is_loopback());
    }
}
