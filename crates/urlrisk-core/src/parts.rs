//! Tolerant URL decomposition.
//!
//! Splits an arbitrary input string into scheme, host, path, and query
//! without ever failing: structural defects are recorded as flags and read
//! downstream as signals. Scheme-less inputs are retried with an `http://`
//! prefix so bare domains like `free-gift.tk` still yield a host.

use url::{Host, Url};

/// Structural view of a (possibly malformed) URL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// A `scheme://` prefix was present in the input.
    pub has_scheme: bool,
    /// The scheme, lowercased, when present.
    pub scheme: Option<String>,
    /// Host as parsed, lowercased for domains.
    pub host: Option<String>,
    /// Host is an IPv4 or IPv6 literal.
    pub is_ip_host: bool,
    /// Path component, empty when nothing was recoverable.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// No usable host could be recovered from the input.
    pub parse_failed: bool,
}

fn is_valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

impl UrlParts {
    /// Decompose `input`. Total: defined for every string, including empty.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        let (has_scheme, scheme) = match trimmed.split_once("://") {
            Some((s, _)) if is_valid_scheme(s) => (true, Some(s.to_ascii_lowercase())),
            _ => (false, None),
        };

        let parsed = Url::parse(trimmed).ok().or_else(|| {
            if has_scheme {
                None
            } else {
                // Salvage bare domains and host-only inputs.
                Url::parse(&format!("http://{trimmed}")).ok()
            }
        });

        match parsed {
            Some(url) => {
                let (host, is_ip_host) = match url.host() {
                    Some(Host::Domain(d)) => (Some(d.to_ascii_lowercase()), false),
                    Some(Host::Ipv4(a)) => (Some(a.to_string()), true),
                    Some(Host::Ipv6(a)) => (Some(a.to_string()), true),
                    None => (None, false),
                };
                let parse_failed = host.is_none();
                Self {
                    has_scheme,
                    scheme,
                    host,
                    is_ip_host,
                    path: url.path().to_string(),
                    query: url.query().map(str::to_string),
                    parse_failed,
                }
            }
            None => Self {
                has_scheme,
                scheme,
                host: None,
                is_ip_host: false,
                path: String::new(),
                query: None,
                parse_failed: true,
            },
        }
    }

    /// Dot-separated labels of a domain host. Empty for IP hosts and
    /// unrecoverable inputs.
    pub fn host_labels(&self) -> Vec<&str> {
        match &self.host {
            Some(h) if !self.is_ip_host => h.split('.').filter(|l| !l.is_empty()).collect(),
            _ => Vec::new(),
        }
    }

    /// Final host label. `None` for IP hosts, since an address octet is not
    /// a top-level domain.
    pub fn tld(&self) -> Option<&str> {
        self.host_labels().last().copied()
    }

    /// Host labels beyond the registrable pair: `www.google.com` -> 1.
    pub fn subdomain_depth(&self) -> usize {
        self.host_labels().len().saturating_sub(2)
    }

    /// Non-empty path segments.
    pub fn path_depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }

    /// Non-empty `&`-separated query entries.
    pub fn query_param_count(&self) -> usize {
        self.query
            .as_deref()
            .map(|q| q.split('&').filter(|p| !p.is_empty()).count())
            .unwrap_or(0)
    }
}
