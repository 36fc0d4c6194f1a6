//! URL decomposition
//!
//! Splits a URL into scheme, hostname, public-suffix-aware domain parts
//! and the path used by the feature functions. Pure, never fails:
//! malformed input yields empty fields.

use url::{Host, Url};

/// Parts of a URL consumed by every feature function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlComponents {
    /// `http` / `https` (lowercase), empty when unparseable.
    pub scheme: String,
    /// Lowercase host without port or IPv6 brackets.
    pub hostname: String,
    /// The label directly below the public suffix (`example` in `www.example.co.uk`).
    pub registrable_domain: String,
    /// Everything left of the registrable domain (`www`).
    pub subdomain: String,
    /// ICANN public suffix (`co.uk`), empty for unlisted TLDs and IPs.
    pub suffix: String,
    /// URL text from the first `/` after the first occurrence of the suffix.
    pub path: String,
    /// Explicit non-default port.
    pub port: Option<u16>,
}

impl UrlComponents {
    /// The eTLD+1 (`example.co.uk`), or whatever part of it is known.
    pub fn etld_plus_one(&self) -> String {
        match (self.registrable_domain.is_empty(), self.suffix.is_empty()) {
            (false, false) => format!("{}.{}", self.registrable_domain, self.suffix),
            (false, true) => self.registrable_domain.clone(),
            (true, _) => self.suffix.clone(),
        }
    }
}

/// Decompose a URL. Callers are expected to have checked the scheme prefix.
pub fn decompose(url: &str) -> UrlComponents {
    let (scheme, hostname, port, is_ip) = match Url::parse(url) {
        Ok(parsed) => {
            let (hostname, is_ip) = match parsed.host() {
                Some(Host::Domain(d)) => (d.to_lowercase(), false),
                Some(Host::Ipv4(addr)) => (addr.to_string(), true),
                Some(Host::Ipv6(addr)) => (addr.to_string(), true),
                None => (String::new(), false),
            };
            (parsed.scheme().to_string(), hostname, parsed.port(), is_ip)
        }
        Err(e) => {
            tracing::debug!("URL {:?} did not parse ({}); using empty components", url, e);
            (String::new(), String::new(), None, false)
        }
    };

    let (subdomain, registrable_domain, suffix) = split_host(&hostname, is_ip);
    let path = locate_path(url, &suffix);

    UrlComponents {
        scheme,
        hostname,
        registrable_domain,
        subdomain,
        suffix,
        path,
        port,
    }
}

/// Longest ICANN-section suffix of `host`. Private-section entries
/// (`github.io`, `blogspot.com`) are skipped by retrying on their parent.
fn icann_suffix(host: &str) -> Option<String> {
    let mut candidate = host.to_string();
    loop {
        let suffix = psl::suffix(candidate.as_bytes()).filter(|s| s.is_known())?;
        let text = String::from_utf8_lossy(suffix.as_bytes()).into_owned();
        if suffix.typ() == Some(psl::Type::Icann) {
            return Some(text);
        }
        let (_, parent) = text.split_once('.')?;
        candidate = parent.to_string();
    }
}

/// Split a hostname into (subdomain, registrable label, suffix) using the
/// ICANN section of the compiled-in Public Suffix List. For an unlisted TLD
/// the suffix is empty and the last label is the domain.
pub fn split_host(host: &str, is_ip: bool) -> (String, String, String) {
    if host.is_empty() {
        return Default::default();
    }
    if is_ip {
        return (String::new(), host.to_string(), String::new());
    }

    match icann_suffix(host) {
        Some(suffix) => {
            let Some(rest) = host
                .strip_suffix(suffix.as_str())
                .and_then(|r| r.strip_suffix('.'))
            else {
                // The host is itself a public suffix
                return (String::new(), String::new(), suffix);
            };
            let (sub, domain) = split_last_label(rest);
            (sub.to_string(), domain.to_string(), suffix)
        }
        None => {
            let (sub, domain) = split_last_label(host);
            (sub.to_string(), domain.to_string(), String::new())
        }
    }
}

fn split_last_label(s: &str) -> (&str, &str) {
    match s.rsplit_once('.') {
        Some((sub, last)) => (sub, last),
        None => ("", s),
    }
}

/// Everything after the first occurrence of `suffix` in the URL, cut at the
/// first `/`. An empty suffix matches at offset 0; a suffix that never
/// occurs selects only the final character.
pub fn locate_path(url: &str, suffix: &str) -> String {
    let tail = match url.find(suffix) {
        Some(i) => &url[i..],
        None => url
            .char_indices()
            .last()
            .map(|(i, _)| &url[i..])
            .unwrap_or(""),
    };
    match tail.split_once('/') {
        Some((_, rest)) => format!("/{rest}"),
        None => String::new(),
    }
}
