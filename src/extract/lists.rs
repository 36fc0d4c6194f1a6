//! Reference lists used by the structural and statistical features
//!
//! Changing any of these changes what a feature means; bump
//! `schema::SCHEMA_VERSION` when editing them.

/// Well-known brands targeted by phishing kits.
pub const BRANDS: &[&str] = &[
    "paypal",
    "apple",
    "icloud",
    "microsoft",
    "office365",
    "outlook",
    "hotmail",
    "live",
    "google",
    "gmail",
    "youtube",
    "facebook",
    "instagram",
    "whatsapp",
    "twitter",
    "linkedin",
    "amazon",
    "netflix",
    "spotify",
    "ebay",
    "alibaba",
    "aliexpress",
    "dropbox",
    "adobe",
    "docusign",
    "yahoo",
    "aol",
    "chase",
    "wellsfargo",
    "bankofamerica",
    "citibank",
    "hsbc",
    "barclays",
    "santander",
    "natwest",
    "lloyds",
    "americanexpress",
    "amex",
    "mastercard",
    "visa",
    "steam",
    "steamcommunity",
    "roblox",
    "binance",
    "coinbase",
    "blockchain",
    "metamask",
    "dhl",
    "fedex",
    "usps",
    "ups",
    "booking",
    "airbnb",
    "github",
    "wordpress",
    "orange",
    "wetransfer",
    "onedrive",
    "sharepoint",
    "itunes",
];

/// TLDs statistically associated with abuse (Spamhaus, Blue Coat and
/// statistical-report listings).
pub const SUSPICIOUS_TLDS: &[&str] = &[
    "fit", "tk", "gp", "ga", "work", "ml", "date", "wang", "men", "icu", "online", "click",
    "country", "stream", "download", "xin", "racing", "jetzt", "ren", "mom", "party", "review",
    "trade", "accountants", "science", "ninja", "xyz", "faith", "zip", "cricket", "win",
    "accountant", "realtor", "top", "christmas", "gdn", "link", "asia", "club", "la", "ae",
    "exposed", "pe", "go.id", "rs", "k12.pa.us", "or.kr", "ce.ke", "audio", "gob.pe", "gov.az",
    "website", "bj", "mx", "media", "sa.gov.au",
];

/// URL shortener hosts.
pub const SHORTENER_HOSTS: &[&str] = &[
    "bit.ly", "goo.gl", "shorte.st", "go2l.ink", "x.co", "ow.ly", "t.co", "tinyurl.com",
    "tr.im", "is.gd", "cli.gs", "yfrog.com", "migre.me", "ff.im", "tiny.cc", "url4.eu",
    "twit.ac", "su.pr", "twurl.nl", "snipurl.com", "short.to", "budurl.com", "ping.fm",
    "post.ly", "just.as", "bkite.com", "snipr.com", "fic.kr", "loopt.us", "doiop.com",
    "short.ie", "kl.am", "wp.me", "rubyurl.com", "om.ly", "to.ly", "bit.do", "lnkd.in",
    "db.tt", "qr.ae", "adf.ly", "bitly.com", "cur.lv", "ity.im", "q.gs", "po.st", "bc.vc",
    "twitthis.com", "u.to", "j.mp", "buzurl.com", "cutt.us", "u.bb", "yourls.org",
    "prettylinkpro.com", "scrnch.me", "filoops.info", "vzturl.com", "qr.net", "1url.com",
    "tweez.me", "v.gd", "link.zip.net", "rb.gy", "cutt.ly", "shorturl.at", "rebrand.ly",
];

/// Keywords that hint at credential-harvesting pages or kit paths.
pub const PHISH_HINTS: &[&str] = &[
    "wp", "login", "includes", "admin", "content", "site", "images", "js", "alibaba", "css",
    "myaccount", "dropbox", "themes", "plugins", "signin", "view", "secure", "account",
    "update", "verify", "banking", "confirm", "webscr",
];

/// Free-hosting and dynamic-DNS hosts that dominate phishing reports.
pub const REPORTED_HOSTS: &[&str] = &[
    "at.ua",
    "usa.cc",
    "baltazarpresentes.com.br",
    "pe.hu",
    "esy.es",
    "hol.es",
    "sweddy.com",
    "myjino.ru",
    "96.lt",
    "ow.ly",
];

/// Addresses that repeatedly host reported phishing sites.
pub const REPORTED_IPS: &[&str] = &[
    "146.112.61.108", "213.174.157.151", "121.50.168.88", "192.185.217.116", "78.46.211.158",
    "181.174.165.13", "46.242.145.103", "121.50.168.40", "83.125.22.219", "46.242.145.98",
    "107.151.148.44", "107.151.148.107", "64.70.19.203", "199.184.144.27", "107.151.148.108",
    "107.151.148.109", "119.28.52.61", "54.83.43.69", "52.69.166.231", "216.58.192.225",
    "118.184.25.86", "67.208.74.71", "23.253.126.58", "104.239.157.210", "175.126.123.219",
    "141.8.224.221", "10.10.10.10", "43.229.108.32", "103.232.215.140", "69.172.201.153",
    "216.218.185.162", "54.225.104.146", "103.243.24.98", "199.59.243.120", "31.170.160.61",
    "213.19.128.77", "62.113.226.131", "208.100.26.234", "195.16.127.102", "195.16.127.157",
    "34.196.13.28", "103.224.212.222", "172.217.4.225", "54.72.9.51", "192.64.147.141",
    "198.200.56.183", "23.253.164.103", "52.48.191.26", "52.214.197.72", "87.98.255.18",
    "209.99.17.27", "216.38.62.18", "104.130.124.96", "47.89.58.141", "54.86.225.156",
    "54.82.156.19", "37.157.192.102", "204.11.56.48", "110.34.231.42",
];

/// Ports a web page is expected to be served on.
pub const STANDARD_WEB_PORTS: &[u16] = &[80, 443];
