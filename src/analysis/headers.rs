//! Header evaluator
//!
//! Stateless scoring of request headers alone, applied to every request
//! that is neither a static asset, a document fetch, nor the analysis
//! endpoint (e.g. curl hitting an API route directly).

use hyper::HeaderMap;

use super::{Signal, SignalCategory, Verdict};

/// Automation and HTTP-library identifiers, matched case-insensitively
/// as substrings of the User-Agent. Order matters: the first match is
/// named in the signal reason.
pub const BOT_UA_PATTERNS: &[&str] = &[
    "python",
    "curl",
    "wget",
    "axios",
    "node-fetch",
    "go-http",
    "java/",
    "libwww",
    "httpunit",
    "nutch",
    "phpcrawl",
    "msnbot",
    "scrapy",
    "mechanize",
    "phantom",
    "casper",
    "selenium",
    "webdriver",
    "chrome-lighthouse",
    "pingdom",
    "phantomjs",
    "headlesschrome",
    "httpie",
    "postman",
    "insomnia",
    "rest-client",
    "okhttp",
    "apache-http",
];

/// Crawler identifiers seen in archive and SEO traffic.
pub const CRAWLER_UA_PATTERNS: &[&str] = &[
    "heritrix",
    "httrack",
    "teoma",
    "gigablast",
    "ia_archiver",
    "ezooms",
    "linkdex",
    "mj12bot",
    "ahrefsbot",
    "semrushbot",
    "blexbot",
];

/// First bot or crawler pattern contained in the User-Agent, if any.
pub fn match_bot_pattern(user_agent: &str) -> Option<&'static str> {
    let ua = user_agent.to_lowercase();
    BOT_UA_PATTERNS
        .iter()
        .chain(CRAWLER_UA_PATTERNS.iter())
        .find(|pattern| ua.contains(*pattern))
        .copied()
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn has_header(headers: &HeaderMap, name: &str) -> bool {
    headers.contains_key(name)
}

/// Score request headers into a verdict. Twelve rules, always all
/// executed, so `summary.totalChecks` is stable for this path.
pub fn evaluate_headers(headers: &HeaderMap) -> Verdict {
    let ua = header_str(headers, "user-agent");
    let mut signals = Vec::with_capacity(12);

    signals.push(Signal::new(
        "noUserAgent",
        30,
        SignalCategory::Headers,
        ua.is_none(),
        "No User-Agent header",
        "User-Agent header present",
    ));

    let ua_len = ua.map(str::len).unwrap_or(0);
    signals.push(Signal::new(
        "shortUserAgent",
        15,
        SignalCategory::Headers,
        ua_len > 0 && ua_len < 20,
        format!("User-Agent unusually short ({} chars)", ua_len),
        "User-Agent has a plausible length",
    ));

    let bot_match = ua.and_then(match_bot_pattern);
    signals.push(Signal::new(
        "botUserAgent",
        30,
        SignalCategory::Headers,
        bot_match.is_some(),
        format!(
            "User-Agent matches bot pattern '{}'",
            bot_match.unwrap_or_default()
        ),
        "User-Agent matches no known bot pattern",
    ));

    let headless = ua
        .map(|s| s.to_lowercase().contains("headless"))
        .unwrap_or(false);
    signals.push(Signal::new(
        "headlessUA",
        25,
        SignalCategory::Headers,
        headless,
        "User-Agent identifies a headless browser",
        "User-Agent does not mention headless",
    ));

    let accept = header_str(headers, "accept");
    signals.push(Signal::new(
        "noAcceptHeader",
        10,
        SignalCategory::Headers,
        accept.is_none(),
        "No Accept header",
        "Accept header present",
    ));

    let non_browser_accept = accept
        .map(|a| !a.contains("text/html") && !a.contains("*/*"))
        .unwrap_or(false);
    signals.push(Signal::new(
        "nonBrowserAccept",
        10,
        SignalCategory::Headers,
        non_browser_accept,
        "Accept header lacks text/html and */*",
        "Accept header looks like a browser's",
    ));

    signals.push(Signal::new(
        "noAcceptLanguage",
        15,
        SignalCategory::Headers,
        !has_header(headers, "accept-language"),
        "No Accept-Language header",
        "Accept-Language header present",
    ));

    signals.push(Signal::new(
        "noAcceptEncoding",
        10,
        SignalCategory::Headers,
        !has_header(headers, "accept-encoding"),
        "No Accept-Encoding header",
        "Accept-Encoding header present",
    ));

    let no_sec_fetch = !has_header(headers, "sec-fetch-dest")
        && !has_header(headers, "sec-fetch-mode")
        && !has_header(headers, "sec-fetch-site");
    signals.push(Signal::new(
        "noSecFetch",
        15,
        SignalCategory::Headers,
        no_sec_fetch,
        "No Sec-Fetch-* headers",
        "Sec-Fetch-* headers present",
    ));

    signals.push(Signal::new(
        "noSecChUa",
        8,
        SignalCategory::Headers,
        !has_header(headers, "sec-ch-ua"),
        "No Sec-CH-UA header",
        "Sec-CH-UA header present",
    ));

    signals.push(Signal::new(
        "noConnection",
        5,
        SignalCategory::Headers,
        !has_header(headers, "connection"),
        "No Connection header",
        "Connection header present",
    ));

    signals.push(Signal::new(
        "noUpgradeInsecure",
        5,
        SignalCategory::Headers,
        !has_header(headers, "upgrade-insecure-requests"),
        "No Upgrade-Insecure-Requests header",
        "Upgrade-Insecure-Requests header present",
    ));

    Verdict::from_signals(signals)
}
