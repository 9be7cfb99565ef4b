//! Full signal evaluator
//!
//! Scores a complete evidence bundle (collector JSON + request headers)
//! against the weighted rule set. Every rule always contributes one
//! entry to `allSignals`; conditional preconditions (Chrome-gated
//! checks, the essential-data guard) fold into the detection trigger so
//! the rule count is stable across inputs.

use hyper::HeaderMap;

use super::bundle::BrowserBundle;
use super::headers::{header_str, match_bot_pattern};
use super::{Signal, SignalCategory, Verdict};

/// Number of rules executed on the full analysis path.
pub const RULE_COUNT: usize = 71;

/// Expected value of `Math.acos(0.5)` in a conforming JS engine.
const ACOS_HALF: f64 = 1.047_197_551_196_597_9;

/// Renderer substrings that indicate a software rasterizer.
const SOFTWARE_RENDERERS: &[&str] = &["swiftshader", "llvmpipe", "mesa"];

/// The analysis endpoint short-circuits to the code-1005 verdict unless
/// the bundle carries a non-zero screen, a user agent, a window object,
/// and an explicitly valid JS challenge outcome.
pub fn prerequisites_met(bundle: &BrowserBundle) -> bool {
    bundle.f64_at("screen.width").unwrap_or(0.0) > 0.0
        && bundle.nonempty_str_at("navigator.userAgent").is_some()
        && bundle.has_object("window")
        && bundle.bool_at("jsChallenge.valid") == Some(true)
}

/// Pre-computed facts shared by many rules.
struct Evidence<'a> {
    bundle: &'a BrowserBundle,
    headers: &'a HeaderMap,
    header_ua: Option<&'a str>,
    /// Bundle UA, falling back to the header UA.
    ua: String,
    is_chrome: bool,
    is_mobile: bool,
    has_browser_data: bool,
}

impl<'a> Evidence<'a> {
    fn gather(bundle: &'a BrowserBundle, headers: &'a HeaderMap) -> Self {
        let header_ua = header_str(headers, "user-agent");
        let ua = bundle
            .str_at("navigator.userAgent")
            .or(header_ua)
            .unwrap_or("")
            .to_lowercase();

        let is_chrome = ua.contains("chrome");
        let is_mobile = ["mobile", "android", "iphone", "ipad"]
            .iter()
            .any(|marker| ua.contains(marker));

        let has_browser_data = bundle.has_object("screen")
            || bundle.has_object("window")
            || bundle.has_object("navigator");

        Self {
            bundle,
            headers,
            header_ua,
            ua,
            is_chrome,
            is_mobile,
            has_browser_data,
        }
    }

    fn feature_enabled(&self, name: &str) -> bool {
        self.bundle.bool_at(&format!("features.{}", name)) == Some(true)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }
}

/// Run the full rule set and assemble the verdict.
pub fn evaluate_bundle(bundle: &BrowserBundle, headers: &HeaderMap) -> Verdict {
    let ev = Evidence::gather(bundle, headers);

    let mut signals = Vec::with_capacity(RULE_COUNT);
    automation_signals(&ev, &mut signals);
    essential_signals(&ev, &mut signals);
    feature_signals(&ev, &mut signals);
    webgl_signals(&ev, &mut signals);
    screen_signals(&ev, &mut signals);
    consistency_signals(&ev, &mut signals);
    timing_signals(&ev, &mut signals);
    fingerprint_signals(&ev, &mut signals);
    header_signals(&ev, &mut signals);

    debug_assert_eq!(signals.len(), RULE_COUNT);

    Verdict::from_signals(signals)
}

fn automation_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Automation;

    let webdriver = ev.bundle.bool_at("navigator.webdriver") == Some(true)
        || ev.feature_enabled("webdriver");
    out.push(Signal::new(
        "webdriver",
        30,
        Automation,
        webdriver,
        "navigator.webdriver is set",
        "navigator.webdriver not set",
    ));

    out.push(Signal::new(
        "phantom",
        30,
        Automation,
        ev.feature_enabled("phantom"),
        "PhantomJS markers present",
        "No PhantomJS markers",
    ));

    out.push(Signal::new(
        "nightmare",
        30,
        Automation,
        ev.feature_enabled("nightmare"),
        "Nightmare markers present",
        "No Nightmare markers",
    ));

    out.push(Signal::new(
        "selenium",
        30,
        Automation,
        ev.feature_enabled("selenium"),
        "Selenium markers present",
        "No Selenium markers",
    ));

    out.push(Signal::new(
        "domAutomation",
        30,
        Automation,
        ev.feature_enabled("domAutomation"),
        "domAutomation controller present",
        "No domAutomation controller",
    ));

    out.push(Signal::new(
        "headlessUA",
        25,
        Automation,
        ev.ua.contains("headless"),
        "User agent identifies a headless browser",
        "User agent does not mention headless",
    ));

    out.push(Signal::new(
        "noBrowserData",
        50,
        Automation,
        !ev.has_browser_data,
        "Bundle has no screen, window or navigator data",
        "Browser environment data present",
    ));

    out.push(Signal::new(
        "jsChallengeFailed",
        35,
        Automation,
        ev.bundle.bool_at("jsChallenge.valid") != Some(true),
        "JS challenge missing or failed",
        "JS challenge solved",
    ));
}

/// The four essential-data rules are suppressed while `noBrowserData`
/// already covers total absence.
fn essential_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::BrowserFeatures;

    let guard = ev.has_browser_data;

    out.push(Signal::new(
        "noScreenData",
        25,
        BrowserFeatures,
        guard && !ev.bundle.has_object("screen"),
        "No screen data collected",
        "Screen data collected",
    ));

    out.push(Signal::new(
        "noWindowData",
        20,
        BrowserFeatures,
        guard && !ev.bundle.has_object("window"),
        "No window data collected",
        "Window data collected",
    ));

    out.push(Signal::new(
        "noNavigatorData",
        25,
        BrowserFeatures,
        guard && !ev.bundle.has_object("navigator"),
        "No navigator data collected",
        "Navigator data collected",
    ));

    out.push(Signal::new(
        "noTimezoneData",
        15,
        BrowserFeatures,
        guard && !ev.bundle.has_object("timezone"),
        "No timezone data collected",
        "Timezone data collected",
    ));
}

fn feature_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::BrowserFeatures;

    out.push(Signal::new(
        "noPlugins",
        15,
        BrowserFeatures,
        ev.bundle.count_at("plugins.length") == Some(0),
        "Zero browser plugins",
        "Browser plugins present",
    ));

    let languages = ev
        .bundle
        .count_at("navigator.languages")
        .unwrap_or(0);
    out.push(Signal::new(
        "noLanguages",
        15,
        BrowserFeatures,
        ev.bundle.has_object("navigator") && languages == 0,
        "navigator.languages is empty",
        "navigator.languages populated",
    ));

    out.push(Signal::new(
        "missingChrome",
        20,
        BrowserFeatures,
        ev.is_chrome && !ev.feature_enabled("windowChrome"),
        "Chrome user agent without window.chrome",
        "window.chrome consistent with user agent",
    ));

    out.push(Signal::new(
        "noPermissionsAPI",
        10,
        BrowserFeatures,
        !ev.feature_enabled("permissionsQuery"),
        "Permissions API unavailable",
        "Permissions API available",
    ));

    out.push(Signal::new(
        "noNotifications",
        5,
        BrowserFeatures,
        !ev.feature_enabled("notifications"),
        "Notification API unavailable",
        "Notification API available",
    ));

    out.push(Signal::new(
        "noWebRTC",
        8,
        BrowserFeatures,
        !ev.feature_enabled("webRTC"),
        "WebRTC unavailable",
        "WebRTC available",
    ));

    out.push(Signal::new(
        "noIndexedDB",
        8,
        BrowserFeatures,
        !ev.feature_enabled("indexedDB"),
        "IndexedDB unavailable",
        "IndexedDB available",
    ));

    out.push(Signal::new(
        "noLocalStorage",
        10,
        BrowserFeatures,
        !ev.feature_enabled("localStorage"),
        "localStorage unavailable",
        "localStorage available",
    ));

    out.push(Signal::new(
        "noSessionStorage",
        10,
        BrowserFeatures,
        !ev.feature_enabled("sessionStorage"),
        "sessionStorage unavailable",
        "sessionStorage available",
    ));

    let no_battery = !ev.bundle.has_object("battery") || ev.bundle.has("battery.error");
    out.push(Signal::new(
        "noBattery",
        2,
        BrowserFeatures,
        no_battery,
        "Battery API unavailable",
        "Battery API available",
    ));

    let media_present =
        ev.bundle.has_object("mediaDevices") && !ev.bundle.has("mediaDevices.error");
    out.push(Signal::new(
        "noMediaDevices",
        5,
        BrowserFeatures,
        !media_present,
        "Media devices unavailable",
        "Media devices enumerated",
    ));

    let device_count = ev.bundle.f64_at("mediaDevices.audioinput").unwrap_or(0.0)
        + ev.bundle.f64_at("mediaDevices.audiooutput").unwrap_or(0.0)
        + ev.bundle.f64_at("mediaDevices.videoinput").unwrap_or(0.0);
    out.push(Signal::new(
        "zeroMediaDevices",
        8,
        BrowserFeatures,
        media_present && device_count == 0.0,
        "Media devices enumerated but none found",
        "At least one media device found",
    ));

    out.push(Signal::new(
        "noSpeechVoices",
        3,
        BrowserFeatures,
        ev.bundle.f64_at("speechVoices.count") == Some(0.0),
        "Zero speech synthesis voices",
        "Speech synthesis voices present",
    ));

    out.push(Signal::new(
        "noConnectionAPI",
        5,
        BrowserFeatures,
        ev.is_chrome && !ev.bundle.has("connection"),
        "Chrome without the Network Information API",
        "Network Information API present",
    ));

    let fonts = ev.bundle.count_at("fonts.length");
    out.push(Signal::new(
        "noFonts",
        10,
        BrowserFeatures,
        fonts == Some(0),
        "No fonts detected",
        "Fonts detected",
    ));

    out.push(Signal::new(
        "fewFonts",
        5,
        BrowserFeatures,
        matches!(fonts, Some(1..=4)),
        "Unusually small font set",
        "Normal font set size",
    ));

    let no_canvas =
        ev.bundle.nonempty_str_at("canvas.hash").is_none() || ev.bundle.has("canvas.error");
    out.push(Signal::new(
        "noCanvasHash",
        8,
        BrowserFeatures,
        no_canvas,
        "Canvas fingerprint unavailable",
        "Canvas fingerprint computed",
    ));

    out.push(Signal::new(
        "audioError",
        5,
        BrowserFeatures,
        ev.bundle.has("audio.error"),
        "Audio context probing failed",
        "Audio context probed",
    ));

    out.push(Signal::new(
        "noPerformanceMemory",
        5,
        BrowserFeatures,
        ev.is_chrome && !ev.bundle.has("performance.jsHeapSizeLimit"),
        "Chrome without performance.memory",
        "performance.memory present",
    ));

    out.push(Signal::new(
        "documentHidden",
        8,
        BrowserFeatures,
        ev.bundle.bool_at("document.hidden") == Some(true),
        "Document hidden during collection",
        "Document visible during collection",
    ));

    out.push(Signal::new(
        "noGamepadAPI",
        2,
        BrowserFeatures,
        ev.bundle.bool_at("gamepads.supported") != Some(true),
        "Gamepad API unavailable",
        "Gamepad API available",
    ));

    out.push(Signal::new(
        "keyboardAPIError",
        5,
        BrowserFeatures,
        ev.bundle.has("keyboard.error"),
        "Keyboard API probing failed",
        "Keyboard API probed",
    ));

    out.push(Signal::new(
        "noServiceWorker",
        3,
        BrowserFeatures,
        !ev.feature_enabled("serviceWorker"),
        "Service workers unavailable",
        "Service workers available",
    ));

    out.push(Signal::new(
        "noWebAssembly",
        5,
        BrowserFeatures,
        !ev.feature_enabled("WebAssembly"),
        "WebAssembly unavailable",
        "WebAssembly available",
    ));

    out.push(Signal::new(
        "noBluetooth",
        2,
        BrowserFeatures,
        !ev.feature_enabled("bluetooth"),
        "Web Bluetooth unavailable",
        "Web Bluetooth available",
    ));

    out.push(Signal::new(
        "noUSB",
        2,
        BrowserFeatures,
        !ev.feature_enabled("usb"),
        "WebUSB unavailable",
        "WebUSB available",
    ));

    out.push(Signal::new(
        "noCredentials",
        3,
        BrowserFeatures,
        !ev.feature_enabled("credentials"),
        "Credentials API unavailable",
        "Credentials API available",
    ));
}

fn webgl_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Webgl;

    let renderer = ev
        .bundle
        .nonempty_str_at("webgl.unmaskedRenderer")
        .or_else(|| ev.bundle.nonempty_str_at("webgl.renderer"));
    let vendor = ev
        .bundle
        .nonempty_str_at("webgl.unmaskedVendor")
        .or_else(|| ev.bundle.nonempty_str_at("webgl.vendor"));
    let webgl_ok = ev.bundle.has_object("webgl") && !ev.bundle.has("webgl.error");

    let software_renderer = renderer
        .map(|r| {
            let r = r.to_lowercase();
            SOFTWARE_RENDERERS.iter().any(|marker| r.contains(marker))
        })
        .unwrap_or(false);
    out.push(Signal::new(
        "softwareRenderer",
        20,
        Webgl,
        software_renderer,
        format!(
            "Software WebGL renderer: {}",
            renderer.unwrap_or_default()
        ),
        "Hardware WebGL renderer",
    ));

    out.push(Signal::new(
        "noWebGLRenderer",
        10,
        Webgl,
        webgl_ok && renderer.is_none(),
        "WebGL context without a renderer string",
        "WebGL renderer string present",
    ));

    let software_vendor = vendor
        .map(|v| {
            let v = v.to_lowercase();
            v.contains("brian paul") || v.contains("mesa")
        })
        .unwrap_or(false);
    out.push(Signal::new(
        "softwareVendor",
        15,
        Webgl,
        software_vendor,
        format!("Software WebGL vendor: {}", vendor.unwrap_or_default()),
        "Hardware WebGL vendor",
    ));

    out.push(Signal::new(
        "noWebGLExtensions",
        8,
        Webgl,
        webgl_ok && ev.bundle.count_at("webgl.extensions").unwrap_or(0) == 0,
        "WebGL context exposes no extensions",
        "WebGL extensions present",
    ));

    let no_webgl2 = ev.is_chrome
        && (ev.bundle.has("webgl2.error") || !ev.bundle.has_object("webgl2"));
    out.push(Signal::new(
        "noWebGL2",
        3,
        Webgl,
        no_webgl2,
        "Chrome without a WebGL2 context",
        "WebGL2 context available",
    ));
}

fn screen_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Screen;

    let width = ev.bundle.f64_at("screen.width");
    let height = ev.bundle.f64_at("screen.height");

    out.push(Signal::new(
        "zeroScreenSize",
        15,
        Screen,
        width == Some(0.0) || height == Some(0.0),
        "Screen reports zero width or height",
        "Screen has non-zero dimensions",
    ));

    out.push(Signal::new(
        "defaultScreenSize",
        10,
        Screen,
        width == Some(800.0) && height == Some(600.0),
        "Screen is exactly 800x600 (headless default)",
        "Screen is not the headless default size",
    ));

    let inner_w = ev.bundle.f64_at("window.innerWidth");
    let inner_h = ev.bundle.f64_at("window.innerHeight");
    let outer_w = ev.bundle.f64_at("window.outerWidth");
    let outer_h = ev.bundle.f64_at("window.outerHeight");
    let no_window_chrome = match (inner_w, inner_h, outer_w, outer_h) {
        (Some(iw), Some(ih), Some(ow), Some(oh)) => iw == ow && iw > 0.0 && ih == oh,
        _ => false,
    };
    out.push(Signal::new(
        "noWindowChrome",
        10,
        Screen,
        no_window_chrome,
        "Window has no chrome (inner size equals outer size)",
        "Window chrome present",
    ));

    let dpr = ev.bundle.f64_at("screen.devicePixelRatio");
    out.push(Signal::new(
        "unusualDPR",
        5,
        Screen,
        dpr.map(|d| !(0.5..=4.0).contains(&d)).unwrap_or(false),
        "Unusual device pixel ratio",
        "Plausible device pixel ratio",
    ));

    let depth = ev.bundle.f64_at("screen.colorDepth");
    out.push(Signal::new(
        "lowColorDepth",
        5,
        Screen,
        depth.map(|d| d < 24.0).unwrap_or(false),
        "Color depth below 24 bits",
        "Normal color depth",
    ));
}

/// Primary subtag of a BCP-47 language tag ("en-US" -> "en").
fn primary_language_tag(tag: &str) -> String {
    tag.split(['-', ';', ',']).next().unwrap_or("").trim().to_lowercase()
}

fn consistency_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Consistency;

    let touch_points = ev.bundle.f64_at("touch.maxTouchPoints");

    out.push(Signal::new(
        "mobileNoTouch",
        15,
        Consistency,
        ev.is_mobile && touch_points == Some(0.0),
        "Mobile user agent without touch support",
        "Touch support consistent with user agent",
    ));

    out.push(Signal::new(
        "desktopTouchMismatch",
        5,
        Consistency,
        !ev.is_mobile && touch_points.map(|t| t > 0.0).unwrap_or(false),
        "Desktop user agent reporting touch points",
        "No desktop touch mismatch",
    ));

    let app_name = ev.bundle.str_at("navigator.appName");
    let product = ev.bundle.str_at("navigator.product");
    out.push(Signal::new(
        "navigatorInconsistency",
        5,
        Consistency,
        app_name == Some("Netscape") && product != Some("Gecko"),
        "navigator.appName and navigator.product disagree",
        "navigator.appName consistent with product",
    ));

    let nav_ua = ev.bundle.str_at("navigator.userAgent");
    let ua_mismatch = match (ev.header_ua, nav_ua) {
        (Some(h), Some(n)) => h != n,
        _ => false,
    };
    out.push(Signal::new(
        "uaMismatch",
        20,
        Consistency,
        ua_mismatch,
        "Header User-Agent differs from navigator.userAgent",
        "Header and navigator user agents match",
    ));

    let accept_language = header_str(ev.headers, "accept-language");
    let nav_language = ev.bundle.str_at("navigator.language");
    let language_mismatch = match (accept_language, nav_language) {
        (Some(header), Some(nav)) => {
            primary_language_tag(header) != primary_language_tag(nav)
        }
        _ => false,
    };
    out.push(Signal::new(
        "languageMismatch",
        10,
        Consistency,
        language_mismatch,
        "Accept-Language disagrees with navigator.language",
        "Languages consistent",
    ));

    let platform = ev
        .bundle
        .str_at("navigator.platform")
        .unwrap_or("")
        .to_lowercase();
    let platform_mismatch = if ev.ua.contains("windows") {
        !platform.contains("win")
    } else if ev.ua.contains("mac os") && !ev.is_mobile {
        !platform.contains("mac")
    } else if ev.ua.contains("linux") && !ev.is_mobile {
        !platform.contains("linux")
    } else {
        false
    };
    out.push(Signal::new(
        "platformMismatch",
        15,
        Consistency,
        ev.bundle.has_object("navigator") && platform_mismatch,
        "User agent OS disagrees with navigator.platform",
        "User agent OS consistent with platform",
    ));

    let timezone = ev.bundle.str_at("timezone.timezone");
    let offset = ev.bundle.f64_at("timezone.offset");
    let timezone_inconsistent = match (timezone, offset) {
        (Some(tz), Some(off)) => {
            (tz.starts_with("America/") && off < 0.0)
                || (tz.starts_with("Europe/") && off > 60.0)
        }
        _ => false,
    };
    out.push(Signal::new(
        "timezoneInconsistent",
        10,
        Consistency,
        timezone_inconsistent,
        "Timezone name disagrees with UTC offset",
        "Timezone name consistent with offset",
    ));

    let hints_platform = ev.bundle.str_at("userAgentData.platform");
    let hints_mismatch = platform.contains("win")
        && hints_platform
            .map(|p| !p.to_lowercase().contains("win"))
            .unwrap_or(false);
    out.push(Signal::new(
        "clientHintsMismatch",
        15,
        Consistency,
        hints_mismatch,
        "navigator.platform disagrees with userAgentData.platform",
        "Client hints consistent with platform",
    ));

    let vendor = ev.bundle.str_at("navigator.vendor").unwrap_or("");
    let is_safari = ev.ua.contains("safari") && !ev.is_chrome;
    let vendor_mismatch = (ev.is_chrome && !vendor.contains("Google"))
        || (is_safari && !vendor.contains("Apple"));
    out.push(Signal::new(
        "vendorMismatch",
        10,
        Consistency,
        ev.bundle.has_object("navigator") && vendor_mismatch,
        "navigator.vendor disagrees with the user agent",
        "navigator.vendor consistent with user agent",
    ));

    out.push(Signal::new(
        "productInconsistent",
        3,
        Consistency,
        ev.bundle.has_object("navigator") && product != Some("Gecko"),
        "navigator.product is not Gecko",
        "navigator.product is Gecko",
    ));
}

fn timing_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Timing;

    let challenge_valid = ev.bundle.bool_at("jsChallenge.valid") == Some(true);
    let solve_time = ev.bundle.f64_at("jsChallenge.solveTime");
    out.push(Signal::new(
        "jsChallengeTimingSuspicious",
        10,
        Timing,
        challenge_valid && solve_time.map(|t| t > 30_000.0).unwrap_or(false),
        "Challenge solved implausibly late",
        "Challenge solve time plausible",
    ));

    let navigation_start = ev.bundle.f64_at("performance.navigationStart");
    let load_event_end = ev.bundle.f64_at("performance.loadEventEnd");
    let load_delta = match (navigation_start, load_event_end) {
        (Some(start), Some(end)) if end > 0.0 => Some(end - start),
        _ => None,
    };

    out.push(Signal::new(
        "negativeLoadTime",
        20,
        Timing,
        load_delta.map(|d| d < 0.0).unwrap_or(false),
        "Page load time is negative",
        "Page load time non-negative",
    ));

    out.push(Signal::new(
        "zeroLoadTime",
        15,
        Timing,
        load_delta == Some(0.0),
        "Page load time is exactly zero",
        "Page load took measurable time",
    ));
}

fn fingerprint_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    let acos = ev.bundle.f64_at("math.acos");
    out.push(Signal::new(
        "mathInconsistent",
        10,
        SignalCategory::Fingerprint,
        acos.map(|v| (v - ACOS_HALF).abs() > 1e-7).unwrap_or(false),
        "Math.acos(0.5) deviates from the IEEE value",
        "Math.acos(0.5) matches the IEEE value",
    ));
}

/// Header-derived rules with the analysis-path weights. These coexist
/// with the standalone header evaluator, which keeps its own weights
/// for all other paths.
fn header_signals(ev: &Evidence, out: &mut Vec<Signal>) {
    use SignalCategory::Headers;

    out.push(Signal::new(
        "noAcceptLanguage",
        10,
        Headers,
        !ev.has_header("accept-language"),
        "No Accept-Language header",
        "Accept-Language header present",
    ));

    out.push(Signal::new(
        "noAcceptHeader",
        5,
        Headers,
        !ev.has_header("accept"),
        "No Accept header",
        "Accept header present",
    ));

    let bot_match = ev.header_ua.and_then(match_bot_pattern);
    out.push(Signal::new(
        "botUserAgent",
        25,
        Headers,
        bot_match.is_some(),
        format!(
            "User-Agent matches bot pattern '{}'",
            bot_match.unwrap_or_default()
        ),
        "User-Agent matches no known bot pattern",
    ));

    let ua_len = ev.header_ua.map(str::len).unwrap_or(0);
    out.push(Signal::new(
        "shortUserAgent",
        15,
        Headers,
        ua_len > 0 && ua_len < 20,
        format!("User-Agent unusually short ({} chars)", ua_len),
        "User-Agent has a plausible length",
    ));

    let no_sec_fetch = !ev.has_header("sec-fetch-dest")
        && !ev.has_header("sec-fetch-mode")
        && !ev.has_header("sec-fetch-site");
    out.push(Signal::new(
        "noSecFetch",
        8,
        Headers,
        no_sec_fetch,
        "No Sec-Fetch-* headers",
        "Sec-Fetch-* headers present",
    ));

    out.push(Signal::new(
        "noSecChUa",
        8,
        Headers,
        ev.is_chrome && !ev.has_header("sec-ch-ua"),
        "Chrome without Sec-CH-UA header",
        "Sec-CH-UA consistent with user agent",
    ));

    out.push(Signal::new(
        "noConnectionHeader",
        3,
        Headers,
        !ev.has_header("connection"),
        "No Connection header",
        "Connection header present",
    ));

    out.push(Signal::new(
        "noCacheControl",
        2,
        Headers,
        !ev.has_header("cache-control"),
        "No Cache-Control header",
        "Cache-Control header present",
    ));
}
