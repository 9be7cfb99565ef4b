//! Typed accessor over the client collector's JSON bundle
//!
//! The collector posts a deeply nested object whose every field is
//! optional. Rules read it through dot-separated paths so each check is
//! a pure defensive read; absence never panics, it is just `None`.

use serde_json::Value;

/// Read-only view over a collector bundle.
#[derive(Debug, Clone)]
pub struct BrowserBundle {
    root: Value,
}

impl BrowserBundle {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Walk a dot-separated path; `None` on any missing segment.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// True when the path resolves to any value, including null.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// True when the path resolves to a JSON object.
    pub fn has_object(&self, path: &str) -> bool {
        self.get(path).map(Value::is_object).unwrap_or(false)
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn f64_at(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Count at a path that may be either a number or an array.
    pub fn count_at(&self, path: &str) -> Option<u64> {
        match self.get(path)? {
            Value::Number(n) => n.as_u64(),
            Value::Array(items) => Some(items.len() as u64),
            _ => None,
        }
    }

    /// A non-empty string at the path.
    pub fn nonempty_str_at(&self, path: &str) -> Option<&str> {
        self.str_at(path).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> BrowserBundle {
        BrowserBundle::new(json!({
            "screen": {"width": 1920, "height": 1080},
            "navigator": {
                "userAgent": "Mozilla/5.0",
                "webdriver": false,
                "languages": ["en-US", "en"],
            },
            "webgl": {"renderer": ""},
            "jsChallenge": {"valid": true, "solveTime": 42},
        }))
    }

    #[test]
    fn test_nested_reads() {
        let b = bundle();
        assert_eq!(b.f64_at("screen.width"), Some(1920.0));
        assert_eq!(b.str_at("navigator.userAgent"), Some("Mozilla/5.0"));
        assert_eq!(b.bool_at("navigator.webdriver"), Some(false));
        assert_eq!(b.bool_at("jsChallenge.valid"), Some(true));
    }

    #[test]
    fn test_missing_paths_are_none() {
        let b = bundle();
        assert_eq!(b.f64_at("screen.colorDepth"), None);
        assert_eq!(b.str_at("nope.deeper.still"), None);
        assert!(!b.has("timezone"));
        assert!(b.has("screen"));
        assert!(b.has_object("screen"));
        assert!(!b.has_object("screen.width"));
    }

    #[test]
    fn test_count_accepts_number_or_array() {
        let b = bundle();
        assert_eq!(b.count_at("navigator.languages"), Some(2));
        assert_eq!(b.count_at("jsChallenge.solveTime"), Some(42));
        assert_eq!(b.count_at("screen"), None);
    }

    #[test]
    fn test_nonempty_str_filters_empty() {
        let b = bundle();
        assert_eq!(b.nonempty_str_at("webgl.renderer"), None);
        assert_eq!(b.nonempty_str_at("navigator.userAgent"), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let b = bundle();
        assert_eq!(b.str_at("screen.width"), None);
        assert_eq!(b.bool_at("navigator.userAgent"), None);
    }
}
