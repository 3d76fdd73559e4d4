use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::extract::schema::extract_schema;

/// Upper bound on returned candidates; pages easily carry hundreds of imgs.
const MAX_CANDIDATES: usize = 12;

// Filename/path substrings that mark an image as chrome rather than food.
const EXCLUDE_KEYWORDS: &[&str] = &[
    "pixel", "track", "avatar", "logo", "icon", "share", "button", "sponsor", "gravatar",
    "emoji", "badge", "spacer", "placeholder", "/ads/", "/ad/", "advert",
];

static OG_IMAGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r#"(?is)<meta\b[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#,
        )
        .unwrap(),
        Regex::new(
            r#"(?is)<meta\b[^>]*content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["']"#,
        )
        .unwrap(),
    ]
});
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<img\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
static SRCSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bsrcset\s*=\s*["']([^"']+)["']"#).unwrap());
// 1x1.gif, 300x60.png: dimension-suffixed assets are banners and trackers
static SIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+x\d+\.").unwrap());

/// Ranked photo candidates for a page: structured-data images first, then
/// the Open Graph image, then every plausible `<img>`/`srcset` source.
/// Discovery order is the ranking; duplicates collapse to first sighting.
pub fn extract_image_candidates(html: &str, base_url: &str) -> Vec<String> {
    let base = Url::parse(base_url).ok();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let push = |raw: &str, seen: &mut HashSet<String>, out: &mut Vec<String>| {
        if let Some(resolved) = resolve(raw, base.as_ref()) {
            if seen.insert(resolved.clone()) {
                out.push(resolved);
            }
        }
    };

    if let Some(schema) = extract_schema(html) {
        if let Some(image) = schema.get("image") {
            for url in schema_image_urls(image) {
                push(&url, &mut seen, &mut candidates);
            }
        }
    }

    for re in OG_IMAGE_RES.iter() {
        if let Some(caps) = re.captures(html) {
            push(&caps[1], &mut seen, &mut candidates);
        }
    }

    for caps in IMG_SRC_RE.captures_iter(html) {
        let src = &caps[1];
        if !is_excluded(src) {
            push(src, &mut seen, &mut candidates);
        }
    }

    for caps in SRCSET_RE.captures_iter(html) {
        // First entry of the set; the rest are density/width variants.
        let first = caps[1]
            .split(',')
            .next()
            .and_then(|entry| entry.split_whitespace().next());
        if let Some(src) = first {
            if !is_excluded(src) {
                push(src, &mut seen, &mut candidates);
            }
        }
    }

    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// The schema `image` field: a URL string, an ImageObject, or an array of
/// either.
fn schema_image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items.iter().flat_map(schema_image_urls).collect(),
        Value::Object(obj) => obj
            .get("url")
            .map(schema_image_urls)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn is_excluded(src: &str) -> bool {
    let lower = src.to_lowercase();
    lower.starts_with("data:")
        || lower.ends_with(".svg")
        || lower.ends_with(".gif")
        || SIZE_SUFFIX_RE.is_match(&lower)
        || EXCLUDE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Absolute URL for a candidate; relative paths resolve against the page
/// URL, unresolvable ones are dropped silently.
fn resolve(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    base.and_then(|b| b.join(raw).ok()).map(|u| u.to_string())
}

// ── Tests ──
