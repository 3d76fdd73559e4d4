use std::sync::LazyLock;

use regex::Regex;

// ISO 8601 durations as structured data carries them: PT10M, PT1H30M, P1DT2H.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?T?(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap()
});

/// Render a structured duration as the free-text form used everywhere else
/// in the document ("10 min", "1 uur 30 min"). Input that doesn't match the
/// pattern is returned unchanged.
pub fn format_duration(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(caps) = DURATION_RE.captures(trimmed) else {
        return raw.to_string();
    };

    let days = caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok());
    let hours = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok());
    let minutes = caps.get(3).and_then(|m| m.as_str().parse::<u64>().ok());
    // Seconds are matched so PT90S still counts as a duration, but a recipe
    // never renders them.
    let seconds = caps.get(4).is_some();

    let mut parts = Vec::new();
    if let Some(d) = days.filter(|d| *d > 0) {
        parts.push(format!("{} {}", d, if d == 1 { "dag" } else { "dagen" }));
    }
    if let Some(h) = hours.filter(|h| *h > 0) {
        parts.push(format!("{} uur", h));
    }
    if let Some(m) = minutes.filter(|m| *m > 0) {
        parts.push(format!("{} min", m));
    }

    if parts.is_empty() {
        if seconds || days.is_some() || hours.is_some() || minutes.is_some() {
            // A real duration of under a minute (or all-zero groups)
            return "1 min".to_string();
        }
        return raw.to_string();
    }
    parts.join(" ")
}

// ── Tests ──
