use std::sync::LazyLock;

use regex::Regex;

// Tags whose entire content is noise for text extraction.
const NOISE_TAGS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav", "aside"];

// Container tags checked for boilerplate class/id markers.
const BLOCK_TAGS: &[&str] = &["div", "section", "ul", "form", "iframe", "figure"];

// Substrings in a class or id that mark a block as boilerplate: ads,
// trackers, social widgets, cookie walls, overlays, comment threads.
const NOISE_CLASS_PATTERN: &str =
    "advert|banner|social|share|cookie|consent|popup|modal|overlay|sidebar|comment|newsletter|promo|track|widget|breadcrumb|related";

static NOISE_TAG_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOISE_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap()
        })
        .collect()
});

static NOISE_CLASS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BLOCK_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(
                r#"(?is)<{tag}\b[^>]*(?:class|id)\s*=\s*["'][^"']*(?:{NOISE_CLASS_PATTERN})[^"']*["'][^>]*>.*?</{tag}\s*>"#
            ))
            .unwrap()
        })
        .collect()
});

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main\s*>").unwrap());
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article\s*>").unwrap());
static CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:div|section)\b[^>]*class\s*=\s*["'][^"']*(?:content|recipe|recept|post-body|entry)[^"']*["'][^>]*>(.*)</(?:div|section)\s*>"#,
    )
    .unwrap()
});

static NEWLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(?:p|li|h[1-6]|tr|div|section|blockquote)\s*>|<br\s*/?>").unwrap()
});
static CELL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</t[dh]\s*>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static DEC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());
static HEX_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#x([0-9a-fA-F]+);").unwrap());

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static LINE_EDGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());
static BLANKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Reduce a page to readable plain text: strip scripts/boilerplate, keep
/// the main content region, preserve block structure as newlines. A
/// best-effort cleaner for feeding a downstream extractor, not a faithful
/// HTML renderer.
pub fn clean_text(html: &str) -> String {
    let mut text = COMMENT_RE.replace_all(html, "").into_owned();

    for re in NOISE_TAG_RES.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    for re in NOISE_CLASS_RES.iter() {
        text = re.replace_all(&text, "").into_owned();
    }

    // Prefer an explicit main-content region when the page marks one.
    let main_region = MAIN_RE
        .captures(&text)
        .or_else(|| ARTICLE_RE.captures(&text))
        .or_else(|| CONTENT_RE.captures(&text))
        .map(|caps| caps[1].to_string());
    if let Some(region) = main_region {
        text = region;
    }

    let text = NEWLINE_TAG_RE.replace_all(&text, "\n");
    let text = CELL_TAG_RE.replace_all(&text, "\t");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);

    let text = SPACES_RE.replace_all(&text, " ");
    let text = LINE_EDGE_RE.replace_all(&text, "\n");
    let text = BLANKS_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decode the entity set that actually shows up in recipe pages, plus
/// numeric character references. Unknown named entities pass through.
fn decode_entities(text: &str) -> String {
    let text = DEC_ENTITY_RE.replace_all(text, |caps: &regex::Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let text = HEX_ENTITY_RE.replace_all(&text, |caps: &regex::Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_boilerplate_tags() {
        let html = "<html><head><script>var x = 1;</script><style>p{}</style></head>\
                    <body><nav>Home | Recepten</nav><p>Roer het beslag.</p>\
                    <footer>Over ons</footer></body></html>";
        let text = clean_text(html);
        assert_eq!(text, "Roer het beslag.");
    }

    #[test]
    fn strips_noise_class_blocks() {
        let html = "<body><div class=\"cookie-consent\">Accepteer cookies</div>\
                    <p>Bak de pannenkoek.</p>\
                    <div id=\"sidebar\"><ul><li>Links</li></ul></div></body>";
        let text = clean_text(html);
        assert!(text.contains("Bak de pannenkoek."));
        assert!(!text.contains("cookies"));
        assert!(!text.contains("Links"));
    }

    #[test]
    fn isolates_main_region() {
        let html = "<body><div>menu menu menu</div>\
                    <main><p>Het echte recept.</p></main>\
                    <div>nog meer menu</div></body>";
        let text = clean_text(html);
        assert_eq!(text, "Het echte recept.");
    }

    #[test]
    fn article_fallback_when_no_main() {
        let html = "<body><p>rommel</p><article><p>Inhoud hier.</p></article></body>";
        assert_eq!(clean_text(html), "Inhoud hier.");
    }

    #[test]
    fn block_closes_become_newlines() {
        let html = "<main><h2>Ingrediënten</h2><ul><li>250 g bloem</li><li>2 eieren</li></ul></main>";
        let text = clean_text(html);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Ingrediënten");
        assert_eq!(lines[1], "250 g bloem");
        assert_eq!(lines[2], "2 eieren");
    }

    #[test]
    fn decodes_entities() {
        let html = "<p>Roer &amp; bak &lt;goudbruin&gt;&nbsp;&quot;klaar&quot; &#233;&#xE9;n keer</p>";
        let text = clean_text(html);
        assert_eq!(text, "Roer & bak <goudbruin> \"klaar\" één keer");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let html = "<p>veel    spaties</p>\n\n\n\n<p>en    lege regels</p>";
        let text = clean_text(html);
        assert_eq!(text, "veel spaties\n\nen lege regels");
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_text(""), "");
    }
}
