//! Title and short description derived from a readme, line by line.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when the project has no readme at all.
pub const NO_DOCUMENT_PLACEHOLDER: &str = "Open the details view for the full description.";
/// Returned when the readme has no bullet line to summarize.
pub const NO_BULLET_PLACEHOLDER: &str = "Click to see the project details.";

const DESCRIPTION_MAX_CHARS: usize = 100;

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.+)$").expect("valid bullet regex"));
// Greedy on purpose: `[a](b) and [c](d)` drops the whole span.
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*\]\(.*\)").expect("valid link regex"));
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`.*?`").expect("valid code span regex"));

/// Text of the first top-level heading (`# Title`), trimmed.
///
/// `## Sub` lines are not top-level and are skipped, as are headings with no text.
pub fn extract_title(doc: &str) -> Option<String> {
    doc.lines().find_map(|line| {
        let rest = line.strip_prefix('#')?;
        if rest.starts_with('#') { return None; }
        let text = rest.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// Short card description from the first bullet line of the readme.
///
/// Link markup and code spans are removed and the result is cut at 100 characters
/// with a `...` suffix. Never fails; placeholders cover missing input.
pub fn extract_description(doc: Option<&str>) -> String {
    let doc = match doc {
        Some(d) if !d.is_empty() => d,
        _ => return NO_DOCUMENT_PLACEHOLDER.to_string(),
    };

    let Some(item) = doc.lines().find_map(|line| BULLET_LINE.captures(line).map(|c| c[1].to_string())) else {
        return NO_BULLET_PLACEHOLDER.to_string();
    };

    let stripped = INLINE_LINK.replace_all(&item, "");
    let stripped = CODE_SPAN.replace_all(&stripped, "");
    truncate_chars(stripped.trim(), DESCRIPTION_MAX_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
