//! Text helpers shared by posts, feeds and search.
//!
//! Post bodies are markdown. Listings, feeds and search work on a plain-text
//! projection of that markdown: images and fence markers are removed, links
//! collapse to their label, and inline markup symbols are dropped.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~).*$").expect("valid fence regex"));
static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\([^)]*\)").expect("valid image regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([-+*]|\d+\.)[ \t]+").expect("valid list regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~\[\]]+").expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Maximum slug length, matching the title column width.
pub const MAX_SLUG_LEN: usize = 250;

/// Turn a title into a URL-safe slug.
///
/// Keeps ascii letters, digits, `-` and `_`; runs of whitespace and hyphens
/// become a single `-`. Everything else is dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Whether `slug` is already in canonical slug form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Lowercase, trim, dedupe and sort tag names. Empty names are dropped.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = tags
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Plain-text projection of a markdown body.
pub fn plain_text(markdown: &str) -> String {
    let text = FENCE_RE.replace_all(markdown, " ");
    let text = IMAGE_RE.replace_all(&text, " ");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = LIST_MARKER_RE.replace_all(&text, " ");
    let text = MARKDOWN_SYMBOL_RE.replace_all(&text, " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Keep the first `max_words` words, appending an ellipsis when cut.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();
    let mut out = kept.join(" ");
    if words.next().is_some() {
        out.push_str(" …");
    }
    out
}

/// Short plain-text excerpt of a markdown body.
pub fn excerpt(markdown: &str, max_words: usize) -> String {
    truncate_words(&plain_text(markdown), max_words)
}

fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(" ".chars())
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Trigram similarity in `[0, 1]`, computed the way `pg_trgm` does:
/// words are lowercased and padded, and the score is shared / union.
pub fn trigram_similarity(a: &str, b: &str) -> f32 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hello,   World -- again!  "), "hello-world-again");
        assert_eq!(slugify("Rust 2024: what's new?"), "rust-2024-whats-new");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn slugify_caps_length() {
        let title = "word ".repeat(100);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slug_validation() {
        assert!(is_valid_slug("my-first-post"));
        assert!(is_valid_slug("snake_case_2"));
        assert!(!is_valid_slug("dots.not-allowed"));
        assert!(!is_valid_slug("My-First-Post"));
        assert!(!is_valid_slug("spaces here"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn tags_are_normalized() {
        let tags = normalize_tags(["Rust", " rust ", "", "Web", "async"]);
        assert_eq!(tags, vec!["async", "rust", "web"]);
    }

    #[test]
    fn plain_text_strips_markdown() {
        let body = "# Title\n\nSee [the docs](https://example.com) and ![logo](a.png).\n\n```rust\nfn main() {}\n```\n- item *one*";
        assert_eq!(
            plain_text(body),
            "Title See the docs and . fn main() {} item one"
        );
    }

    #[test]
    fn truncate_words_marks_cut() {
        assert_eq!(truncate_words("one two three", 5), "one two three");
        assert_eq!(truncate_words("one two three", 2), "one two …");
    }

    #[test]
    fn trigram_similarity_ranks_close_titles_higher() {
        let exact = trigram_similarity("Learning Rust", "learning rust");
        let close = trigram_similarity("Learning Rust", "rust");
        let far = trigram_similarity("Learning Rust", "gardening");
        assert!((exact - 1.0).abs() < f32::EPSILON);
        assert!(close > 0.1);
        assert!(close > far);
        assert_eq!(trigram_similarity("", "rust"), 0.0);
    }
}
