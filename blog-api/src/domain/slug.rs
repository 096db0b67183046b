use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Base used when a title has no letters or digits that survive ASCII folding.
pub(crate) const FALLBACK_SLUG: &str = "post";

/// Lowercase ASCII slug of `title`. Accented letters are folded through NFKD
/// ("Café" -> "cafe"), apostrophes vanish inside words, and every other run of
/// non-alphanumerics becomes a single `-`.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.nfkd() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if !is_combining_mark(ch) && !matches!(ch, '\'' | '\u{2019}') {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    slug
}

/// `base` for attempt 0, `base-N` afterwards.
pub(crate) fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_SLUG, candidate, slugify};

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust   is_fun -- really "), "rust-is-fun-really");
    }

    #[test]
    fn slugify_keeps_apostrophes_inside_words() {
        assert_eq!(slugify("Don't panic!"), "dont-panic");
        assert_eq!(slugify("It\u{2019}s here"), "its-here");
    }

    #[test]
    fn slugify_splits_on_punctuation() {
        assert_eq!(slugify("C++ & Rust: 2024"), "c-rust-2024");
        assert_eq!(slugify("v1.2 notes"), "v1-2-notes");
    }

    #[test]
    fn slugify_folds_accented_letters() {
        assert_eq!(slugify("Café Olé"), "cafe-ole");
        assert_eq!(slugify("Crème brûlée"), "creme-brulee");
    }

    #[test]
    fn slugify_never_returns_empty() {
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify("Привет"), FALLBACK_SLUG);
    }

    #[test]
    fn candidate_appends_counter_after_first_attempt() {
        assert_eq!(candidate("title", 0), "title");
        assert_eq!(candidate("title", 1), "title-1");
        assert_eq!(candidate("title", 12), "title-12");
    }
}
