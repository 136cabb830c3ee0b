use once_cell::sync::Lazy;
use regex::Regex;

static CJK_CHAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]").expect("valid cjk regex"));
static LATIN_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").expect("valid latin word regex"));
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit regex"));

// Punctuation and whitespace never count.
pub fn count_words(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }

    let total = CJK_CHAR_RE.find_iter(text).count()
        + LATIN_WORD_RE.find_iter(text).count()
        + DIGIT_RUN_RE.find_iter(text).count();
    u32::try_from(total).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::count_words;

    #[test]
    fn blank_text_has_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t"), 0);
    }

    #[test]
    fn counts_each_ideograph_and_skips_fullwidth_punctuation() {
        assert_eq!(count_words("今天加班到很晚，好累"), 9);
    }

    #[test]
    fn mixes_latin_runs_digits_and_ideographs() {
        assert_eq!(count_words("ran 5km today"), 4);
        assert_eq!(count_words("跑步 10 公里 with Tom"), 7);
    }
}
