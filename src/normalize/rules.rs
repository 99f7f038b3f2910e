use super::metric::is_punctuation;
use super::BreakRule;

/// Punctuation: a word is a good line end when its last character is punctuation
pub struct PunctuationRule;

impl BreakRule for PunctuationRule {
    fn is_good_end(&self, word: &str) -> bool {
        word.chars().last().is_some_and(is_punctuation)
    }
}

/// Sentence: only clause and sentence terminators make a good line end.
///
/// Quotes, brackets and dashes after a word do not count, so `"Hello"` or
/// `well-` keep flowing into the next line.
pub struct SentenceRule;

impl BreakRule for SentenceRule {
    fn is_good_end(&self, word: &str) -> bool {
        word.chars().last().is_some_and(|ch| {
            matches!(
                ch,
                '.' | ',' | ';' | ':' | '!' | '?' | '…' | '。' | '、' | '，' | '．' | '！' | '？' | '；' | '：'
            )
        })
    }
}

/// None: no word is preferred as a line end, splits are driven by length only
pub struct NoBreakRule;

impl BreakRule for NoBreakRule {
    fn is_good_end(&self, _word: &str) -> bool {
        false
    }
}
