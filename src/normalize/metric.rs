use unicode_general_category::{get_general_category, GeneralCategory};

/// Manual line break escape used inside ASS dialogue text
pub const LINE_BREAK: &str = "\\N";

/// Count readable symbols (letters and digits), ignoring `\N` escapes
pub fn symbol_count(text: &str) -> usize {
    text.split(LINE_BREAK)
        .flat_map(str::chars)
        .filter(|ch| ch.is_alphanumeric())
        .count()
}

/// Unicode punctuation classes (Pc, Pd, Ps, Pe, Pi, Pf, Po).
///
/// ASCII symbols such as `$`, `+` or `|` belong to the symbol classes and are
/// not treated as punctuation.
pub fn is_punctuation(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}
