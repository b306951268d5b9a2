//! github-slugger compatible heading slugs.

use std::collections::HashMap;

/// Per-document slug generator; repeated slugs get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a slug for `text` that this slugger has not handed out before.
    ///
    /// ```
    /// use blogmark_core::slug::Slugger;
    ///
    /// let mut slugger = Slugger::new();
    /// assert_eq!(slugger.slug("Part 2"), "part-2");
    /// assert_eq!(slugger.slug("Part 2"), "part-2-1");
    /// ```
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{}-{}", base, count);
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }

    /// Marks `slug` as taken.
    pub fn reserve(&mut self, slug: &str) {
        self.occurrences.entry(slug.to_string()).or_insert(0);
    }
}

/// Lowercases, keeps letters, digits, `-` and `_`, and turns spaces into
/// hyphens. Nothing is collapsed or trimmed. Empty results become `heading`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        } else if !ch.is_ascii() && (ch.is_alphanumeric() || is_combining_mark(ch)) {
            slug.extend(ch.to_lowercase());
        }
    }
    if slug.is_empty() {
        slug.push_str("heading");
    }
    slug
}

/// Combining marks (Mn/Mc/Me) for the scripts seen in headings.
fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0591..=0x05BD
            | 0x05BF
            | 0x05C1..=0x05C2
            | 0x05C4..=0x05C5
            | 0x05C7
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0670
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0951..=0x0957
            | 0x0962..=0x0963
            | 0x0980..=0x0983
            | 0x09BC..=0x09CD
            | 0x0E31..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("Day 1: Trebuchet?!"), "day-1-trebuchet");
        assert_eq!(slugify("Part 2 (the hard part)"), "part-2-the-hard-part");
        assert_eq!(slugify("str.split()"), "strsplit");
    }

    #[test]
    fn spaces_are_not_collapsed() {
        assert_eq!(slugify("A & B"), "a--b");
        assert_eq!(slugify(" padded "), "-padded-");
    }

    #[test]
    fn unicode_letters_and_marks_survive() {
        assert_eq!(slugify("Héllo Wörld"), "héllo-wörld");
        assert_eq!(slugify("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(slugify("🚀 Launch"), "-launch");
    }

    #[test]
    fn empty_text_gets_fallback() {
        assert_eq!(slugify("?!"), "heading");
    }

    #[test]
    fn duplicates_are_numbered() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Title"), "title");
        assert_eq!(slugger.slug("Title"), "title-1");
        assert_eq!(slugger.slug("Title"), "title-2");
    }

    #[test]
    fn numbered_suffix_skips_existing_slugs() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Title 1"), "title-1");
        assert_eq!(slugger.slug("Title"), "title");
        assert_eq!(slugger.slug("Title"), "title-2");
    }

    #[test]
    fn reserved_slugs_are_avoided() {
        let mut slugger = Slugger::new();
        slugger.reserve("intro");
        assert_eq!(slugger.slug("Intro"), "intro-1");
    }
}
