//! Place Classification Module
//! Maps a place label to its island group and region flag via ordered rule tables.

use super::schema::IslandGroup;

/// A pattern set and the island group it classifies to.
pub struct IslandRule {
    pub island: IslandGroup,
    pub patterns: &'static [&'static str],
}

/// Island rules, checked in order; the first matching rule wins.
pub const ISLAND_RULES: &[IslandRule] = &[
    IslandRule {
        island: IslandGroup::Luzon,
        patterns: &[
            "NCR",
            "CAR",
            "REGION I",
            "REGION II",
            "REGION III",
            "REGION IV",
            "MIMAROPA",
            "REGION V",
        ],
    },
    IslandRule {
        island: IslandGroup::Visayas,
        patterns: &["REGION VI", "REGION VII", "REGION VIII"],
    },
    IslandRule {
        island: IslandGroup::Mindanao,
        patterns: &[
            "REGION IX",
            "REGION X",
            "REGION XI",
            "REGION XII",
            "REGION XIII",
            "CARAGA",
            "BARMM",
        ],
    },
];

/// Tokens marking a first-level administrative region.
pub const REGION_TOKENS: &[&str] = &["REGION", "NCR", "CAR", "BARMM"];

fn is_numeral(c: char) -> bool {
    matches!(c, 'I' | 'V' | 'X')
}

/// Whether the text after a matched region numeral ends the numeral.
///
/// Another `I`/`V`/`X` continues it (`"REGION V"` inside `"REGION VII"`). A
/// single sub-region letter is allowed (`"REGION IVA"`), a longer word is not
/// (`"REGION I"` inside `"REGION IN MUSLIM MINDANAO"`).
fn numeral_ends(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        None => true,
        Some(c) if is_numeral(c) => false,
        Some('A' | 'B') => !chars.next().is_some_and(char::is_alphanumeric),
        Some(c) => !c.is_alphanumeric(),
    }
}

/// Case-insensitive substring match of `pattern` in the uppercased text.
///
/// Region numerals must not run on into a longer numeral, and short acronyms
/// must stand alone, so `"CAR"` does not match inside `"CARAGA"`.
fn contains_pattern(text_upper: &str, pattern: &str) -> bool {
    let numeral = pattern.starts_with("REGION ") && pattern.ends_with(is_numeral);
    let acronym = pattern.len() <= 3;

    text_upper.match_indices(pattern).any(|(start, matched)| {
        let rest = &text_upper[start + matched.len()..];
        if numeral {
            numeral_ends(rest)
        } else if acronym {
            let before_ok = text_upper[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
            before_ok && after_ok
        } else {
            true
        }
    })
}

/// Classify a place into its island group. Total: falls back to `Other`.
pub fn island_group(place: &str) -> IslandGroup {
    let upper = place.to_uppercase();
    ISLAND_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| contains_pattern(&upper, p)))
        .map(|rule| rule.island)
        .unwrap_or(IslandGroup::Other)
}

/// Whether the place label denotes an administrative region.
///
/// Plain case-insensitive substring test, so `"CARAGA"` counts through `"CAR"`.
pub fn is_region(place: &str) -> bool {
    let upper = place.to_uppercase();
    REGION_TOKENS.iter().any(|t| upper.contains(t))
}
