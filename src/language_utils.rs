use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Document jobs accept ISO 639-1 (2-letter) and ISO 639-2 (3-letter) codes.
/// Prompts need a readable name for each code; configuration needs validation.

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Subtags allowed after the primary code: region (`CN`, `419`) or script (`Hans`)
fn is_valid_subtag(subtag: &str) -> bool {
    match subtag.len() {
        2 | 4 => subtag.chars().all(|c| c.is_ascii_alphabetic()),
        3 => subtag.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Resolve a 2- or 3-letter code, optionally followed by region or script
/// subtags such as `zh-CN` or `zh_Hans`.
///
/// Three-letter codes must be ISO 639-2 codes: individual ISO 639-3 codes
/// with no 639-1 counterpart are rejected.
pub fn resolve_language(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();
    let mut subtags = normalized.split(['-', '_']);
    let primary = subtags.next().unwrap_or_default();

    let subtags: Vec<&str> = subtags.collect();
    if subtags.len() > 2 || !subtags.iter().all(|s| is_valid_subtag(s)) {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    let language = match primary.len() {
        2 => Language::from_639_1(primary),
        3 => {
            let bibliographic = BIBLIOGRAPHIC_CODES.iter()
                .find(|(bib, _)| *bib == primary)
                .map(|(_, term)| *term);
            match bibliographic {
                Some(terminology) => Language::from_639_3(terminology),
                None => Language::from_639_3(primary).filter(|l| l.to_639_1().is_some()),
            }
        }
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    Ok(resolve_language(code)?.to_639_3().to_string())
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (resolve_language(code1), resolve_language(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(resolve_language(code)?.to_name().to_string())
}

/// Describe a code for prompts, e.g. `English (en)`, falling back to the raw code
pub fn describe_language(code: &str) -> String {
    match get_language_name(code) {
        Ok(name) => format!("{} ({})", name, code),
        Err(_) => code.to_string(),
    }
}
