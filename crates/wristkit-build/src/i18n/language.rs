//! Language tags

/// Locales the device firmware ships fonts and formatting for
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "cs-CZ", "de-DE", "en-US", "es-ES", "fr-FR", "id-ID", "it-IT", "ja-JP", "ko-KR", "nl-NL",
    "pl-PL", "pt-BR", "ro-RO", "ru-RU", "sv-SE", "zh-CN", "zh-TW",
];

/// Normalize a BCP-47-like tag: `en_us` becomes `en-US`, `zh-hant-tw`
/// becomes `zh-Hant-TW`.
///
/// Returns `None` when the text is not shaped like a language tag.
pub fn normalize(tag: &str) -> Option<String> {
    let mut parts = tag.split(['-', '_']);
    let language = parts.next()?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut normalized = language.to_ascii_lowercase();
    for part in parts {
        let subtag = match part.len() {
            2 if part.chars().all(|c| c.is_ascii_alphabetic()) => part.to_ascii_uppercase(),
            3 if part.chars().all(|c| c.is_ascii_digit()) => part.to_string(),
            4 if part.chars().all(|c| c.is_ascii_alphabetic()) => {
                let lower = part.to_ascii_lowercase();
                let (first, rest) = lower.split_at(1);
                format!("{}{rest}", first.to_ascii_uppercase())
            }
            5..=8 if part.chars().all(|c| c.is_ascii_alphanumeric()) => part.to_ascii_lowercase(),
            _ => return None,
        };
        normalized.push('-');
        normalized.push_str(&subtag);
    }
    Some(normalized)
}
