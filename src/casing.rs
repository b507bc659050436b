//! String casing helpers used to synthesize flag and class names.
//!
//! - `capitalize("mobileLandscape")` -> `"MobileLandscape"`
//! - `dasherize("mobileLandscape")` -> `"mobile-landscape"`

use std::sync::OnceLock;

use regex::Regex;

/// Prefix applied to every breakpoint class name.
pub const CLASS_PREFIX: &str = "media-";

/// Prefix applied to every derived boolean flag name.
pub const FLAG_PREFIX: &str = "is";

fn camel_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex is valid"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ _]+").expect("static regex is valid"))
}

/// Uppercases the first character, leaving the rest untouched.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Converts camelCase, snake_case and spaced words to lowercase dashed words.
#[must_use]
pub fn dasherize(s: &str) -> String {
    let decamelized = camel_boundary().replace_all(s, "${1}_${2}").to_lowercase();
    separators().replace_all(&decamelized, "-").into_owned()
}

/// `mobile` -> `isMobile`.
#[must_use]
pub fn flag_name(breakpoint: &str) -> String {
    format!("{FLAG_PREFIX}{}", capitalize(breakpoint))
}

/// `mobileLandscape` -> `media-mobile-landscape`.
#[must_use]
pub fn class_name(breakpoint: &str) -> String {
    format!("{CLASS_PREFIX}{}", dasherize(breakpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("mobile"), "Mobile");
        assert_eq!(capitalize("mobileLandscape"), "MobileLandscape");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn dasherize_handles_camel_snake_and_spaces() {
        assert_eq!(dasherize("mobile"), "mobile");
        assert_eq!(dasherize("mobileLandscape"), "mobile-landscape");
        assert_eq!(dasherize("tablet_portrait"), "tablet-portrait");
        assert_eq!(dasherize("big screen"), "big-screen");
        assert_eq!(dasherize("xl2Wide"), "xl2-wide");
    }

    #[test]
    fn flag_and_class_names() {
        assert_eq!(flag_name("desktop"), "isDesktop");
        assert_eq!(flag_name("mobileLandscape"), "isMobileLandscape");
        assert_eq!(class_name("mobileLandscape"), "media-mobile-landscape");
    }
}
