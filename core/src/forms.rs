//! Boundary between the typewriter fields and the rest of the praise form.
//!
//! The text generator and the keyword validator are external collaborators;
//! only their interfaces live here, together with the field checks that run
//! before either is consulted.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Maximum length of a submitted person name (characters, after trimming).
pub const MAX_NAME_CHARS: usize = 20;

/// Maximum length of a submitted keyword list (characters, after trimming).
pub const MAX_KEYWORDS_CHARS: usize = 50;

/// Separators accepted between keywords.
pub const KEYWORD_SEPARATORS: &[char] = &['、', '，', ',', '；', ';', ' '];

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\u{4e00}-\u{9fa5}a-zA-Z0-9·•\-_\s]+$").expect("valid name pattern")
});

static KEYWORDS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\u{4e00}-\u{9fa5}a-zA-Z0-9、，,\-_\s]+$").expect("valid keywords pattern")
});

/// Why a form submission was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("person name is empty")]
    EmptyName,
    #[error("person name exceeds {} characters", MAX_NAME_CHARS)]
    NameTooLong,
    #[error("person name contains unsupported characters")]
    InvalidName,
    #[error("keywords are empty")]
    EmptyKeywords,
    #[error("keywords exceed {} characters", MAX_KEYWORDS_CHARS)]
    KeywordsTooLong,
    #[error("keywords contain unsupported characters")]
    InvalidKeywords,
    #[error("keyword `{word}` is not a compliment")]
    NotPositive { word: String },
    #[error("keywords contain a negative word")]
    NotPositiveUnknown,
}

/// Verdict of a keyword validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordVerdict {
    /// Whether the validator recognized enough to judge
    pub can_validate: bool,
    pub is_positive: bool,
    /// The word that made the list non-positive, when known
    pub offending_word: Option<String>,
}

impl KeywordVerdict {
    /// Verdict for keywords the validator knows nothing about.
    pub fn unknown() -> Self {
        Self {
            can_validate: false,
            is_positive: true,
            offending_word: None,
        }
    }
}

/// Produces the congratulatory text.
pub trait TextGenerator {
    fn generate(&self, name: &str, keywords: &[String]) -> String;
}

/// Judges whether keywords are compliments.
pub trait KeywordValidator {
    fn validate(&self, keywords: &[String]) -> KeywordVerdict;
}

/// Split a raw keyword field into keywords.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(KEYWORD_SEPARATORS)
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check the person-name field. Returns the trimmed name.
pub fn validate_person_name(raw: &str) -> Result<&str, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(FieldError::NameTooLong);
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(FieldError::InvalidName);
    }
    Ok(name)
}

/// Check the keywords field. Returns the trimmed field.
pub fn validate_keywords(raw: &str) -> Result<&str, FieldError> {
    let keywords = raw.trim();
    if keywords.is_empty() {
        return Err(FieldError::EmptyKeywords);
    }
    if keywords.chars().count() > MAX_KEYWORDS_CHARS {
        return Err(FieldError::KeywordsTooLong);
    }
    if !KEYWORDS_PATTERN.is_match(keywords) {
        return Err(FieldError::InvalidKeywords);
    }
    Ok(keywords)
}

/// Validate the settled field texts and hand them to the generator.
pub fn generate_with(
    name: &str,
    keywords: &str,
    validator: &dyn KeywordValidator,
    generator: &dyn TextGenerator,
) -> Result<String, FieldError> {
    let name = validate_person_name(name)?;
    let keywords = parse_keywords(validate_keywords(keywords)?);

    let verdict = validator.validate(&keywords);
    if verdict.can_validate && !verdict.is_positive {
        return Err(match verdict.offending_word {
            Some(word) => FieldError::NotPositive { word },
            None => FieldError::NotPositiveUnknown,
        });
    }

    Ok(generator.generate(name, &keywords))
}
