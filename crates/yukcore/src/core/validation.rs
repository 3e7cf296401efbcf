//! Answer validation rules
//!
//! Pure predicates applied to user input before any session state changes:
//! - Name-like answers must not contain digits
//! - Phone numbers must be 9 or 12 digits once `+` and spaces are removed
//! - Uploaded documents must be PDF, JPEG or PNG (photos always pass)

use thiserror::Error;

use crate::conversation::event::Attachment;
use crate::core::types::FileKind;

/// MIME types accepted for document uploads
pub const ALLOWED_DOCUMENT_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Accepted phone lengths after normalization (local and international form)
pub const PHONE_LENGTHS: &[usize] = &[9, 12];

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A name-like answer contains a digit
    #[error("digits are not allowed in this field")]
    DigitsNotAllowed,

    /// Phone contains something other than digits, `+` and spaces
    #[error("phone number must contain only digits")]
    PhoneNotNumeric,

    /// Phone has the wrong number of digits
    #[error("phone number must have 9 or 12 digits, got {0}")]
    PhoneLength(usize),

    /// Attachment type outside the whitelist
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
}

impl ValidationError {
    /// Catalog key of the message shown to the user
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::DigitsNotAllowed => "error-no-digits",
            Self::PhoneNotNumeric => "error-phone",
            Self::PhoneLength(_) => "error-phone-length",
            Self::UnsupportedFile(_) => "error-invalid-file",
        }
    }
}

/// Rejects answers containing any digit.
///
/// # Examples
/// ```
/// use yukcore::core::validation::validate_name;
///
/// assert!(validate_name("Ali").is_ok());
/// assert!(validate_name("Ali99").is_err());
/// ```
pub fn validate_name(text: &str) -> Result<(), ValidationError> {
    if text.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::DigitsNotAllowed);
    }
    Ok(())
}

/// Validates a phone number and returns its normalized digits.
///
/// `+` and space characters are stripped first; the remainder must be all
/// ASCII digits and exactly 9 or 12 long.
///
/// # Examples
/// ```
/// use yukcore::core::validation::validate_phone;
///
/// assert_eq!(validate_phone("+998 90 123 45 67").unwrap(), "998901234567");
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(text: &str) -> Result<String, ValidationError> {
    let cleaned: String = text.chars().filter(|c| *c != '+' && *c != ' ').collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PhoneNotNumeric);
    }

    if !PHONE_LENGTHS.contains(&cleaned.len()) {
        return Err(ValidationError::PhoneLength(cleaned.len()));
    }

    Ok(cleaned)
}

/// Checks an uploaded attachment against the document whitelist and returns
/// how it should be stored.
pub fn validate_attachment(attachment: &Attachment) -> Result<FileKind, ValidationError> {
    match attachment {
        Attachment::Photo(_) => Ok(FileKind::Photo),
        Attachment::Document { mime_type, .. } => match mime_type.as_deref() {
            Some(mime) if ALLOWED_DOCUMENT_MIME_TYPES.contains(&mime) => Ok(FileKind::Document),
            Some(mime) => Err(ValidationError::UnsupportedFile(mime.to_string())),
            None => Err(ValidationError::UnsupportedFile("unknown".to_string())),
        },
        Attachment::Video(_) => Err(ValidationError::UnsupportedFile("video".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FileRef;

    fn document(mime: Option<&str>) -> Attachment {
        Attachment::Document {
            file: FileRef::new("doc"),
            mime_type: mime.map(str::to_string),
        }
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Ali").is_ok());
        assert!(validate_name("Ali Valiyev").is_ok());
        assert!(validate_name("Алишер").is_ok());
        assert_eq!(validate_name("Ali99"), Err(ValidationError::DigitsNotAllowed));
        assert_eq!(validate_name("7"), Err(ValidationError::DigitsNotAllowed));
    }

    #[test]
    fn test_name_allows_numeric_symbols_that_are_not_digits() {
        assert!(validate_name("Ali²").is_ok());
        assert!(validate_name("Louis Ⅻ").is_ok());
        assert!(validate_name("½").is_ok());
        assert_eq!(validate_name("Ali 2"), Err(ValidationError::DigitsNotAllowed));
    }

    #[test]
    fn test_phone_accepts_local_and_international() {
        assert_eq!(validate_phone("+998901234567").unwrap(), "998901234567");
        assert_eq!(validate_phone("998901234567").unwrap(), "998901234567");
        assert_eq!(validate_phone("90 123 45 67").unwrap(), "901234567");
    }

    #[test]
    fn test_phone_rejects_wrong_length() {
        assert_eq!(validate_phone("12345"), Err(ValidationError::PhoneLength(5)));
        assert_eq!(validate_phone("9989012345678"), Err(ValidationError::PhoneLength(13)));
    }

    #[test]
    fn test_phone_rejects_non_digits() {
        assert_eq!(validate_phone("12a3456789"), Err(ValidationError::PhoneNotNumeric));
        assert_eq!(validate_phone("abc"), Err(ValidationError::PhoneNotNumeric));
        assert_eq!(validate_phone("+ "), Err(ValidationError::PhoneNotNumeric));
        assert_eq!(validate_phone("90-123-45-67"), Err(ValidationError::PhoneNotNumeric));
    }

    #[test]
    fn test_attachment_whitelist() {
        assert_eq!(validate_attachment(&Attachment::Photo(FileRef::new("p"))), Ok(FileKind::Photo));
        assert_eq!(validate_attachment(&document(Some("application/pdf"))), Ok(FileKind::Document));
        assert!(validate_attachment(&document(Some("image/png"))).is_ok());
        assert!(validate_attachment(&document(Some("image/jpeg"))).is_ok());
        assert_eq!(
            validate_attachment(&document(Some("application/zip"))),
            Err(ValidationError::UnsupportedFile("application/zip".to_string()))
        );
        assert!(validate_attachment(&document(None)).is_err());
        assert!(validate_attachment(&Attachment::Video(FileRef::new("v"))).is_err());
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(ValidationError::PhoneLength(3).message_key(), "error-phone-length");
        assert_eq!(
            ValidationError::UnsupportedFile(String::new()).message_key(),
            "error-invalid-file"
        );
    }
}
