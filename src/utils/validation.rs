use chrono::NaiveDate;

/// Declared content types accepted for uploaded images. The real format is
/// always re-detected from the bytes.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg", // non-standard, sent by some clients
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError {
            code: "EMPTY_FILE",
            message: "Uploaded image is empty".to_string(),
        });
    }
    if size > max_size {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        });
    }
    Ok(())
}

/// Validates a declared MIME type against the image allowlist
pub fn validate_mime_type(content_type: &str) -> Result<(), ValidationError> {
    let parsed = content_type.trim().parse::<mime::Mime>().ok();
    let essence = parsed
        .as_ref()
        .map(|m| m.essence_str().to_lowercase())
        .unwrap_or_default();

    if ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
        return Ok(());
    }

    Err(ValidationError {
        code: "INVALID_MIME_TYPE",
        message: format!(
            "Invalid file type '{}'. Only JPG, PNG, GIF and WebP are allowed.",
            content_type
        ),
    })
}

/// Parses a strict `YYYY-MM-DD` calendar date
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    let well_formed = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });

    well_formed
        .then(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .flatten()
        .ok_or_else(|| ValidationError {
            code: "INVALID_DATE",
            message: format!("Invalid date '{}'. Expected YYYY-MM-DD.", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(1024, 2048).is_ok());
        assert!(validate_file_size(2048, 2048).is_ok());
        assert_eq!(validate_file_size(2049, 2048).unwrap_err().code, "FILE_TOO_LARGE");
        assert_eq!(validate_file_size(0, 2048).unwrap_err().code, "EMPTY_FILE");
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("image/jpeg").is_ok());
        assert!(validate_mime_type("image/jpg").is_ok());
        assert!(validate_mime_type("IMAGE/PNG").is_ok());
        assert!(validate_mime_type("image/webp; charset=binary").is_ok());
        assert!(validate_mime_type("image/gif").is_ok());

        assert!(validate_mime_type("image/svg+xml").is_err());
        assert!(validate_mime_type("application/pdf").is_err());
        assert!(validate_mime_type("text/html").is_err());
        assert!(validate_mime_type("").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );

        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("2024-13-01").is_err());
        assert!(validate_date("2024-1-01").is_err());
        assert!(validate_date("01/02/2024").is_err());
        assert!(validate_date("2024-01-01T00:00").is_err());
        assert!(validate_date("").is_err());
    }
}
