//! Input validation for API requests.
//!
//! For collecting multiple validation errors and returning them as an
//! ApiError, use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

/// Ceiling for availability notes
pub const MAX_NOTE_LEN: usize = 280;
/// Ceiling for profile bios
pub const MAX_BIO_LEN: usize = 500;
/// Gallery size cap per profile
pub const MAX_GALLERY_IMAGES: usize = 5;

lazy_static! {
    /// Pragmatic email shape check; deliverability is the SMTP server's job
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();

    /// Regex for #rrggbb hex colors
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();

    /// Regex for profile links (HTTP/HTTPS URLs)
    static ref LINK_REGEX: Regex = Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)*(:\d+)?(/[-a-zA-Z0-9_%&=+@~.?#]*)*$"
    ).unwrap();

    /// Regex for phone numbers (digits, spaces, dashes, optional leading +)
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 .-]{4,29}$").unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password for new accounts
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate an availability color (optional field)
pub fn validate_color(color: &Option<String>) -> Result<(), String> {
    if let Some(c) = color {
        if !HEX_COLOR_REGEX.is_match(c) {
            return Err("Color must be a #rrggbb hex value".to_string());
        }
    }

    Ok(())
}

/// Validate an availability note (optional field)
pub fn validate_note(note: &Option<String>) -> Result<(), String> {
    if let Some(n) = note {
        if n.len() > MAX_NOTE_LEN {
            return Err(format!("Note is too long (max {} characters)", MAX_NOTE_LEN));
        }
    }

    Ok(())
}

/// Validate a profile display name
pub fn validate_display_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Display name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Display name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a profile bio (optional field)
pub fn validate_bio(bio: &Option<String>) -> Result<(), String> {
    if let Some(b) = bio {
        if b.len() > MAX_BIO_LEN {
            return Err(format!("Bio is too long (max {} characters)", MAX_BIO_LEN));
        }
    }

    Ok(())
}

/// Validate a profile link (optional field)
pub fn validate_link(link: &Option<String>) -> Result<(), String> {
    if let Some(l) = link {
        if l.is_empty() {
            return Ok(()); // Empty string treated as no link
        }

        if l.len() > 2048 {
            return Err("Link is too long (max 2048 characters)".to_string());
        }

        if !LINK_REGEX.is_match(l) {
            return Err("Link must be an HTTP(S) URL".to_string());
        }
    }

    Ok(())
}

/// Validate a phone number (optional field)
pub fn validate_phone(phone: &Option<String>) -> Result<(), String> {
    if let Some(p) = phone {
        if p.is_empty() {
            return Ok(()); // Empty string treated as no phone
        }

        if !PHONE_REGEX.is_match(p) {
            return Err("Invalid phone number format".to_string());
        }
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}
