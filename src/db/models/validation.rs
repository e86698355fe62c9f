//! Store-level rules checked before a row is written.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

const MAX_CODE_LENGTH: usize = 50;
const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5 MB
const IMAGE_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

pub fn validate_code(field: &str, code: &str) -> Result<()> {
    if code.trim().is_empty() {
        bail!("{field} is required");
    }
    if code.len() > MAX_CODE_LENGTH {
        bail!("{field} is too long (max {MAX_CODE_LENGTH} chars)");
    }
    if code.chars().any(char::is_whitespace) {
        bail!("{field} must not contain whitespace");
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<()> {
    if !color.starts_with('#') {
        bail!("Invalid color format. Must be hex (#RRGGBB or #RRGGBBAA)");
    }

    let hex_part = &color[1..];
    if hex_part.len() != 6 && hex_part.len() != 8 {
        bail!("Invalid color format. Must be hex (#RRGGBB or #RRGGBBAA)");
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color format. Must be hex (#RRGGBB or #RRGGBBAA)");
    }

    Ok(())
}

/// A phase may be instantaneous but never ends before it starts.
pub fn validate_phase_window(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<()> {
    if start > end {
        bail!("Phase ends ({end}) before it starts ({start})");
    }
    Ok(())
}

pub fn validate_image(mime_type: &str, data: &[u8]) -> Result<()> {
    if !IMAGE_MIME_TYPES.contains(&mime_type) {
        bail!("Unsupported image type '{mime_type}'");
    }
    if data.is_empty() {
        bail!("Image file is empty");
    }
    if data.len() > MAX_IMAGE_SIZE {
        bail!("Image file too large (max 5 MB)");
    }
    Ok(())
}
