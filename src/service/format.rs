//! Display helpers for phase dates.

use chrono::{DateTime, Locale, Utc};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::error::{CampaignError, CampaignResult};

/// Day, full month name, year: "16 juin 2021".
const PHASE_DATE_FORMAT: &str = "%d %B %Y";

/// Tidies a formatted French date for display.
///
/// Without accents the text is decomposed and its combining marks dropped.
/// A leading "01" becomes the ordinal "1er"; any other leading zero is removed.
pub fn to_so_lovely_string(text: &str, with_accents: bool) -> String {
    let text: String = if with_accents {
        text.to_string()
    } else {
        text.nfd().filter(|c| !is_combining_mark(*c)).collect()
    };

    if let Some(rest) = text.strip_prefix("01") {
        format!("1er{rest}")
    } else if let Some(rest) = text.strip_prefix('0') {
        rest.to_string()
    } else {
        text
    }
}

pub fn parse_locale(name: &str) -> CampaignResult<Locale> {
    Locale::try_from(name).map_err(|_| CampaignError::UnknownLocale(name.to_string()))
}

/// Formats an instant (in UTC) with the phase date layout, then tidies it.
pub fn format_phase_date(
    instant: DateTime<Utc>,
    locale: &str,
    with_accents: bool,
) -> CampaignResult<String> {
    let locale = parse_locale(locale)?;
    let formatted = instant.format_localized(PHASE_DATE_FORMAT, locale).to_string();
    Ok(to_so_lovely_string(&formatted, with_accents))
}
