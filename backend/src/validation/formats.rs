use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::DefinitionError;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("invalid date pattern"));

static NI_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-CEGHJ-PR-TW-Z][A-CEGHJ-NPR-TW-Z][0-9]{6}[A-D]$")
        .expect("invalid NI number pattern")
});

static UK_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+44|0)[0-9]{9,10}$").expect("invalid phone pattern"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

static POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").expect("invalid postcode pattern")
});

/// Format
///
/// Shape constraints for structured string fields.
#[derive(Debug, Clone)]
pub enum Format {
    /// `DD/MM/YYYY` naming a real calendar day.
    Date,
    /// UK National Insurance number, exactly nine characters.
    NiNumber,
    /// UK phone number, `+44` or `0` followed by 9-10 digits. Spaces are ignored.
    UkPhone,
    Email,
    /// UK postcode, either case, optional inner space.
    Postcode,
    /// Caller-supplied pattern, matched against the whole value.
    Regex(Regex),
}

impl Format {
    /// Compiles a whole-string pattern. An invalid pattern is a definition fault.
    pub fn regex(pattern: &str) -> Result<Self, DefinitionError> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Format::Regex)
            .map_err(|source| DefinitionError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Format::Date => is_valid_date(value),
            Format::NiNumber => is_valid_ni_number(value),
            Format::UkPhone => is_valid_uk_phone(value),
            Format::Email => EMAIL.is_match(value),
            Format::Postcode => POSTCODE.is_match(value.trim()),
            Format::Regex(re) => re.is_match(value),
        }
    }
}

/// Parses `DD/MM/YYYY`, rejecting days the calendar does not have.
///
/// The parsed date must render back to the exact input, so `31/02/2024` and
/// `29/02/2023` are rejected while `29/02/2024` is accepted.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let caps = DATE.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (date.format("%d/%m/%Y").to_string() == value).then_some(date)
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

pub fn is_valid_ni_number(value: &str) -> bool {
    value.len() == 9 && NI_NUMBER.is_match(value)
}

pub fn is_valid_uk_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    UK_PHONE.is_match(&compact)
}
