use std::fmt::{Display, Formatter};

pub const MAX_E164_DIGITS: usize = 15;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PhoneRegion {
    iso: &'static str,
    calling_code: &'static str,
}

impl PhoneRegion {
    pub const NIGERIA: Self = Self::new("NG", "234");
    pub const GHANA: Self = Self::new("GH", "233");
    pub const KENYA: Self = Self::new("KE", "254");
    pub const SOUTH_AFRICA: Self = Self::new("ZA", "27");
    pub const UNITED_STATES: Self = Self::new("US", "1");
    pub const CANADA: Self = Self::new("CA", "1");
    pub const UNITED_KINGDOM: Self = Self::new("GB", "44");
    pub const INDIA: Self = Self::new("IN", "91");

    // Order matters for shared calling codes: the first entry owns the code.
    pub const KNOWN: [PhoneRegion; 8] = [
        Self::NIGERIA,
        Self::GHANA,
        Self::KENYA,
        Self::SOUTH_AFRICA,
        Self::UNITED_STATES,
        Self::CANADA,
        Self::UNITED_KINGDOM,
        Self::INDIA,
    ];

    const fn new(iso: &'static str, calling_code: &'static str) -> Self {
        Self { iso, calling_code }
    }

    pub const fn iso(self) -> &'static str {
        self.iso
    }

    pub const fn calling_code(self) -> &'static str {
        self.calling_code
    }

    pub fn from_iso(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::KNOWN
            .into_iter()
            .find(|region| region.iso.eq_ignore_ascii_case(code))
    }

    /// Region whose calling code prefixes the given international digits.
    pub fn for_international_digits(digits: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .rev()
            .filter(|region| digits.starts_with(region.calling_code))
            .max_by_key(|region| region.calling_code.len())
    }

    /// Parses the region out of a locale tag such as `en-NG` or `en_US.UTF-8`.
    pub fn from_locale_tag(tag: &str) -> Option<Self> {
        let without_encoding = tag.split('.').next().unwrap_or(tag);
        without_encoding
            .split(['-', '_'])
            .skip(1)
            .find(|segment| segment.len() == 2)
            .and_then(Self::from_iso)
    }

    #[cfg(feature = "i18n")]
    pub fn detect() -> Self {
        sys_locale::get_locale()
            .as_deref()
            .and_then(Self::from_locale_tag)
            .unwrap_or_default()
    }

    #[cfg(not(feature = "i18n"))]
    pub fn detect() -> Self {
        Self::default()
    }
}

impl Default for PhoneRegion {
    fn default() -> Self {
        Self::NIGERIA
    }
}

impl Display for PhoneRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (+{})", self.iso, self.calling_code)
    }
}

/// Turns whatever the user typed into an E.164-style value.
///
/// National input gets the region's calling code with a leading trunk `0`
/// removed; `+` or `00` input is taken as already international.
pub fn normalize_input(raw: &str, region: PhoneRegion) -> String {
    let trimmed = raw.trim_start();
    let has_exit_code = trimmed.starts_with("00");
    let international = trimmed.starts_with('+') || has_exit_code;

    let mut digits = trimmed
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if has_exit_code {
        digits.replace_range(..2, "");
    }

    if digits.is_empty() {
        return if international {
            "+".to_string()
        } else {
            String::new()
        };
    }

    let mut full = if international {
        digits
    } else {
        let national = digits.strip_prefix('0').unwrap_or(&digits);
        format!("{}{national}", region.calling_code)
    };
    full.truncate(MAX_E164_DIGITS);
    format!("+{full}")
}

/// Groups an E.164 value for display, e.g. `+234 803 123 4567`.
///
/// Only the calling code depends on the region. The national part always
/// uses one pattern: 3-3-4 for ten digits, otherwise groups of three. Numbers
/// from regions with other conventions (UK `+44 20 7946 0958`) come out as
/// `+44 207 946 0958`.
pub fn format_international(value: &str) -> String {
    let Some(digits) = value.strip_prefix('+') else {
        return value.to_string();
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    let Some(region) = PhoneRegion::for_international_digits(digits) else {
        return value.to_string();
    };

    let national = &digits[region.calling_code.len()..];
    if national.is_empty() {
        return format!("+{}", region.calling_code);
    }
    format!("+{} {}", region.calling_code, group_national(national))
}

pub fn is_e164(value: &str) -> bool {
    value.strip_prefix('+').is_some_and(|digits| {
        (8..=MAX_E164_DIGITS).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
    })
}

fn group_national(national: &str) -> String {
    if national.len() == 10 {
        return format!("{} {} {}", &national[..3], &national[3..6], &national[6..]);
    }
    national
        .as_bytes()
        .chunks(3)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
