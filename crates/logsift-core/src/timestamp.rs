//! Timestamp detector — recognises a leading timestamp across unrelated log
//! dialects without a format hint.
//!
//! Each [`Grammar`] is an anchored regex with named captures for the date and
//! time components. [`detect`] tries them in [`Grammar::PRIORITY`] order and
//! returns on the first shape match, even when the captured values do not
//! form a valid instant (the match then carries `time: None`).
//!
//! Stamps without an explicit zone are resolved in a caller-chosen
//! [`NaiveZone`]; zoned stamps keep their own offset. Every instant is
//! returned in UTC.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use phf::phf_map;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::ops::Range;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Pattern fragments
// ---------------------------------------------------------------------------

macro_rules! ymd {
    ($sep:literal) => {
        concat!(
            r"(?P<y>[0-9]{4})",
            $sep,
            r"(?P<mo>[0-9]{2})",
            $sep,
            r"(?P<d>[0-9]{2})"
        )
    };
}

macro_rules! hms {
    () => {
        r"(?P<h>[0-9]{2}):(?P<mi>[0-9]{2}):(?P<s>[0-9]{2})"
    };
}

macro_rules! fraction {
    () => {
        r"(?:[.,](?P<frac>[0-9]+))?"
    };
}

macro_rules! day_month_name {
    () => {
        concat!(
            r"(?P<d>[0-9]{1,2})\s+(?P<mon>[A-Za-z]{3})\s+(?P<y>[0-9]{4})\s+",
            hms!(),
            fraction!()
        )
    };
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in timestamp grammar must compile")
}

static RFC3339: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        ymd!("-"),
        "T",
        hms!(),
        fraction!(),
        r"(?P<off>Z|[+-][0-9]{2}:[0-9]{2}))"
    ))
});

static DASHED_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        ymd!("-"),
        " ",
        hms!(),
        fraction!(),
        ")"
    ))
});

static SLASHED: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        ymd!("/"),
        " ",
        hms!(),
        fraction!(),
        ")"
    ))
});

static COLON_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        ymd!("-"),
        " ",
        hms!(),
        r":(?P<frac>[0-9]{1,3})\b)"
    ))
});

static AMBIGUOUS_SLASH: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        r"(?P<a>[0-9]{1,2})/(?P<b>[0-9]{1,2})/(?P<y>[0-9]{4}) ",
        r"(?P<h>[0-9]{1,2}):(?P<mi>[0-9]{2}):(?P<s>[0-9]{2})",
        fraction!(),
        r"(?:\s?(?P<ampm>(?i:AM|PM)))?)"
    ))
});

static DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(r"^(?P<lead>\s*)(?P<ts>", day_month_name!(), ")"))
});

static PREFIXED_DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*[0-9]+:[A-Za-z]\s+)(?P<ts>",
        day_month_name!(),
        ")"
    ))
});

static COMBINED_LOG: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        r"(?P<d>[0-9]{2})/(?P<mon>[A-Za-z]{3})/(?P<y>[0-9]{4}):",
        hms!(),
        r"\s+(?P<off>[+-][0-9]{4}))"
    ))
});

/// ISO-8601 with an optional zone, used where a dialect embeds a timestamp
/// that may or may not carry one.
static ISO_ANY_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<lead>\s*)(?P<ts>",
        ymd!("-"),
        "T",
        hms!(),
        fraction!(),
        r"(?P<off>Z|[+-][0-9]{2}:?[0-9]{2})?)"
    ))
});

static MONTHS: phf::Map<&'static str, u32> = phf_map! {
    "jan" => 1, "feb" => 2, "mar" => 3, "apr" => 4,
    "may" => 5, "jun" => 6, "jul" => 7, "aug" => 8,
    "sep" => 9, "oct" => 10, "nov" => 11, "dec" => 12,
};

/// Resolve an English three-letter month abbreviation, case-insensitively.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS.get(name.to_ascii_lowercase().as_str()).copied()
}

// ---------------------------------------------------------------------------
// Naive zone
// ---------------------------------------------------------------------------

/// Zone used to interpret timestamps that carry no offset of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum NaiveZone {
    /// The host's local zone. DST gaps yield no instant; overlaps take the
    /// earlier reading.
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl NaiveZone {
    pub fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            NaiveZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc)),
            NaiveZone::Utc => Some(Utc.from_utc_datetime(&naive)),
            NaiveZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid zone {0:?}: expected \"local\", \"utc\" or an offset like \"+10:00\"")]
pub struct ZoneParseError(pub String);

impl std::str::FromStr for NaiveZone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            Ok(NaiveZone::Local)
        } else if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
            Ok(NaiveZone::Utc)
        } else {
            parse_offset(s)
                .map(NaiveZone::Fixed)
                .ok_or_else(|| ZoneParseError(s.to_string()))
        }
    }
}

impl TryFrom<String> for NaiveZone {
    type Error = ZoneParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for NaiveZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NaiveZone::Local => write!(f, "local"),
            NaiveZone::Utc => write!(f, "utc"),
            NaiveZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Parse `Z`, `±HH:MM` or `±HHMM` into a fixed offset.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = s[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ---------------------------------------------------------------------------
// Grammars
// ---------------------------------------------------------------------------

/// A literal timestamp shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `YYYY-MM-DDTHH:MM:SS[.f](Z|±HH:MM)`
    Rfc3339,
    /// `YYYY-MM-DD HH:MM:SS[.f]`
    DashedSpace,
    /// `YYYY/MM/DD HH:MM:SS[.f]`
    Slashed,
    /// `YYYY-MM-DD HH:MM:SS:SSS`, as written by Windows Installer.
    ColonMillis,
    /// `D/M/YYYY H:MM:SS[.f][ AM|PM]` with day/month order guessed.
    AmbiguousSlash,
    /// `D Mon YYYY HH:MM:SS[.f]`
    DayMonthName,
    /// `<pid>:<role> D Mon YYYY HH:MM:SS[.f]`, as written by Redis.
    PrefixedDayMonthName,
    /// `DD/Mon/YYYY:HH:MM:SS ±ZZZZ`, the combined web-log stamp.
    CombinedLog,
}

impl Grammar {
    /// Detection order. `ColonMillis` precedes `DashedSpace` because the
    /// latter matches a strict prefix of it.
    pub const PRIORITY: [Grammar; 8] = [
        Grammar::Rfc3339,
        Grammar::ColonMillis,
        Grammar::DashedSpace,
        Grammar::Slashed,
        Grammar::AmbiguousSlash,
        Grammar::DayMonthName,
        Grammar::PrefixedDayMonthName,
        Grammar::CombinedLog,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            Grammar::Rfc3339 => &RFC3339,
            Grammar::DashedSpace => &DASHED_SPACE,
            Grammar::Slashed => &SLASHED,
            Grammar::ColonMillis => &COLON_MILLIS,
            Grammar::AmbiguousSlash => &AMBIGUOUS_SLASH,
            Grammar::DayMonthName => &DAY_MONTH_NAME,
            Grammar::PrefixedDayMonthName => &PREFIXED_DAY_MONTH_NAME,
            Grammar::CombinedLog => &COMBINED_LOG,
        }
    }

    /// Match this grammar at the start of `line`.
    pub fn matches(self, line: &str, zone: NaiveZone) -> Option<TimestampMatch<'_>> {
        let caps = self.regex().captures(line)?;
        let ts = caps.name("ts")?;
        let end = caps.get(0)?.end();
        Some(TimestampMatch {
            grammar: self,
            text: ts.as_str(),
            span: ts.range(),
            rest: line[end..].trim_start(),
            time: instant_from(&caps, zone),
        })
    }

    /// Parse a timestamp already known to have this grammar's shape.
    pub fn parse(self, text: &str, zone: NaiveZone) -> Option<DateTime<Utc>> {
        self.matches(text, zone).and_then(|m| m.time)
    }
}

/// A timestamp found at the start of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampMatch<'a> {
    pub grammar: Grammar,
    /// The matched timestamp text, without any leading prefix.
    pub text: &'a str,
    /// Byte span of `text` within the line.
    pub span: Range<usize>,
    /// The line after the timestamp (and any prefix), left-trimmed.
    pub rest: &'a str,
    /// `None` when the shape matched but the values do not form an instant.
    pub time: Option<DateTime<Utc>>,
}

/// Try every grammar in priority order; the first shape match wins.
pub fn detect(line: &str, zone: NaiveZone) -> Option<TimestampMatch<'_>> {
    Grammar::PRIORITY
        .into_iter()
        .find_map(|grammar| grammar.matches(line, zone))
}

/// Parse ISO-8601 `YYYY-MM-DDTHH:MM:SS[.f]` with or without a zone.
pub fn parse_iso(text: &str, zone: NaiveZone) -> Option<DateTime<Utc>> {
    let caps = ISO_ANY_ZONE.captures(text)?;
    instant_from(&caps, zone)
}

/// Parse a free-form timestamp field by trying every known shape.
pub fn parse_any(text: &str, zone: NaiveZone) -> Option<DateTime<Utc>> {
    if let Some(caps) = ISO_ANY_ZONE.captures(text) {
        return instant_from(&caps, zone);
    }
    detect(text, zone).and_then(|m| m.time)
}

/// Day/month order for `a/b/YYYY`.
///
/// This is a heuristic. If exactly one number exceeds 12 it must be the day;
/// otherwise the first number is taken as the day, so `03/04/2024` reads as
/// 3 April regardless of the writer's locale.
pub fn resolve_day_month(a: u32, b: u32) -> (u32, u32) {
    if b > 12 && a <= 12 {
        (b, a)
    } else {
        (a, b)
    }
}

/// Normalise fractional-second digits to milliseconds: keep the first three
/// digits, right-padded with zeros.
pub fn fraction_millis(digits: &str) -> u32 {
    let mut millis = 0;
    let mut scale = 100;
    for b in digits.bytes().take(3).filter(u8::is_ascii_digit) {
        millis += u32::from(b - b'0') * scale;
        scale /= 10;
    }
    millis
}

fn shift_meridiem(hour: u32, marker: &str) -> u32 {
    if marker.eq_ignore_ascii_case("pm") && hour < 12 {
        hour + 12
    } else if marker.eq_ignore_ascii_case("am") && hour == 12 {
        0
    } else {
        hour
    }
}

fn instant_from(caps: &Captures<'_>, zone: NaiveZone) -> Option<DateTime<Utc>> {
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year: i32 = caps.name("y")?.as_str().parse().ok()?;
    let (day, month) = match (num("a"), num("b")) {
        (Some(a), Some(b)) => resolve_day_month(a, b),
        _ => {
            let month = match caps.name("mon") {
                Some(name) => month_number(name.as_str())?,
                None => num("mo")?,
            };
            (num("d")?, month)
        }
    };
    let hour = match caps.name("ampm") {
        Some(marker) => shift_meridiem(num("h")?, marker.as_str()),
        None => num("h")?,
    };
    let millis = caps.name("frac").map_or(0, |f| fraction_millis(f.as_str()));

    let naive = NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_milli_opt(hour, num("mi")?, num("s")?, millis)?;

    match caps.name("off") {
        Some(off) => parse_offset(off.as_str())?
            .from_local_datetime(&naive)
            .single()
            .map(|t| t.with_timezone(&Utc)),
        None => zone.resolve(naive),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
