// Author: Dustin Pilgrim
// License: MIT

//! Validation of typed literal bodies (`date "..."`, `country "..."`, ...).
//!
//! Each validator checks the surface syntax with an anchored regex and then
//! builds the semantic value, so `date "2024-02-30"` is rejected even though
//! its shape is fine.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date regex"));
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").expect("valid time regex"));
static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})[T ]([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,9}))?$")
        .expect("valid datetime regex")
});
static BASE64_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$").expect("valid base64 regex")
});

/// ISO 3166-1 alpha-2 codes, sorted for binary search.
const ISO_3166_ALPHA2: [&str; 249] = [
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// A validated ISO 3166-1 alpha-2 country code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        // both bytes are ASCII uppercase letters
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CountryCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_country(s)
    }
}

pub fn parse_date(body: &str) -> Result<NaiveDate, String> {
    let caps = DATE_RE
        .captures(body)
        .ok_or_else(|| "expected YYYY-MM-DD".to_string())?;
    let year: i32 = caps[1].parse().map_err(|_| "year out of range".to_string())?;
    let month: u32 = caps[2].parse().map_err(|_| "month out of range".to_string())?;
    let day: u32 = caps[3].parse().map_err(|_| "day out of range".to_string())?;

    if !(1..=12).contains(&month) {
        return Err(format!("month {} does not exist", month));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("day {} does not exist in {:04}-{:02}", day, year, month))
}

pub fn parse_time(body: &str) -> Result<NaiveTime, String> {
    let caps = TIME_RE
        .captures(body)
        .ok_or_else(|| "expected HH:MM:SS".to_string())?;
    hms(&caps[1], &caps[2], &caps[3], 0)
}

pub fn parse_datetime(body: &str) -> Result<NaiveDateTime, String> {
    let caps = DATETIME_RE
        .captures(body)
        .ok_or_else(|| "expected YYYY-MM-DDTHH:MM:SS with an optional .fraction".to_string())?;
    let date = parse_date(&caps[1])?;

    let nanos = match caps.get(5) {
        Some(fraction) => {
            // right-pad to nanoseconds: ".5" is 500_000_000ns
            let padded = format!("{:0<9}", fraction.as_str());
            padded.parse::<u32>().map_err(|_| "invalid fraction".to_string())?
        }
        None => 0,
    };

    let time = hms(&caps[2], &caps[3], &caps[4], nanos)?;
    Ok(date.and_time(time))
}

fn hms(hour: &str, minute: &str, second: &str, nanos: u32) -> Result<NaiveTime, String> {
    let h: u32 = hour.parse().map_err(|_| "invalid hour".to_string())?;
    let m: u32 = minute.parse().map_err(|_| "invalid minute".to_string())?;
    let s: u32 = second.parse().map_err(|_| "invalid second".to_string())?;
    NaiveTime::from_hms_nano_opt(h, m, s, nanos)
        .ok_or_else(|| format!("{}:{}:{} is not a valid 24-hour time", hour, minute, second))
}

pub fn parse_country(body: &str) -> Result<CountryCode, String> {
    let bytes = body.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_uppercase) {
        return Err("expected two uppercase ASCII letters".into());
    }
    if ISO_3166_ALPHA2.binary_search(&body).is_err() {
        return Err(format!("'{}' is not an ISO 3166-1 alpha-2 code", body));
    }
    Ok(CountryCode([bytes[0], bytes[1]]))
}

pub fn parse_base64(body: &str) -> Result<Vec<u8>, String> {
    if body.len() % 4 != 0 {
        return Err(format!("length {} is not a multiple of 4", body.len()));
    }
    if !BASE64_RE.is_match(body) {
        return Err("expected characters A-Z a-z 0-9 + / with optional = padding".into());
    }
    STANDARD.decode(body).map_err(|e| e.to_string())
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
