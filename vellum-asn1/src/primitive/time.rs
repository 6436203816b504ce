//! UTCTime and GeneralizedTime values
//!
//! Both are kept as validated text. Only the `Z` (UTC) form is accepted.

use std::fmt;

use crate::error::{VellumError, VellumResult};

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn two_digits(s: &str, at: usize) -> u32 {
    s.as_bytes()[at..at + 2]
        .iter()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Checks month, day, hour, minute and (optional) second fields starting at
/// `at`
fn check_fields(text: &str, at: usize, with_seconds: bool) -> VellumResult<()> {
    let month = two_digits(text, at);
    let day = two_digits(text, at + 2);
    let hour = two_digits(text, at + 4);
    let minute = two_digits(text, at + 6);
    let second = if with_seconds { two_digits(text, at + 8) } else { 0 };
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 59 {
        return Err(VellumError::structural(format!("time value out of range: {}", text)));
    }
    Ok(())
}

/// UTCTime: `YYMMDDHHMMZ` or `YYMMDDHHMMSSZ`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtcTime {
    text: String,
}

impl UtcTime {
    pub fn new(text: impl Into<String>) -> VellumResult<Self> {
        let text = text.into();
        let body = text
            .strip_suffix('Z')
            .ok_or_else(|| VellumError::structural(format!("UTCTime must end in Z: {}", text)))?;
        if !matches!(body.len(), 10 | 12) || !all_digits(body) {
            return Err(VellumError::structural(format!("malformed UTCTime: {}", text)));
        }
        check_fields(body, 2, body.len() == 12)?;
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Four-digit year; two-digit years below 50 are in the 2000s
    pub fn year(&self) -> u32 {
        let yy = two_digits(&self.text, 0);
        if yy < 50 { 2000 + yy } else { 1900 + yy }
    }

    /// The same instant as a GeneralizedTime
    pub fn to_generalized(&self) -> GeneralizedTime {
        let body = &self.text[2..self.text.len() - 1];
        let seconds = if body.len() == 8 { "00" } else { "" };
        GeneralizedTime {
            text: format!("{}{}{}Z", self.year(), body, seconds),
        }
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// GeneralizedTime: `YYYYMMDDHHMMSS[.fff]Z`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneralizedTime {
    text: String,
}

impl GeneralizedTime {
    pub fn new(text: impl Into<String>) -> VellumResult<Self> {
        let text = text.into();
        let body = text.strip_suffix('Z').ok_or_else(|| {
            VellumError::structural(format!("GeneralizedTime must end in Z: {}", text))
        })?;
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (body, None),
        };
        if whole.len() != 14 || !all_digits(whole) {
            return Err(VellumError::structural(format!("malformed GeneralizedTime: {}", text)));
        }
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !all_digits(fraction) || fraction.ends_with('0') {
                return Err(VellumError::structural(format!(
                    "malformed GeneralizedTime fraction: {}",
                    text
                )));
            }
        }
        check_fields(whole, 4, true)?;
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn year(&self) -> u32 {
        two_digits(&self.text, 0) * 100 + two_digits(&self.text, 2)
    }
}

impl fmt::Display for GeneralizedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_time() {
        let t = UtcTime::new("491231235959Z").unwrap();
        assert_eq!(t.year(), 2049);
        assert_eq!(UtcTime::new("500101000000Z").unwrap().year(), 1950);
        assert_eq!(t.to_generalized().as_str(), "20491231235959Z");
        assert_eq!(
            UtcTime::new("2401021304Z").unwrap().to_generalized().as_str(),
            "20240102130400Z"
        );
        assert!(UtcTime::new("491231235959").is_err());
        assert!(UtcTime::new("491331235959Z").is_err());
        assert!(UtcTime::new("4912312359Z5").is_err());
    }

    #[test]
    fn test_generalized_time() {
        let t = GeneralizedTime::new("20240229120000Z").unwrap();
        assert_eq!(t.year(), 2024);
        assert!(GeneralizedTime::new("20240229120000.123Z").is_ok());
        assert!(GeneralizedTime::new("20240229120000.Z").is_err());
        assert!(GeneralizedTime::new("20240229120000.10Z").is_err());
        assert!(GeneralizedTime::new("20240229126000Z").is_err());
        assert!(GeneralizedTime::new("202402291200Z").is_err());
    }
}
