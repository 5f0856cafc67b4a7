use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest serial number that still fits the 8-digit canonical form.
pub const MAX_SERIAL: u32 = 99_999_999;

/// Errors raised while parsing a serial number from user input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SerialError {
    #[error("invalid serial number: {0}")]
    Invalid(String),
    #[error("serial number {0} exceeds {MAX_SERIAL}")]
    OutOfRange(u64),
}

/// CA-assigned certificate serial number used as the enumeration key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SerialNumber(u32);

impl SerialNumber {
    pub fn new(value: u32) -> Result<Self, SerialError> {
        if value > MAX_SERIAL {
            return Err(SerialError::OutOfRange(value as u64));
        }
        Ok(SerialNumber(value))
    }
    pub fn value(&self) -> u32 {
        self.0
    }
    /// Zero-padded 8-digit representation.
    pub fn padded(&self) -> String {
        format!("{:08}", self.0)
    }
    /// Cache shard folder name: the first 4 digits of the padded form.
    pub fn shard(&self) -> String {
        format!("{:04}", self.0 / 10_000)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

impl TryFrom<u64> for SerialNumber {
    type Error = SerialError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > MAX_SERIAL as u64 {
            return Err(SerialError::OutOfRange(value));
        }
        Ok(SerialNumber(value as u32))
    }
}

impl From<SerialNumber> for u64 {
    fn from(sn: SerialNumber) -> u64 {
        sn.0 as u64
    }
}

impl FromStr for SerialNumber {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u64 = s.parse().map_err(|_| SerialError::Invalid(s.to_string()))?;
        SerialNumber::try_from(value)
    }
}

/// Inclusive range of serial numbers, walked ascending when `from <= to`
/// and descending otherwise.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct SerialRange {
    pub from: SerialNumber,
    pub to: SerialNumber,
}

impl SerialRange {
    pub fn new(from: SerialNumber, to: SerialNumber) -> Self {
        SerialRange { from, to }
    }
    pub fn is_descending(&self) -> bool {
        self.from > self.to
    }
    pub fn len(&self) -> u64 {
        (self.from.0 as i64 - self.to.0 as i64).unsigned_abs() + 1
    }
    pub fn iter(&self) -> SerialRangeIter {
        SerialRangeIter {
            next: Some(self.from.0),
            last: self.to.0,
            descending: self.is_descending(),
        }
    }
}

impl IntoIterator for SerialRange {
    type Item = SerialNumber;
    type IntoIter = SerialRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct SerialRangeIter {
    next: Option<u32>,
    last: u32,
    descending: bool,
}

impl Iterator for SerialRangeIter {
    type Item = SerialNumber;

    fn next(&mut self) -> Option<SerialNumber> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else if self.descending {
            Some(current - 1)
        } else {
            Some(current + 1)
        };
        Some(SerialNumber(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_form_and_shard() {
        let sn: SerialNumber = "1234567".parse().unwrap();
        assert_eq!(sn.to_string(), "01234567");
        assert_eq!(sn.shard(), "0123");

        let sn = SerialNumber::new(100).unwrap();
        assert_eq!(sn.padded(), "00000100");
        assert_eq!(sn.shard(), "0000");

        let sn = SerialNumber::new(MAX_SERIAL).unwrap();
        assert_eq!(sn.shard(), "9999");
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(
            "100000000".parse::<SerialNumber>(),
            Err(SerialError::OutOfRange(100_000_000))
        );
        assert!(matches!(
            "12ab".parse::<SerialNumber>(),
            Err(SerialError::Invalid(_))
        ));
        assert!("-1".parse::<SerialNumber>().is_err());
    }

    #[test]
    fn range_walks_both_directions() {
        let sn = |v| SerialNumber::new(v).unwrap();

        let up: Vec<u32> = SerialRange::new(sn(5), sn(8)).iter().map(|s| s.value()).collect();
        assert_eq!(up, vec![5, 6, 7, 8]);

        let down: Vec<u32> = SerialRange::new(sn(8), sn(5)).iter().map(|s| s.value()).collect();
        assert_eq!(down, vec![8, 7, 6, 5]);

        let single = SerialRange::new(sn(0), sn(0));
        assert_eq!(single.len(), 1);
        assert_eq!(single.iter().count(), 1);

        assert_eq!(SerialRange::new(sn(8), sn(5)).len(), 4);
    }
}
