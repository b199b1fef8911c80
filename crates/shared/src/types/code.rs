//! The 11-part composite business key for financial transactions.
//!
//! Treasury export and other external systems key off this code, so the
//! textual layout is a wire-format invariant: eleven hyphen-joined
//! segments, each zero-padded to a fixed width:
//!
//! ```text
//! ZZ-DD-SS-BBBBBBBB-CCCC-AAAA-PPPP-NNNNNN-EEEE-YYYYMMDD-OO
//! zone-dept-section-budget-costcenter-continuousact-specialact-beneficiary-event-date-occurrence
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Segment widths, in order. The date segment is `YYYYMMDD`.
const WIDTHS: [usize; 11] = [2, 2, 2, 8, 4, 4, 4, 6, 4, 8, 2];

/// Errors from parsing or constructing a [`UniqueCode`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    /// Wrong number of hyphen-separated segments.
    #[error("expected 11 segments, got {0}")]
    SegmentCount(usize),

    /// A segment has the wrong width.
    #[error("segment {index} must be {expected} digits wide, got {actual}")]
    Width {
        /// Zero-based segment index.
        index: usize,
        /// Required width.
        expected: usize,
        /// Observed width.
        actual: usize,
    },

    /// A segment contains non-digit characters.
    #[error("segment {0} is not numeric")]
    NotNumeric(usize),

    /// The date segment is not a valid calendar date.
    #[error("invalid date segment: {0}")]
    Date(String),

    /// A field value does not fit its fixed width.
    #[error("value {value} does not fit in {width} digits")]
    Overflow {
        /// Offending value.
        value: u64,
        /// Field width.
        width: usize,
    },
}

/// Composite business key identifying one financial transaction.
///
/// Immutable once assigned; the `occurrence` counter disambiguates
/// multiple transactions sharing all other coordinates on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UniqueCode {
    /// Municipal zone number.
    pub zone: u8,
    /// Department number within the zone.
    pub department: u8,
    /// Section number within the department.
    pub section: u8,
    /// Budget coding (numeric part).
    pub budget: u32,
    /// Cost center.
    pub cost_center: u16,
    /// Continuous activity number.
    pub continuous_activity: u16,
    /// Special activity number.
    pub special_activity: u16,
    /// Beneficiary registry number.
    pub beneficiary: u32,
    /// Event number.
    pub event: u16,
    /// Transaction date.
    pub date: NaiveDate,
    /// Same-day occurrence counter (1-based).
    pub occurrence: u8,
}

fn check_width(value: u64, width: usize) -> Result<(), CodeError> {
    let max = 10u64.pow(u32::try_from(width).unwrap_or(0)) - 1;
    if value > max {
        return Err(CodeError::Overflow { value, width });
    }
    Ok(())
}

impl UniqueCode {
    /// Validates that every field fits its fixed width.
    ///
    /// # Errors
    ///
    /// Returns `CodeError::Overflow` for the first field that does not fit.
    pub fn validate(&self) -> Result<(), CodeError> {
        check_width(u64::from(self.zone), WIDTHS[0])?;
        check_width(u64::from(self.department), WIDTHS[1])?;
        check_width(u64::from(self.section), WIDTHS[2])?;
        check_width(u64::from(self.budget), WIDTHS[3])?;
        check_width(u64::from(self.cost_center), WIDTHS[4])?;
        check_width(u64::from(self.continuous_activity), WIDTHS[5])?;
        check_width(u64::from(self.special_activity), WIDTHS[6])?;
        check_width(u64::from(self.beneficiary), WIDTHS[7])?;
        check_width(u64::from(self.event), WIDTHS[8])?;
        check_width(u64::from(self.occurrence), WIDTHS[10])?;
        Ok(())
    }
}

impl fmt::Display for UniqueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02}-{:08}-{:04}-{:04}-{:04}-{:06}-{:04}-{}-{:02}",
            self.zone,
            self.department,
            self.section,
            self.budget,
            self.cost_center,
            self.continuous_activity,
            self.special_activity,
            self.beneficiary,
            self.event,
            self.date.format("%Y%m%d"),
            self.occurrence,
        )
    }
}

impl FromStr for UniqueCode {
    type Err = CodeError;

    #[allow(clippy::cast_possible_truncation)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('-').collect();
        if segments.len() != 11 {
            return Err(CodeError::SegmentCount(segments.len()));
        }

        for (index, (segment, expected)) in segments.iter().zip(WIDTHS).enumerate() {
            if segment.len() != expected {
                return Err(CodeError::Width {
                    index,
                    expected,
                    actual: segment.len(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CodeError::NotNumeric(index));
            }
        }

        // Widths and digits are validated above, so numeric parses cannot fail.
        let parse = |i: usize| -> u64 { segments[i].parse().unwrap_or(0) };

        let date = NaiveDate::parse_from_str(segments[9], "%Y%m%d")
            .map_err(|_| CodeError::Date(segments[9].to_string()))?;

        Ok(Self {
            zone: parse(0) as u8,
            department: parse(1) as u8,
            section: parse(2) as u8,
            budget: parse(3) as u32,
            cost_center: parse(4) as u16,
            continuous_activity: parse(5) as u16,
            special_activity: parse(6) as u16,
            beneficiary: parse(7) as u32,
            event: parse(8) as u16,
            date,
            occurrence: parse(10) as u8,
        })
    }
}

impl TryFrom<String> for UniqueCode {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<UniqueCode> for String {
    fn from(code: UniqueCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UniqueCode {
        UniqueCode {
            zone: 3,
            department: 12,
            section: 1,
            budget: 10_203_040,
            cost_center: 77,
            continuous_activity: 0,
            special_activity: 415,
            beneficiary: 120_455,
            event: 12,
            date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            occurrence: 1,
        }
    }

    #[test]
    fn test_format_fixed_widths() {
        assert_eq!(
            sample().to_string(),
            "03-12-01-10203040-0077-0000-0415-120455-0012-20251103-01"
        );
    }

    #[test]
    fn test_round_trip() {
        let code = sample();
        let parsed: UniqueCode = code.to_string().parse().unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        let err = "03-12-01".parse::<UniqueCode>().unwrap_err();
        assert_eq!(err, CodeError::SegmentCount(3));
    }

    #[test]
    fn test_parse_rejects_wrong_width() {
        let err = "3-12-01-10203040-0077-0000-0415-120455-0012-20251103-01"
            .parse::<UniqueCode>()
            .unwrap_err();
        assert_eq!(
            err,
            CodeError::Width {
                index: 0,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = "03-12-01-10203040-0077-0000-0415-1204X5-0012-20251103-01"
            .parse::<UniqueCode>()
            .unwrap_err();
        assert_eq!(err, CodeError::NotNumeric(7));
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        let err = "03-12-01-10203040-0077-0000-0415-120455-0012-20251399-01"
            .parse::<UniqueCode>()
            .unwrap_err();
        assert!(matches!(err, CodeError::Date(_)));
    }

    #[test]
    fn test_validate_overflow() {
        let mut code = sample();
        code.cost_center = 10_000; // 5 digits, field is 4 wide
        assert_eq!(
            code.validate().unwrap_err(),
            CodeError::Overflow {
                value: 10_000,
                width: 4
            }
        );
    }

    #[test]
    fn test_serde_as_string() {
        let code = sample();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(
            json,
            "\"03-12-01-10203040-0077-0000-0415-120455-0012-20251103-01\""
        );
        let back: UniqueCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
