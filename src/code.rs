use crate::config::{MAX_COPIES, MIN_COPIES};
use crate::error::ValidationError;
use std::fmt;

/// Opaque label payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// Builds a code from user input, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Splits pasted or scanned input into codes, one per line.
    ///
    /// Blank lines are skipped; order is preserved.
    pub fn parse_list(input: &str) -> Vec<Code> {
        input.lines().filter_map(|line| Code::new(line).ok()).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Copy count accepted by the dispatcher (1..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Copies(u32);

impl Copies {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(MIN_COPIES..=MAX_COPIES).contains(&value) {
            return Err(ValidationError::Copies {
                value,
                min: MIN_COPIES,
                max: MAX_COPIES,
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Copies {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Copies::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_trims() {
        let code = Code::new("  0104600000000001\r").unwrap();
        assert_eq!(code.as_str(), "0104600000000001");
    }

    #[test]
    fn test_empty_code_rejected() {
        assert_eq!(Code::new("   "), Err(ValidationError::EmptyCode));
    }

    #[test]
    fn test_parse_list_skips_blank_lines() {
        let codes = Code::parse_list("A1\n\n  B2  \n\t\nC3");
        let codes: Vec<&str> = codes.iter().map(Code::as_str).collect();
        assert_eq!(codes, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn test_copies_bounds() {
        assert!(Copies::new(0).is_err());
        assert!(Copies::new(101).is_err());
        assert_eq!(Copies::new(1).unwrap().get(), 1);
        assert_eq!(Copies::new(100).unwrap().get(), 100);
    }
}
