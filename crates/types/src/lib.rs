//! Shared value types for the intake document workspace.
//!
//! - [`NonEmptyText`] for output file names, which must never be blank.
//! - [`Probability`] for the tunable odds that gate optional document content.
//! - [`document`] for the structured section descriptors handed to a layout engine.

pub mod document;

pub use document::{Block, Document, Inline, ParagraphStyle, Section, Table};

/// Errors that can occur when creating validated value types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The probability was outside `[0, 1]` or not a number
    #[error("Probability must be within [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),
    /// The probability could not be parsed as a number
    #[error("Probability is not a number: {0}")]
    ProbabilityParse(String),
}

/// Trimmed text with at least one visible character.
///
/// Output file names travel through the pipeline as `NonEmptyText`, so the writer
/// never has to handle a blank name. Serialises as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and keeps it if anything is left.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::Empty` for empty or whitespace-only input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A probability guaranteed to lie within `[0, 1]`.
///
/// Optional document content is gated on draws against these values, so keeping the
/// range check in the constructor means a draw can never be asked for an impossible odds
/// value at generation time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    /// Certain inclusion.
    pub const ALWAYS: Probability = Probability(1.0);
    /// Certain exclusion.
    pub const NEVER: Probability = Probability(0.0);

    /// Creates a new `Probability`.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::ProbabilityOutOfRange` for values outside `[0, 1]` and for NaN.
    pub fn new(value: f64) -> Result<Self, TypesError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(TypesError::ProbabilityOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a probability from a whole percentage, saturating at 100.
    pub fn percent(percent: u8) -> Self {
        Self(f64::from(percent.min(100)) / 100.0)
    }

    /// Returns the probability as a plain `f64`.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Probability {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| TypesError::ProbabilityParse(s.to_owned()))?;
        Probability::new(value)
    }
}

impl serde::Serialize for Probability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Smith_John_10162026.pdf  ").unwrap();
        assert_eq!(text.as_str(), "Smith_John_10162026.pdf");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TypesError::Empty)));
    }

    #[test]
    fn test_non_empty_text_serialises_as_string() {
        let text = NonEmptyText::new("CVS-new-meds.md").unwrap();
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"CVS-new-meds.md\"");
    }

    #[test]
    fn test_probability_bounds() {
        assert!(Probability::new(0.0).is_ok());
        assert!(Probability::new(1.0).is_ok());
        assert!(matches!(
            Probability::new(1.01),
            Err(TypesError::ProbabilityOutOfRange(_))
        ));
        assert!(Probability::new(-0.1).is_err());
        assert!(Probability::new(f64::NAN).is_err());
    }

    #[test]
    fn test_probability_percent_saturates() {
        assert_eq!(Probability::percent(15).value(), 0.15);
        assert_eq!(Probability::percent(250), Probability::ALWAYS);
    }

    #[test]
    fn test_probability_from_str() {
        let p: Probability = "0.15".parse().unwrap();
        assert_eq!(p.value(), 0.15);
        assert!(matches!(
            "often".parse::<Probability>(),
            Err(TypesError::ProbabilityParse(_))
        ));
    }
}
