/// Result of comparing an arrangement with the canonical order.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Exact, case-sensitive, position-by-position comparison.
pub fn validate(canonical: &[String], arrangement: &[String]) -> Outcome {
    if canonical == arrangement {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}
