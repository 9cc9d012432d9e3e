//! Pass/fail rule.

/// Outcome of a tallied vote. Displays as the word used in the result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// The change goes through.
    #[display("통과")]
    Accepted,
    /// The change is dropped.
    #[display("부결")]
    Rejected,
}

impl Outcome {
    /// Whether the vote passed.
    pub fn is_accepted(self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// A vote passes with at least `required` approvals and strictly more
/// approvals than rejections.
pub fn decide(yes: usize, no: usize, required: usize) -> Outcome {
    if yes >= required && yes > no {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table() {
        assert_eq!(decide(3, 0, 3), Outcome::Accepted);
        assert_eq!(decide(3, 3, 3), Outcome::Rejected);
        assert_eq!(decide(2, 0, 3), Outcome::Rejected);
        assert_eq!(decide(4, 2, 3), Outcome::Accepted);
    }

    #[test]
    fn ties_above_threshold_fail() {
        assert_eq!(decide(5, 5, 3), Outcome::Rejected);
        assert_eq!(decide(6, 5, 3), Outcome::Accepted);
    }

    #[test]
    fn display_words() {
        assert_eq!(Outcome::Accepted.to_string(), "통과");
        assert_eq!(Outcome::Rejected.to_string(), "부결");
    }
}
