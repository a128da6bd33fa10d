/// The relation a [`RangeTree`](crate::RangeTree) query tests keys against.
///
/// Queries take the comparator as a string; [`Comparator::parse`] recognizes
/// exactly `"<="`, `"=="`, and `">="`. Anything else is not an error at the
/// query boundary: [`range_search`](crate::RangeTree::range_search) maps an
/// unrecognized string to an empty result.
///
/// # Examples
///
/// ```
/// use rangetree::Comparator;
///
/// assert_eq!(Comparator::parse(">="), Some(Comparator::GreaterOrEqual));
/// assert_eq!(Comparator::parse("!="), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Comparator {
    /// Match every key less than or equal to the target.
    LessOrEqual,
    /// Match every key equal to the target.
    Equal,
    /// Match every key greater than or equal to the target.
    GreaterOrEqual,
}

impl Comparator {
    /// Parses a comparator string, returning `None` for anything other than
    /// `"<="`, `"=="`, or `">="`.
    #[must_use]
    pub fn parse(comparator: &str) -> Option<Self> {
        match comparator {
            "<=" => Some(Self::LessOrEqual),
            "==" => Some(Self::Equal),
            ">=" => Some(Self::GreaterOrEqual),
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn recognized_comparators() {
        assert_eq!(Comparator::parse("<="), Some(Comparator::LessOrEqual));
        assert_eq!(Comparator::parse("=="), Some(Comparator::Equal));
        assert_eq!(Comparator::parse(">="), Some(Comparator::GreaterOrEqual));
    }

    #[test]
    fn unrecognized_comparators() {
        for s in ["", "<", ">", "=", "!=", "<>", " <=", "<= ", "≥"] {
            assert_eq!(Comparator::parse(s), None, "{s:?} should not parse");
        }
    }
}
