use thiserror::Error;

/// Convenient `Result` alias for fallible `rangetree` operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by this crate.
///
/// The taxonomy is deliberately tiny: the branching factor is the only
/// configuration a tree has, and construction is the only operation that can
/// fail. Queries with a malformed comparator return an empty result instead
/// of an error, so callers cannot distinguish "no matches" from "bad query".
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested branching factor cannot form a valid B+ tree.
    ///
    /// A branching factor of two or less leaves no room to split a node into
    /// two non-empty halves around a promoted key.
    #[error("invalid branching factor {0}, must be greater than 2")]
    InvalidBranchingFactor(usize),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display() {
        let error = Error::InvalidBranchingFactor(2);
        assert_eq!(format!("{error}"), "invalid branching factor 2, must be greater than 2");
    }
}
