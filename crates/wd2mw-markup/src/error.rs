//! Error types for markup conversion.

/// Error that aborts the conversion of a single document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A line inside a `||` table run starts with neither `||` nor `||~`.
    #[error("malformed table at line {line}: {content:?} does not start with a cell marker")]
    MalformedTable {
        /// 1-based line number in the document.
        line: usize,
        /// The offending line.
        content: String,
    },
}
