use thiserror::Error;

/// Error type for malformed molecule descriptions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrandError {
    /// A character that is neither a base nor a gap symbol.
    #[error("invalid base '{symbol}' at position {position}")]
    InvalidBase { symbol: char, position: usize },

    /// A copy error probability outside of [0, 1].
    #[error("copy error rate {0} is not a probability")]
    InvalidErrorRate(f64),

    /// A recognition site that is empty or contains gaps.
    #[error("invalid recognition site '{site}' for enzyme {enzyme}")]
    InvalidSite { enzyme: String, site: String },
}

