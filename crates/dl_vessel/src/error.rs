use dl_strand::StrandError;
use thiserror::Error;

/// Error type for vessel construction and bulk operations.
#[derive(Debug, Error)]
pub enum VesselError {
    /// An invalid molecule or reaction parameter.
    #[error(transparent)]
    Strand(#[from] StrandError),

    /// A configuration document that could not be read.
    #[error("invalid reaction config: {0}")]
    Config(#[from] serde_json::Error),

    /// Length filter bounds in the wrong order.
    #[error("invalid length range: {lo} > {hi}")]
    InvalidLengthRange { lo: usize, hi: usize },
}
