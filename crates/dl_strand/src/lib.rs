//! The dl_strand crate.
//!
//! Provides the molecule-level representations of dnalab:
//!  - Bases (A, C, G, T and the gap placeholder)
//!  - Sequences
//!  - Strands (two aligned sequences, possibly with overhangs)
//!  - Restriction enzymes
//!
//! Provides the single-molecule reactions:
//!  - denaturation (split), annealing (add_primer),
//!  - polymerization (fill), hybridization (merge),
//!  - restriction cuts (cleave).
//!

mod error;
mod base;
mod sequence;
mod strand;
mod enzyme;

pub use error::*;
pub use base::*;
pub use sequence::*;
pub use strand::*;
pub use enzyme::*;

