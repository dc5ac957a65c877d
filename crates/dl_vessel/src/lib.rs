//! The dl_vessel crate.
//!
//! A reaction vessel holds a multiset of strands and drives them through
//! the bulk operations of laboratory DNA computing:
//!  - denaturation of every duplex (split)
//!  - randomized hybridization passes (merge)
//!  - PCR cycles (amplify)
//!  - affinity selection (extract)
//!  - restriction digests (cleave)
//!  - length-based sorting and filtering, cleanup of half-built molecules
//!
//! All randomness flows from one seedable source per vessel, see
//! `ReactionConfig`.
//!

mod error;
mod config;
mod vessel;

pub use error::*;
pub use config::*;
pub use vessel::*;

pub use dl_strand::*;
