//! Sequence: an ordered run of bases on one side of a strand.
//!
//! Sequences are oriented so that equal indices on the two sides of a
//! strand are meant to pair. Complementing substitutes every symbol and
//! never reverses the order.
//!
//! Gaps may appear anywhere, but in practice they only show up as
//! leading padding (a primer annealed downstream of the start) or as
//! trailing padding (a side extended to match its partner's length).
//!

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::Base;
use crate::StrandError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sequence(Vec<Base>);

impl Sequence {
    /// The empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// `n` gap symbols.
    pub fn gaps(n: usize) -> Self {
        Self(vec![Base::Gap; n])
    }

    /// A sequence of `len` uniformly drawn nucleotides.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self((0..len).map(|_| Base::random(rng)).collect())
    }

    pub fn complement(&self) -> Self {
        Self(self.0.iter().map(|b| b.complement()).collect())
    }

    /// First offset at which `probe` occurs. The empty probe matches at 0.
    pub fn find(&self, probe: &[Base]) -> Option<usize> {
        if probe.is_empty() {
            return Some(0);
        }
        self.0.windows(probe.len()).position(|w| w == probe)
    }

    pub fn contains(&self, probe: &[Base]) -> bool {
        self.find(probe).is_some()
    }

    /// The content without leading and trailing gaps.
    pub fn trimmed(&self) -> &[Base] {
        let start = self.leading_gaps();
        let end = self.content_end().max(start);
        &self.0[start..end]
    }

    pub fn trimmed_len(&self) -> usize {
        self.trimmed().len()
    }

    /// Number of gap symbols before the first nucleotide.
    pub fn leading_gaps(&self) -> usize {
        self.0.iter().take_while(|b| b.is_gap()).count()
    }

    /// Index one past the last nucleotide (0 for a blank sequence).
    pub fn content_end(&self) -> usize {
        self.0.iter().rposition(|b| b.is_nucleotide()).map_or(0, |i| i + 1)
    }

    /// Empty, or gaps only.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|b| b.is_gap())
    }

    pub fn has_gaps(&self) -> bool {
        self.0.iter().any(|b| b.is_gap())
    }

    pub fn as_slice(&self) -> &[Base] {
        &self.0
    }

    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<Base> {
        &mut self.0
    }

    /// Split at `at`: `self` keeps `[0, at)`, the rest is returned.
    pub(crate) fn split_off(&mut self, at: usize) -> Sequence {
        Sequence(self.0.split_off(at))
    }
}

/// The complement of a literal sequence string, in the same notation.
///
/// Used by problem encoders to precompute the fragments that should
/// hybridize with a given sequence.
pub fn complement_str(s: &str) -> Result<String, StrandError> {
    Ok(Sequence::try_from(s)?.complement().to_string())
}

impl Deref for Sequence {
    type Target = [Base];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Base>> for Sequence {
    fn from(bases: Vec<Base>) -> Self {
        Self(bases)
    }
}

impl From<&[Base]> for Sequence {
    fn from(bases: &[Base]) -> Self {
        Self(bases.to_vec())
    }
}

impl FromIterator<Base> for Sequence {
    fn from_iter<I: IntoIterator<Item = Base>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<&str> for Sequence {
    type Error = StrandError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.chars()
            .enumerate()
            .map(|(position, c)| {
                Base::try_from(c).map_err(|_| StrandError::InvalidBase { symbol: c, position })
            })
            .collect()
    }
}

impl TryFrom<String> for Sequence {
    type Error = StrandError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Sequence::try_from(s.as_str())
    }
}

impl FromStr for Sequence {
    type Err = StrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sequence::try_from(s)
    }
}

impl From<Sequence> for String {
    fn from(seq: Sequence) -> Self {
        seq.to_string()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}
