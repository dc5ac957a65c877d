//! Strand: one (partially) double-stranded molecule.
//!
//! A strand holds two aligned sequences, `top` and `bottom`. Index `i` on
//! the top pairs with index `i` on the bottom. Either side may be shorter
//! than the other (an overhang), start with gap padding (an annealed
//! primer), or be empty altogether (a denatured single strand).
//!
//! ```text
//!   top:    a a a g g g          longer side
//!   bottom: t t t                shorter side, overhang "ggg" exposed
//! ```
//!
//! A strand that has been absorbed by another via `merge` is flagged as
//! consumed. Consumed strands are inert: they never merge, cleave, fill
//! or anneal again, split only into consumed halves, and a vessel never
//! admits them.
//!

use std::fmt;
use log::debug;
use log::trace;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::Base;
use crate::Enzyme;
use crate::Sequence;
use crate::StrandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// Probability that a single polymerized position is miscopied.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CopyErrorRate(f64);

impl CopyErrorRate {
    /// Error-free extension.
    pub const NONE: CopyErrorRate = CopyErrorRate(0.0);

    pub fn new(p: f64) -> Result<Self, StrandError> {
        if (0.0..=1.0).contains(&p) {
            Ok(Self(p))
        } else {
            Err(StrandError::InvalidErrorRate(p))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Roll for a copy error. Never touches `rng` when the rate is zero.
    fn strikes<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        self.0 > 0.0 && rng.random_bool(self.0)
    }
}

impl Default for CopyErrorRate {
    fn default() -> Self {
        Self(1e-4)
    }
}

/// What a call to `fill` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Positions that received a newly polymerized base.
    pub filled: usize,
    /// Of those, positions that were miscopied.
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strand {
    top: Sequence,
    bottom: Sequence,
    #[serde(default)]
    consumed: bool,
}

impl Strand {
    pub fn new(top: Sequence, bottom: Sequence) -> Self {
        Self { top, bottom, consumed: false }
    }

    /// Parse both sides from their literal notation.
    pub fn from_strs(top: &str, bottom: &str) -> Result<Self, StrandError> {
        Ok(Self::new(Sequence::try_from(top)?, Sequence::try_from(bottom)?))
    }

    /// A fully formed duplex: the bottom is the complement of `top`.
    pub fn duplex(top: &str) -> Result<Self, StrandError> {
        let top = Sequence::try_from(top)?;
        let bottom = top.complement();
        Ok(Self::new(top, bottom))
    }

    /// A single strand with an empty bottom, ready for annealing.
    pub fn single(top: &str) -> Result<Self, StrandError> {
        Ok(Self::new(Sequence::try_from(top)?, Sequence::new()))
    }

    pub fn top(&self) -> &Sequence {
        &self.top
    }

    pub fn bottom(&self) -> &Sequence {
        &self.bottom
    }

    pub fn side(&self, side: Side) -> &Sequence {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Sequence {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Total number of bases on both sides, padding excluded.
    pub fn len(&self) -> usize {
        self.top.trimmed_len() + self.bottom.trimmed_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both sides carry the same number of bases: nothing is exposed.
    pub fn is_balanced(&self) -> bool {
        self.top.trimmed_len() == self.bottom.trimmed_len()
    }

    /// Equal-length sides without any gap.
    pub fn is_complete(&self) -> bool {
        !self.top.is_empty()
            && self.top.len() == self.bottom.len()
            && !self.top.has_gaps()
            && !self.bottom.has_gaps()
    }

    /// At least one side carries no base at all.
    pub fn has_empty_side(&self) -> bool {
        self.top.is_blank() || self.bottom.is_blank()
    }

    /// Does `probe` occur literally on either side?
    pub fn has_sequence(&self, probe: &[Base]) -> bool {
        self.top.contains(probe) || self.bottom.contains(probe)
    }

    /// Denaturation: the two sides as separate single strands.
    ///
    /// The halves of a consumed strand are consumed as well.
    pub fn split(&self) -> (Strand, Strand) {
        let half = |top: Sequence, bottom: Sequence| Strand {
            top,
            bottom,
            consumed: self.consumed,
        };
        (
            half(self.top.clone(), Sequence::new()),
            half(Sequence::new(), self.bottom.clone()),
        )
    }

    /// Polymerization with the stochastic copy-error channel.
    ///
    /// Each filled position is independently miscopied with probability
    /// `rate`; see `fill_with`.
    pub fn fill<R: Rng + ?Sized>(&mut self, rate: CopyErrorRate, rng: &mut R) -> FillOutcome {
        self.fill_with(|_| rate.strikes(rng))
    }

    /// Polymerization without copy errors.
    pub fn fill_exact(&mut self) -> FillOutcome {
        self.fill_with(|_| false)
    }

    /// Polymerization with an explicit fault hook.
    ///
    /// Pads the shorter side with gaps, then every gap opposite a base
    /// receives the complement of that base. `miscopy(i)` is asked once
    /// per filled position `i`; on `true` the two symbols at `i` trade
    /// sides. The pair stays complementary, but the encoded base flips.
    ///
    /// A strand with an empty side has nothing to extend from and is left
    /// untouched, as is a consumed strand.
    pub fn fill_with<F>(&mut self, mut miscopy: F) -> FillOutcome
    where
        F: FnMut(usize) -> bool,
    {
        let mut outcome = FillOutcome::default();
        if self.consumed || self.top.is_empty() || self.bottom.is_empty() {
            return outcome;
        }

        let len = self.top.len().max(self.bottom.len());
        let top = self.top.as_mut_vec();
        let bottom = self.bottom.as_mut_vec();
        top.resize(len, Base::Gap);
        bottom.resize(len, Base::Gap);

        for (i, (t, b)) in top.iter_mut().zip(bottom.iter_mut()).enumerate() {
            if t.is_gap() && b.is_nucleotide() {
                *t = b.complement();
            } else if b.is_gap() && t.is_nucleotide() {
                *b = t.complement();
            } else {
                continue;
            }
            outcome.filled += 1;
            if miscopy(i) {
                std::mem::swap(t, b);
                outcome.errors += 1;
            }
        }

        if outcome.errors > 0 {
            debug!("Copy errors: {} of {} filled positions in {}.",
                outcome.errors, outcome.filled, self);
        }
        outcome
    }

    /// Anneal `primer` to a single strand.
    ///
    /// The occupied side is searched for the complement of `primer`. On a
    /// match, the empty side becomes gap padding up to the match offset
    /// followed by the primer, ready for `fill`. Returns false when the
    /// strand is not single-stranded, the primer is empty or gapped, or
    /// there is no binding site.
    pub fn add_primer(&mut self, primer: &Sequence) -> bool {
        if self.consumed || primer.is_empty() || primer.has_gaps() {
            return false;
        }
        let (occupied, free) = match (self.top.is_blank(), self.bottom.is_blank()) {
            (false, true) => (Side::Top, Side::Bottom),
            (true, false) => (Side::Bottom, Side::Top),
            _ => return false,
        };
        let Some(at) = self.side(occupied).find(&primer.complement()) else {
            return false;
        };

        let mut annealed = Sequence::gaps(at);
        annealed.as_mut_vec().extend_from_slice(primer);
        *self.side_mut(free) = annealed;
        true
    }

    /// Hybridize `other` onto this strand's overhang.
    ///
    /// Both strands must expose an overhang (unbalanced). Our overhang is
    /// the part of the longer side beyond the end of the shorter side.
    /// `other` must be blank on that same side across the overhang span,
    /// and its opposite side must start with the exact complement of the
    /// overhang. On success, both of `other`'s sides are appended to ours,
    /// aligned, and `other` is marked consumed. On failure nothing changes.
    pub fn merge(&mut self, other: &mut Strand) -> bool {
        if self.consumed || other.consumed {
            return false;
        }
        if self.is_balanced() || other.is_balanced() {
            return false;
        }

        let (long, short) = if self.top.trimmed_len() > self.bottom.trimmed_len() {
            (Side::Top, Side::Bottom)
        } else {
            (Side::Bottom, Side::Top)
        };

        let start = self.side(short).len();
        let end = self.side(long).content_end();
        if start >= end {
            return false;
        }
        let overhang = &self.side(long)[start..end];
        if overhang.iter().any(|b| b.is_gap()) {
            return false;
        }
        let k = overhang.len();

        if other.side(long).iter().take(k).any(|b| b.is_nucleotide()) {
            return false;
        }
        let Some(partner) = other.side(short).get(..k) else {
            return false;
        };
        if !partner.iter().zip(overhang).all(|(p, o)| p.complement() == *o) {
            return false;
        }

        let short_tail = &other.side(short)[..other.side(short).content_end()];
        let long_end = other.side(long).content_end();
        let long_tail: &[Base] = if long_end > k {
            &other.side(long)[k..long_end]
        } else {
            &[]
        };

        trace!("Merging {} into {}.", other, self);
        let long_seq = self.side_mut(long).as_mut_vec();
        long_seq.truncate(end);
        long_seq.extend_from_slice(long_tail);
        self.side_mut(short).as_mut_vec().extend_from_slice(short_tail);
        other.consumed = true;
        true
    }

    /// Restriction cut.
    ///
    /// Looks up the enzyme's top site on the top side and its bottom site
    /// on the bottom side, independently. The cut lies `cut_offset` bases
    /// downstream of each site. This strand keeps the prefixes, the
    /// returned strand holds the suffixes. A staggered cut leaves the
    /// later-cut side of the fragment padded with leading gaps, so both
    /// sides stay aligned and the sticky end is exposed. `None` if a site
    /// is missing or a cut would fall beyond the end of its side.
    pub fn cleave(&mut self, enzyme: &Enzyme) -> Option<Strand> {
        if self.consumed {
            return None;
        }
        let (top_offset, bottom_offset) = enzyme.cut_offset();
        let top_at = self.top.find(enzyme.top_site())?.checked_add(top_offset)?;
        let bottom_at = self.bottom.find(enzyme.bottom_site())?.checked_add(bottom_offset)?;
        if top_at > self.top.len() || bottom_at > self.bottom.len() {
            return None;
        }

        let first_cut = top_at.min(bottom_at);
        let mut top = Sequence::gaps(top_at - first_cut);
        top.as_mut_vec().append(self.top.split_off(top_at).as_mut_vec());
        let mut bottom = Sequence::gaps(bottom_at - first_cut);
        bottom.as_mut_vec().append(self.bottom.split_off(bottom_at).as_mut_vec());

        let fragment = Strand::new(top, bottom);
        trace!("{} cut {} off {}.", enzyme.name(), fragment, self);
        Some(fragment)
    }
}

impl TryFrom<(&str, &str)> for Strand {
    type Error = StrandError;

    fn try_from((top, bottom): (&str, &str)) -> Result<Self, Self::Error> {
        Strand::from_strs(top, bottom)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}|{})", self.top, self.bottom)
    }
}
