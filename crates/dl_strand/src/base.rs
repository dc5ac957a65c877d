//! Base alphabet and the Watson-Crick pairing rules.
//!
//! The alphabet is closed: four nucleotides plus `Gap`, which marks a
//! position that has been padded for alignment but carries no base yet.
//! `Gap` pairs with itself, so complementing stays an involution over the
//! whole alphabet.
//!

use std::fmt;
use rand::Rng;

use crate::StrandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base {
    A,
    C,
    G,
    T,
    Gap,
}

/// The four nucleotides, without the gap placeholder.
pub const NUCLEOTIDES: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

impl Base {
    /// The pairing partner: A-T, C-G, and Gap with itself.
    pub fn complement(self) -> Base {
        match self {
            Base::A => Base::T,
            Base::T => Base::A,
            Base::C => Base::G,
            Base::G => Base::C,
            Base::Gap => Base::Gap,
        }
    }

    pub fn is_gap(self) -> bool {
        self == Base::Gap
    }

    /// True for A, C, G and T.
    pub fn is_nucleotide(self) -> bool {
        !self.is_gap()
    }

    /// Draw a uniformly random nucleotide (never a gap).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Base {
        NUCLEOTIDES[rng.random_range(0..NUCLEOTIDES.len())]
    }
}

impl TryFrom<char> for Base {
    type Error = StrandError;

    /// Position is unknown here and reported as 0; `Sequence` parsing
    /// fills in the real index.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'a' | 'A' => Ok(Base::A),
            'c' | 'C' => Ok(Base::C),
            'g' | 'G' => Ok(Base::G),
            't' | 'T' => Ok(Base::T),
            ' ' | '-' | '.' => Ok(Base::Gap),
            _ => Err(StrandError::InvalidBase { symbol: c, position: 0 }),
        }
    }
}

impl From<Base> for char {
    fn from(b: Base) -> Self {
        match b {
            Base::A => 'a',
            Base::C => 'c',
            Base::G => 'g',
            Base::T => 't',
            Base::Gap => '-',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}
