//! Vessel: the reaction container.
//!
//! Strands live in a flat, growable store. Operations that absorb strands
//! (merge) only flag the absorbed ones as consumed, and a compaction step
//! at the end of the pass drops them. No strand is ever referenced across
//! passes, so ownership stays with the vessel. Consumed strands are
//! turned away at every entry point.
//!
//! Typical pipeline for a single molecule:
//!
//! ```text
//!   single strand -> primer annealed -> filled duplex -> merged
//!                                                     -> consumed | retained
//! ```
//!

use std::fmt;
use ahash::AHashMap;
use itertools::Itertools;
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use dl_strand::Base;
use dl_strand::CopyErrorRate;
use dl_strand::Enzyme;
use dl_strand::Sequence;
use dl_strand::Strand;

use crate::ReactionConfig;
use crate::VesselError;

pub struct Vessel {
    strands: Vec<Strand>,
    config: ReactionConfig,
    copy_error: CopyErrorRate,
    rng: StdRng,
}

impl Vessel {
    /// A vessel with the default reaction configuration.
    pub fn new(strands: Vec<Strand>) -> Self {
        let config = ReactionConfig::default();
        Self {
            strands: live(strands),
            rng: config.rng(),
            copy_error: CopyErrorRate::default(),
            config,
        }
    }

    pub fn with_config(strands: Vec<Strand>, config: ReactionConfig) -> Result<Self, VesselError> {
        let copy_error = config.copy_error()?;
        Ok(Self {
            strands: live(strands),
            rng: config.rng(),
            copy_error,
            config,
        })
    }

    /// A sibling vessel sharing our configuration. Its random source is
    /// drawn from ours, so seeded runs stay reproducible.
    fn sibling(&mut self, strands: Vec<Strand>) -> Vessel {
        Vessel {
            strands,
            config: self.config.clone(),
            copy_error: self.copy_error,
            rng: StdRng::from_rng(&mut self.rng),
        }
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn into_strands(self) -> Vec<Strand> {
        self.strands
    }

    pub fn len(&self) -> usize {
        self.strands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strands.is_empty()
    }

    /// Add a strand. A consumed strand is ignored.
    pub fn push(&mut self, strand: Strand) {
        if strand.is_consumed() {
            debug!("Ignoring consumed strand {strand}.");
            return;
        }
        self.strands.push(strand);
    }

    /// Pour the contents of `other` into this vessel.
    pub fn absorb(&mut self, other: Vessel) {
        self.strands.extend(live(other.strands));
    }

    /// Denature every strand; the vessel now holds the single-stranded halves.
    pub fn split(&mut self) {
        self.strands = self.strands
            .iter()
            .filter(|s| !s.is_consumed())
            .flat_map(|s| {
                let (top, bottom) = s.split();
                [top, bottom]
            })
            .collect();
    }

    /// One hybridization pass.
    ///
    /// Every live strand, in vessel order, tries to absorb every other live
    /// strand, visiting candidates in a freshly shuffled order. A strand
    /// keeps growing while the pass runs, so one pass can chain several
    /// fragments. Consumed strands are dropped afterwards. Returns the
    /// number of successful merges.
    pub fn merge(&mut self) -> usize {
        let n = self.strands.len();
        let mut order: Vec<usize> = (0..n).collect();
        let mut merges = 0;

        for i in 0..n {
            if self.strands[i].is_consumed() {
                continue;
            }
            order.shuffle(&mut self.rng);
            for &j in &order {
                if j == i || self.strands[j].is_consumed() {
                    continue;
                }
                let (dna, connector) = pair_mut(&mut self.strands, i, j);
                if dna.merge(connector) {
                    merges += 1;
                }
            }
        }

        self.strands.retain(|s| !s.is_consumed());
        debug!("Merge pass: {merges} merges, {n} -> {} strands.", self.strands.len());
        merges
    }

    /// Extension followed by one merge pass.
    ///
    /// Every live strand is filled with the vessel's copy error rate, then
    /// the extended strands hybridize. Returns the number of merges.
    pub fn polymerase(&mut self) -> usize {
        let mut filled = 0;
        let mut errors = 0;
        for strand in self.strands.iter_mut().filter(|s| !s.is_consumed()) {
            let outcome = strand.fill(self.copy_error, &mut self.rng);
            filled += outcome.filled;
            errors += outcome.errors;
        }
        debug!("Polymerase: {filled} positions filled, {errors} copy errors.");
        self.merge()
    }

    /// PCR.
    ///
    /// Each round denatures everything, anneals the first matching primer
    /// to each single strand, extends, runs one merge pass and cleans up.
    /// Single strands that anneal no primer cannot be extended; they fail
    /// to amplify and are discarded before extension.
    pub fn amplify(&mut self, primers: &[Sequence], rounds: usize) {
        for round in 1..=rounds {
            self.split();

            let denatured = self.strands.len();
            self.strands.retain_mut(|s| primers.iter().any(|p| s.add_primer(p)));
            let unprimed = denatured - self.strands.len();

            let mut errors = 0;
            for strand in &mut self.strands {
                errors += strand.fill(self.copy_error, &mut self.rng).errors;
            }

            self.merge();
            self.cleanup();
            debug!("Amplification round {round}/{rounds}: {} strands ({unprimed} unprimed, {errors} copy errors).",
                self.strands.len());
        }
    }

    /// Affinity selection.
    ///
    /// Strands carrying `probe` stay in the vessel; all others are
    /// returned in a new vessel, which can itself be probed again.
    pub fn extract(&mut self, probe: &[Base]) -> Vessel {
        let (kept, removed): (Vec<Strand>, Vec<Strand>) = std::mem::take(&mut self.strands)
            .into_iter()
            .partition(|s| s.has_sequence(probe));
        debug!("Extract: {} kept, {} removed.", kept.len(), removed.len());
        self.strands = kept;
        self.sibling(removed)
    }

    /// Restriction digest of every strand. Fragments join the vessel.
    /// Returns the number of cuts.
    pub fn cleave(&mut self, enzyme: &Enzyme) -> usize {
        let fragments: Vec<Strand> = self.strands
            .iter_mut()
            .filter_map(|s| s.cleave(enzyme))
            .collect();
        let cuts = fragments.len();
        self.strands.extend(fragments);
        debug!("{} digest: {cuts} cuts.", enzyme.name());
        cuts
    }

    /// Stable sort by strand length, shortest first.
    pub fn length_sort(&mut self) {
        self.strands.sort_by_key(Strand::len);
    }

    /// Keep strands whose length lies in `[lo, hi]`. Returns the number removed.
    pub fn filter_by_length(&mut self, lo: usize, hi: usize) -> Result<usize, VesselError> {
        if lo > hi {
            return Err(VesselError::InvalidLengthRange { lo, hi });
        }
        let before = self.strands.len();
        self.strands.retain(|s| (lo..=hi).contains(&s.len()));
        Ok(before - self.strands.len())
    }

    /// Drop every strand with a side that carries no base. Returns the
    /// number removed.
    pub fn cleanup(&mut self) -> usize {
        let before = self.strands.len();
        self.strands.retain(|s| !s.is_consumed() && !s.has_empty_side());
        before - self.strands.len()
    }

    /// Multiplicity of each distinct (top, bottom) molecule.
    pub fn census(&self) -> AHashMap<(Sequence, Sequence), usize> {
        let mut counts = AHashMap::default();
        for s in &self.strands {
            *counts.entry((s.top().clone(), s.bottom().clone())).or_insert(0) += 1;
        }
        counts
    }
}

fn live(mut strands: Vec<Strand>) -> Vec<Strand> {
    let before = strands.len();
    strands.retain(|s| !s.is_consumed());
    if strands.len() < before {
        debug!("Ignoring {} consumed strands.", before - strands.len());
    }
    strands
}

/// Two distinct mutable strands out of one store.
fn pair_mut(strands: &mut [Strand], i: usize, j: usize) -> (&mut Strand, &mut Strand) {
    debug_assert!(i != j);
    if i < j {
        let (head, tail) = strands.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = strands.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

impl fmt::Display for Vessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.strands.iter().join(", "))
    }
}

impl fmt::Debug for Vessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vessel")
            .field("strands", &self.strands)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn seq(s: &str) -> Sequence {
        Sequence::try_from(s).unwrap()
    }

    fn strand(top: &str, bottom: &str) -> Strand {
        Strand::from_strs(top, bottom).unwrap()
    }

    fn exact(seed: u64) -> ReactionConfig {
        ReactionConfig::default()
            .with_seed(seed)
            .with_copy_error_rate(0.0)
    }

    fn vessel(strands: Vec<Strand>, seed: u64) -> Vessel {
        Vessel::with_config(strands, exact(seed)).unwrap()
    }

    #[test]
    fn test_with_config_validates() {
        let config = ReactionConfig::default().with_copy_error_rate(-1.0);
        assert!(Vessel::with_config(vec![], config).is_err());
        assert!(Vessel::new(vec![]).is_empty());
    }

    #[test]
    fn test_consumed_strands_stay_out() {
        init_logger();
        let (mut a, mut b) = Strand::duplex("acg").unwrap().split();
        assert!(a.merge(&mut b));
        assert!(b.is_consumed());

        let mut v = vessel(vec![b.clone()], 0);
        assert!(v.is_empty());
        v.split();
        assert!(v.is_empty());

        assert_eq!(Vessel::new(vec![b.clone(), a.clone()]).strands(), &[a.clone()]);
        v.push(b.clone());
        assert!(v.is_empty());
        v.push(a.clone());
        v.absorb(Vessel::new(vec![b]));
        assert_eq!(v.strands(), &[a]);

        v.split();
        assert_eq!(v.strands(), &[strand("acg", ""), strand("", "tgc")]);
        assert!(v.strands().iter().all(|s| !s.is_consumed()));
    }

    #[test]
    fn test_polymerase_extends_then_hybridizes() {
        init_logger();
        for seed in 0..10 {
            let mut primed = strand("aaagggccc", "");
            assert!(primed.add_primer(&seq("ttt")));
            // sticky single strands pair up after extension
            let mut v = vessel(vec![primed, strand("tttt", ""), strand("", "aaaa")], seed);
            assert_eq!(v.polymerase(), 1, "seed {seed}");
            assert_eq!(v.strands(), &[
                Strand::duplex("aaagggccc").unwrap(),
                strand("tttt", "aaaa"),
            ]);
        }

        // consumed strands are neither extended nor merged
        let (mut a, mut b) = Strand::duplex("acg").unwrap().split();
        assert!(a.merge(&mut b));
        let mut v = vessel(vec![strand("acgt", "t")], 0);
        v.push(b);
        assert_eq!(v.polymerase(), 0);
        assert_eq!(v.strands(), &[Strand::duplex("acgt").unwrap()]);
    }

    #[test]
    fn test_split() {
        let mut v = vessel(vec![strand("aaa", "ttt"), strand("gg", "cc")], 0);
        v.split();
        assert_eq!(v.strands(), &[
            strand("aaa", ""), strand("", "ttt"),
            strand("gg", ""), strand("", "cc"),
        ]);
    }

    #[test]
    fn test_merge_rehybridizes_halves() {
        init_logger();
        for seed in 0..10 {
            let mut v = vessel(vec![Strand::duplex("acgtt").unwrap()], seed);
            v.split();
            assert_eq!(v.merge(), 1);
            assert_eq!(v.strands(), &[Strand::duplex("acgtt").unwrap()]);
        }
    }

    #[test]
    fn test_merge_chains_fragments() {
        init_logger();
        let expected = strand("aaagggccccc", "tttcccggggg");
        for seed in 0..20 {
            let mut v = vessel(vec![
                strand("aaaggg", "ttt"),
                strand("---cc", "cccggggg"),
                strand("ccc", ""),
            ], seed);
            let mut passes = 0;
            while v.len() > 1 && passes < 2 {
                v.merge();
                passes += 1;
            }
            assert_eq!(v.strands(), &[expected.clone()], "seed {seed}");
        }
    }

    #[test]
    fn test_merge_without_partners() {
        let strands = vec![strand("aaa", "ttt"), strand("ggg", ""), strand("aaa", "")];
        let mut v = vessel(strands.clone(), 3);
        assert_eq!(v.merge(), 0);
        assert_eq!(v.strands(), strands.as_slice());
    }

    #[test]
    fn test_simple_duplex_assembly() {
        init_logger();
        let mut v = vessel(vec![
            strand("aaa", "ttt"),
            strand("aaa", "ttt"),
            strand("aaa", "ttt"),
            strand("ggg", "ccc"),
        ], 11);
        v.amplify(&[seq("a"), seq("t")], 2);

        assert!(!v.is_empty());
        for s in v.strands() {
            assert_eq!(s.top().len(), s.bottom().len());
            assert!(s.is_complete());
            assert!(!s.has_sequence(&seq("ggg")));
        }
        assert_eq!(v.census().get(&(seq("aaa"), seq("ttt"))), Some(&12));
    }

    #[test]
    fn test_amplification_growth() {
        init_logger();
        let template = Strand::duplex("ccatgacgta").unwrap();
        for rounds in 0..5 {
            let mut v = vessel(vec![template.clone()], 5);
            v.amplify(&[seq("tac"), seq("acg")], rounds);
            assert!(v.len() <= 1 << rounds);
            assert_eq!(v.len(), 1 << rounds);
            assert!(v.strands().iter().all(|s| s == &template));
        }
    }

    #[test]
    fn test_amplify_purges_unprimed() {
        let mut v = vessel(vec![Strand::duplex("gggccc").unwrap()], 5);
        v.amplify(&[seq("a")], 1);
        assert!(v.is_empty());
    }

    #[test]
    fn test_amplify_reproducible_with_copy_errors() {
        init_logger();
        let config = ReactionConfig::default()
            .with_seed(2024)
            .with_copy_error_rate(0.05);
        let template = vec![Strand::duplex("acgtacgtacgtacgt").unwrap()];
        let run = || {
            let mut v = Vessel::with_config(template.clone(), config.clone()).unwrap();
            v.amplify(&[seq("t"), seq("a")], 4);
            v.into_strands()
        };
        let first = run();
        assert_eq!(first, run());
        assert!(first.iter().any(|s| s != &template[0]));
        assert!(first.iter().all(|s| s.is_complete()));
    }

    #[test]
    fn test_extract() {
        let mut v = vessel(vec![strand("aaattt", "tttaaa"), strand("gggccc", "cccggg")], 0);
        let removed = v.extract(&seq("ttt"));
        assert_eq!(v.strands(), &[strand("aaattt", "tttaaa")]);
        assert_eq!(removed.strands(), &[strand("gggccc", "cccggg")]);
        assert_eq!(removed.config(), v.config());
    }

    #[test]
    fn test_extract_chain_keeps_clause_matches() {
        // keep strands carrying at least one of x, y, z
        let (x, y, z) = (seq("aacc"), seq("ggtt"), seq("cgcg"));
        let mut v = vessel(vec![
            Strand::duplex("aacctttt").unwrap(),
            Strand::duplex("ttttggtt").unwrap(),
            Strand::duplex("cgcgaaaa").unwrap(),
            Strand::duplex("atatatat").unwrap(),
        ], 0);

        let mut leftovers1 = v.extract(&x);
        let mut leftovers2 = leftovers1.extract(&y);
        let rejected = leftovers2.extract(&z);
        v.absorb(leftovers1);
        v.absorb(leftovers2);

        assert_eq!(v.len(), 3);
        assert_eq!(rejected.strands(), &[Strand::duplex("atatatat").unwrap()]);
        assert!(v.strands().iter().all(|s| [&x, &y, &z].iter().any(|p| s.has_sequence(p))));
    }

    #[test]
    fn test_cleave_pass() {
        let enzyme = Enzyme::from_site("site", "ggatg").unwrap();
        let mut v = vessel(vec![
            Strand::duplex("aaggatgcc").unwrap(),
            Strand::duplex("aaaacccc").unwrap(),
        ], 0);
        assert_eq!(v.cleave(&enzyme), 1);
        assert_eq!(v.strands(), &[
            strand("aa", "tt"),
            Strand::duplex("aaaacccc").unwrap(),
            strand("ggatgcc", "cctacgg"),
        ]);
    }

    #[test]
    fn test_cleave_then_ligate() {
        // Staggered cut exposes "ac" on the fragment's top side; the
        // adapter's bottom overhang "tg" captures it.
        let enzyme = Enzyme::from_site("fok", "ggatg").unwrap().with_cut_offset(6, 8);
        let mut input = Strand::duplex("ggatgtacggtttt").unwrap();
        let fragment = input.cleave(&enzyme).unwrap();
        assert_eq!(input, strand("ggatgt", "cctacatg"));
        assert_eq!(fragment, strand("acggtttt", "--ccaaaa"));

        let mut v = vessel(vec![strand("gg", "cctg")], 8);
        v.push(fragment);
        assert_eq!(v.merge(), 1);
        assert_eq!(v.strands(), &[Strand::duplex("ggacggtttt").unwrap()]);
    }

    #[test]
    fn test_length_sort_and_filter() {
        let mut v = vessel(vec![
            strand("aaaa", "tttt"),
            strand("a", "t"),
            strand("aa", ""),
            strand("aaa", "ttt"),
        ], 0);
        v.length_sort();
        let lengths: Vec<usize> = v.strands().iter().map(Strand::len).collect();
        assert_eq!(lengths, vec![2, 2, 6, 8]);
        assert_eq!(v.strands()[0], strand("a", "t"));

        assert_eq!(v.filter_by_length(3, 6).unwrap(), 3);
        assert_eq!(v.strands(), &[strand("aaa", "ttt")]);

        assert!(matches!(
            v.filter_by_length(5, 4),
            Err(VesselError::InvalidLengthRange { lo: 5, hi: 4 })
        ));
    }

    #[test]
    fn test_cleanup() {
        let mut v = vessel(vec![
            strand("aaa", "ttt"),
            strand("aaa", ""),
            strand("---", "ttt"),
            strand("", ""),
        ], 0);
        assert_eq!(v.cleanup(), 3);
        assert_eq!(v.strands(), &[strand("aaa", "ttt")]);
    }

    #[test]
    fn test_display() {
        let v = vessel(vec![strand("ac", "tg"), strand("g", "")], 0);
        assert_eq!(v.to_string(), "[(ac|tg), (g|)]");
    }
}

