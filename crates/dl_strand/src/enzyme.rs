//! Restriction enzymes.
//!
//! An enzyme recognizes one site on the top side and one on the bottom
//! side. The two are searched independently, so their offsets need not
//! coincide, and each side is cut a fixed distance downstream of its own
//! site. A zero offset cuts right at the start of the site; type IIS
//! enzymes such as FokI cut several bases further down.
//!
//! Sites must be non-empty runs of nucleotides: an empty site would
//! match every strand at offset 0.
//!

use serde::Deserialize;
use serde::Serialize;

use crate::Sequence;
use crate::StrandError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnzymeRecord")]
pub struct Enzyme {
    name: String,
    top_site: Sequence,
    bottom_site: Sequence,
    cut_offset: (usize, usize),
}

/// Unvalidated on-disk form of an `Enzyme`.
#[derive(Deserialize)]
struct EnzymeRecord {
    name: String,
    top_site: Sequence,
    bottom_site: Sequence,
    #[serde(default)]
    cut_offset: (usize, usize),
}

impl TryFrom<EnzymeRecord> for Enzyme {
    type Error = StrandError;

    fn try_from(r: EnzymeRecord) -> Result<Self, Self::Error> {
        let (top, bottom) = r.cut_offset;
        Ok(Enzyme::with_sites(&r.name, r.top_site, r.bottom_site)?.with_cut_offset(top, bottom))
    }
}

fn check_site(name: &str, site: &Sequence) -> Result<(), StrandError> {
    if site.is_empty() || site.has_gaps() {
        return Err(StrandError::InvalidSite {
            enzyme: name.to_string(),
            site: site.to_string(),
        });
    }
    Ok(())
}

impl Enzyme {
    /// An enzyme binding `site` on the top and its complement on the bottom.
    pub fn new(name: &str, site: Sequence) -> Result<Self, StrandError> {
        let bottom_site = site.complement();
        Self::with_sites(name, site, bottom_site)
    }

    /// An enzyme with independently chosen top and bottom sites.
    pub fn with_sites(name: &str, top_site: Sequence, bottom_site: Sequence) -> Result<Self, StrandError> {
        check_site(name, &top_site)?;
        check_site(name, &bottom_site)?;
        Ok(Self {
            name: name.to_string(),
            top_site,
            bottom_site,
            cut_offset: (0, 0),
        })
    }

    pub fn from_site(name: &str, site: &str) -> Result<Self, StrandError> {
        Self::new(name, Sequence::try_from(site)?)
    }

    /// Cut `top` bases after the top site starts, `bottom` bases after the
    /// bottom site starts.
    pub fn with_cut_offset(mut self, top: usize, bottom: usize) -> Self {
        self.cut_offset = (top, bottom);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_site(&self) -> &Sequence {
        &self.top_site
    }

    pub fn bottom_site(&self) -> &Sequence {
        &self.bottom_site
    }

    pub fn cut_offset(&self) -> (usize, usize) {
        self.cut_offset
    }
}
