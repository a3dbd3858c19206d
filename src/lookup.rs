//! Builds and owns the dense LFSR-state → cycle-index lookup table for a timecode variant.

use crate::error::Error;
use crate::format::{self, Polarity, TimecodeDef};
use crate::lfsr::{fwd, rev};
use std::sync::Arc;

/// A variant descriptor plus its populated lookup table.
///
/// Immutable once built. Shared read-only (via [`Arc`]) by every [`crate::Decoder`] bound to the
/// same variant.
#[derive(Debug)]
pub struct Lookup {
    def: &'static TimecodeDef,
    table: Vec<Option<u32>>,
}

impl Lookup {
    /// Resolve an observed LFSR state to its cycle index, if it is one of the `length` states
    /// reachable from the seed.
    pub fn get(&self, state: u32) -> Option<u32> {
        self.table.get(state as usize).copied().flatten()
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn bits(&self) -> usize {
        self.def.bits
    }

    pub fn taps(&self) -> u32 {
        self.def.taps
    }

    pub fn seed(&self) -> u32 {
        self.def.seed
    }

    pub fn polarity(&self) -> Polarity {
        self.def.polarity
    }

    pub fn resolution(&self) -> u32 {
        self.def.resolution
    }

    pub fn length(&self) -> u32 {
        self.def.length
    }

    pub fn safe(&self) -> u32 {
        self.def.safe
    }
}

/// Build and share the lookup table for the named variant.
///
/// Fails with [`Error::UnknownVariant`] if `name` isn't in the registry, or with
/// [`Error::LfsrWrapped`] if the variant's `length` exceeds the actual LFSR cycle (or the reverse
/// LFSR doesn't invert the forward one at the seed, closing the open question the reference
/// implementation left unchecked at boot).
pub fn build_lookup(name: &str) -> Result<Arc<Lookup>, Error> {
    let def = format::find(name).ok_or_else(|| Error::UnknownVariant(name.to_string()))?;

    if rev(def.bits, fwd(def.bits, def.seed, def.taps), def.taps) != def.seed
        || fwd(def.bits, rev(def.bits, def.seed, def.taps), def.taps) != def.seed
    {
        log::warn!("variant {}: forward/reverse LFSR are not inverses at seed", def.name);
        return Err(Error::LfsrWrapped);
    }

    let table_len = 1usize << def.bits;
    let mut table = vec![None; table_len];

    let mut current = def.seed;
    for n in 0..def.length {
        let slot = &mut table[current as usize];
        if slot.is_some() {
            log::warn!(
                "variant {}: LFSR wrapped after {} of {} requested cycles",
                def.name,
                n,
                def.length
            );
            return Err(Error::LfsrWrapped);
        }
        *slot = Some(n);
        current = fwd(def.bits, current, def.taps);
    }

    log::info!(
        "built lookup table for variant {} ({} cycles, {} bits)",
        def.name,
        def.length,
        def.bits
    );

    Ok(Arc::new(Lookup { def, table }))
}
