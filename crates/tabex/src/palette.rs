//! Color palette management
//!
//! The extended variant stores colors directly, so resolving is the identity.
//! The legacy variant can only reference one of 64 palette slots; the first 8
//! hold fixed system colors and the remaining 56 are either rewritten with
//! the colors a document actually uses (dynamic strategy) or left at their
//! standard values (static strategy).

use tabex_core::{ColorRef, Rgb, PALETTE_RESERVED, PALETTE_SIZE, STANDARD_PALETTE};

use crate::config::{ColorStrategy, FormatVariant};

/// Largest component-sum distance at which an assigned slot is reused
pub const CLOSE_MATCH_TOLERANCE: u32 = 3;

/// Maps layout colors to references the target variant can store
pub trait ColorResolver {
    /// Resolve a color; never fails
    fn resolve(&mut self, rgb: Rgb) -> ColorRef;

    /// Final indexed color table, for variants that have one
    fn entries(&self) -> Option<&[Rgb]>;
}

/// Identity resolver for the extended variant
#[derive(Debug, Default, Clone)]
pub struct ExtendedPalette;

impl ColorResolver for ExtendedPalette {
    fn resolve(&mut self, rgb: Rgb) -> ColorRef {
        ColorRef::Rgb(rgb)
    }

    fn entries(&self) -> Option<&[Rgb]> {
        None
    }
}

/// Resolver for the 64-slot legacy palette
#[derive(Debug, Clone)]
pub struct LegacyPalette {
    strategy: ColorStrategy,
    entries: [Rgb; PALETTE_SIZE],
    next_free: usize,
    fallbacks: usize,
}

impl Default for LegacyPalette {
    fn default() -> Self {
        Self::new(ColorStrategy::Dynamic)
    }
}

impl LegacyPalette {
    /// Create a palette seeded with the standard table
    pub fn new(strategy: ColorStrategy) -> Self {
        Self {
            strategy,
            entries: STANDARD_PALETTE,
            next_free: PALETTE_RESERVED,
            fallbacks: 0,
        }
    }

    /// Next slot the dynamic strategy would allocate
    pub fn next_free(&self) -> usize {
        self.next_free
    }

    /// Whether every reassignable slot has been used
    pub fn is_exhausted(&self) -> bool {
        self.next_free >= PALETTE_SIZE
    }

    /// Slots rewritten by the dynamic strategy
    pub fn allocated(&self) -> usize {
        self.next_free - PALETTE_RESERVED
    }

    /// Number of lookups answered by nearest-color fallback after exhaustion
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }

    fn nearest(&self, rgb: Rgb, limit: usize) -> u8 {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (i, entry) in self.entries[..limit].iter().enumerate() {
            // Strict comparison keeps the lower index on ties
            let d = entry.distance(&rgb);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        best as u8
    }

    fn resolve_dynamic(&mut self, rgb: Rgb) -> u8 {
        if !self.is_exhausted() {
            let candidate = self.nearest(rgb, self.next_free);
            if self.entries[candidate as usize].distance(&rgb) <= CLOSE_MATCH_TOLERANCE {
                return candidate;
            }
            let slot = self.next_free;
            self.entries[slot] = rgb;
            self.next_free += 1;
            return slot as u8;
        }

        let index = self.nearest(rgb, PALETTE_SIZE);
        if self.entries[index as usize] != rgb {
            if self.fallbacks == 0 {
                log::warn!(
                    "{}: palette full, {rgb} mapped to slot {index} ({})",
                    crate::diagnostics::Degradation::PaletteExhausted,
                    self.entries[index as usize]
                );
            }
            self.fallbacks += 1;
        }
        index
    }
}

impl ColorResolver for LegacyPalette {
    fn resolve(&mut self, rgb: Rgb) -> ColorRef {
        let index = match self.strategy {
            ColorStrategy::Dynamic => self.resolve_dynamic(rgb),
            ColorStrategy::Static => self.nearest(rgb, PALETTE_SIZE),
        };
        ColorRef::Indexed(index)
    }

    fn entries(&self) -> Option<&[Rgb]> {
        Some(&self.entries)
    }
}

/// The resolver selected for one session
#[derive(Debug, Clone)]
pub enum ColorPalette {
    Extended(ExtendedPalette),
    Legacy(LegacyPalette),
}

impl ColorPalette {
    /// Pick the resolver for a variant
    pub fn for_variant(variant: FormatVariant, strategy: ColorStrategy) -> Self {
        match variant {
            FormatVariant::Extended => ColorPalette::Extended(ExtendedPalette),
            FormatVariant::Legacy => ColorPalette::Legacy(LegacyPalette::new(strategy)),
        }
    }

    /// Number of nearest-color fallbacks after exhaustion
    pub fn fallback_count(&self) -> usize {
        match self {
            ColorPalette::Extended(_) => 0,
            ColorPalette::Legacy(p) => p.fallback_count(),
        }
    }

    /// Slots rewritten so far, for the legacy variant
    pub fn allocated(&self) -> Option<usize> {
        match self {
            ColorPalette::Extended(_) => None,
            ColorPalette::Legacy(p) => Some(p.allocated()),
        }
    }
}

impl ColorResolver for ColorPalette {
    fn resolve(&mut self, rgb: Rgb) -> ColorRef {
        match self {
            ColorPalette::Extended(p) => p.resolve(rgb),
            ColorPalette::Legacy(p) => p.resolve(rgb),
        }
    }

    fn entries(&self) -> Option<&[Rgb]> {
        match self {
            ColorPalette::Extended(p) => p.entries(),
            ColorPalette::Legacy(p) => p.entries(),
        }
    }
}
