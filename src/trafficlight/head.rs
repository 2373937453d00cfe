/*
 * A signal head: the lamps of one light, described as a table from aspect to
 * lamp levels. One type covers both the three-lamp traffic head and the
 * two-lamp pedestrian head; only the table and the line count differ.
 *
 * Levels here are logical, `true` meaning lit. Whether a lamp is active-high
 * or active-low is the business of whoever implements `OutputLines`.
 */

use core::marker::PhantomData;
use enum_ordinalize::Ordinalize;

use super::Aspect;
use super::crossing::CrossingAspect;

/// Drives the physical lines of one head. Must not fail.
pub trait OutputLines<const N: usize> {
    fn drive(&mut self, levels: [bool; N]);
}

/// A head with nothing wired to it.
impl<const N: usize> OutputLines<N> for () {
    fn drive(&mut self, _levels: [bool; N]) {}
}

impl<const N: usize, L: OutputLines<N> + ?Sized> OutputLines<N> for &mut L {
    fn drive(&mut self, levels: [bool; N]) {
        (**self).drive(levels)
    }
}

#[derive(Debug)]
pub struct SignalHead<S, const N: usize> {
    table: &'static [[bool; N]],
    _aspects: PhantomData<S>,
}

// Manual impls: a derive would needlessly require `S: Copy`.
impl<S, const N: usize> Clone for SignalHead<S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, const N: usize> Copy for SignalHead<S, N> {}

impl<S, const N: usize> SignalHead<S, N>
where
    S: Ordinalize<VariantType = usize>,
{
    /// `table` is indexed by aspect ordinal and must cover every aspect.
    pub const fn new(table: &'static [[bool; N]]) -> Self {
        assert!(
            table.len() == S::VARIANT_COUNT,
            "signal head table must have one row per aspect"
        );
        SignalHead {
            table,
            _aspects: PhantomData,
        }
    }

    pub fn set(&self, aspect: S) -> [bool; N] {
        self.table[aspect.ordinal()]
    }

    pub const fn lines(&self) -> usize {
        N
    }
}

// Red, amber, green.
pub const WAY_HEAD: SignalHead<Aspect, 3> = SignalHead::new(&[
    [true, false, false], // Red
    [true, true, false],  // RedAmber
    [false, false, true], // Green
    [false, true, false], // Amber
]);

// Red man, green man.
pub const CROSSING_HEAD: SignalHead<CrossingAspect, 2> = SignalHead::new(&[
    [true, false],  // Wait
    [false, true],  // Cross
    [false, false], // Blank
]);
