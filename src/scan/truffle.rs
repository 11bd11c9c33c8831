// Truffle: arbitrary character class scan.
//
// Two masked table lookups cover the low and high halves of the byte space
// (the high bit of the index kills the wrong half), and a unique-bit table
// keyed on the high nibble filters lanes that only collided modulo 16.

use super::{fwd_class_scan, rev_class_scan};
use crate::mask::truffle::{TruffleMask, TruffleWideMask};
use crate::simd::vector::Vector;

const UNIQUE_BIT_PER_NIBBLE: u64 = 0x8040_2010_0804_0201;

/// Match vector for one block: lane `i` is 0xFF iff `data[i]` is in the
/// class.
#[inline(always)]
unsafe fn class_hits<V: Vector>(hiclear: V, hiset: V, data: V) -> V {
    unsafe {
        let sel = V::splat(0x8f);
        let lo = hiclear.shuffle_maskz(data.and(sel));
        let hi = hiset.shuffle_maskz(data.xor(V::splat(0x80)).and(sel));
        let bit = V::splat_u64(UNIQUE_BIT_PER_NIBBLE)
            .shuffle(data.shr16::<4>().and(V::splat(0x0f)));
        lo.or(hi).and(bit).eq(V::zeroes()).not()
    }
}

/// Index of the first byte of `buf` in the class, if any.
#[inline(always)]
pub(crate) unsafe fn truffle_fwd<V: Vector>(m: &TruffleMask, buf: &[u8]) -> Option<usize> {
    log::trace!("truffle fwd over {} bytes", buf.len());
    unsafe {
        let hiclear = V::load_tbl16(&m.lo_hi_clear);
        let hiset = V::load_tbl16(&m.lo_hi_set);
        fwd_class_scan::<V, _>(buf, |data| unsafe { class_hits(hiclear, hiset, data) })
    }
}

/// Index of the last byte of `buf` in the class, if any.
#[inline(always)]
pub(crate) unsafe fn truffle_rev<V: Vector>(m: &TruffleMask, buf: &[u8]) -> Option<usize> {
    log::trace!("truffle rev over {} bytes", buf.len());
    unsafe {
        let hiclear = V::load_tbl16(&m.lo_hi_clear);
        let hiset = V::load_tbl16(&m.lo_hi_set);
        rev_class_scan::<V, _>(buf, |data| unsafe { class_hits(hiclear, hiset, data) })
    }
}

/// Forward scan with the single 32-byte table.
///
/// This is the portable rendition; a target with a 32-entry table lookup
/// can replace the inner loop one for one.
pub fn truffle_wide_exec(m: &TruffleWideMask, buf: &[u8]) -> Option<usize> {
    log::trace!("truffle wide fwd over {} bytes", buf.len());
    buf.iter().position(|&b| m.contains(b))
}

/// Reverse scan with the single 32-byte table.
pub fn rtruffle_wide_exec(m: &TruffleWideMask, buf: &[u8]) -> Option<usize> {
    log::trace!("truffle wide rev over {} bytes", buf.len());
    buf.iter().rposition(|&b| m.contains(b))
}
