// Vermicelli: scans for one or two literal bytes.
//
// The block predicate is a bare splat-and-compare; case insensitivity folds
// both the needle and the data to uppercase with `& 0xDF`, and is only
// honoured for alphabetic needles in the single-byte variants.

use super::{fwd_class_scan, fwd_double_scan, rev_class_scan};
use crate::simd::vector::Vector;

pub(crate) const CASE_CLEAR: u8 = 0xdf;

#[inline(always)]
pub(crate) fn fold_byte(c: u8, nocase: bool) -> u8 {
    if nocase { c & CASE_CLEAR } else { c }
}

#[inline(always)]
fn case_params(c: u8, nocase: bool) -> (u8, u8) {
    // (folded needle, data mask)
    let nocase = nocase && c.is_ascii_alphabetic();
    (fold_byte(c, nocase), if nocase { CASE_CLEAR } else { 0xff })
}

/// Index of the first byte equal to `c` (case-folded when `nocase`).
#[inline(always)]
pub(crate) unsafe fn verm_fwd<V: Vector>(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
    log::trace!("verm fwd {c:#04x} nocase={nocase} over {} bytes", buf.len());
    let (k, m) = case_params(c, nocase);
    unsafe {
        let chars = V::splat(k);
        let casemask = V::splat(m);
        fwd_class_scan::<V, _>(buf, |d| unsafe { chars.eq(d.and(casemask)) })
    }
}

/// Index of the last byte equal to `c`.
#[inline(always)]
pub(crate) unsafe fn verm_rev<V: Vector>(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
    log::trace!("verm rev {c:#04x} nocase={nocase} over {} bytes", buf.len());
    let (k, m) = case_params(c, nocase);
    unsafe {
        let chars = V::splat(k);
        let casemask = V::splat(m);
        rev_class_scan::<V, _>(buf, |d| unsafe { chars.eq(d.and(casemask)) })
    }
}

/// Index of the first byte NOT equal to `c`.
#[inline(always)]
pub(crate) unsafe fn nverm_fwd<V: Vector>(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
    log::trace!("nverm fwd {c:#04x} nocase={nocase} over {} bytes", buf.len());
    let (k, m) = case_params(c, nocase);
    unsafe {
        let chars = V::splat(k);
        let casemask = V::splat(m);
        fwd_class_scan::<V, _>(buf, |d| unsafe { chars.eq(d.and(casemask)).not() })
    }
}

/// Index of the last byte NOT equal to `c`.
#[inline(always)]
pub(crate) unsafe fn nverm_rev<V: Vector>(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
    log::trace!("nverm rev {c:#04x} nocase={nocase} over {} bytes", buf.len());
    let (k, m) = case_params(c, nocase);
    unsafe {
        let chars = V::splat(k);
        let casemask = V::splat(m);
        rev_class_scan::<V, _>(buf, |d| unsafe { chars.eq(d.and(casemask)).not() })
    }
}

/// First index of the two-byte string `c1 c2`; `len - 1` as a partial match
/// when the buffer ends in `c1`.
#[inline(always)]
pub(crate) unsafe fn verm_double_fwd<V: Vector>(
    c1: u8,
    c2: u8,
    nocase: bool,
    buf: &[u8],
) -> Option<usize> {
    log::trace!(
        "verm double fwd {c1:#04x}{c2:#04x} nocase={nocase} over {} bytes",
        buf.len()
    );
    let m = if nocase { CASE_CLEAR } else { 0xff };
    let k1 = fold_byte(c1, nocase);
    let k2 = fold_byte(c2, nocase);
    unsafe {
        let chars1 = V::splat(k1);
        let chars2 = V::splat(k2);
        let casemask = V::splat(m);
        fwd_double_scan::<V, _, _>(
            buf,
            |d| unsafe {
                let v = d.and(casemask);
                (chars1.eqmask(v), chars2.eqmask(v))
            },
            |b| b & m == k1,
        )
    }
}

/// First index of a pair matching `(b & m1) == c1`, `(next & m2) == c2`;
/// `len - 1` as a partial match when the final byte passes the first test.
/// Used to run `[cC][dD]`-style alternations in one pass.
#[inline(always)]
pub(crate) unsafe fn verm_double_masked_fwd<V: Vector>(
    c1: u8,
    c2: u8,
    m1: u8,
    m2: u8,
    buf: &[u8],
) -> Option<usize> {
    log::trace!(
        "verm double masked fwd {c1:#04x}/{m1:#04x} {c2:#04x}/{m2:#04x} over {} bytes",
        buf.len()
    );
    unsafe {
        let chars1 = V::splat(c1);
        let chars2 = V::splat(c2);
        let mask1 = V::splat(m1);
        let mask2 = V::splat(m2);
        fwd_double_scan::<V, _, _>(
            buf,
            |d| unsafe {
                (
                    chars1.eqmask(d.and(mask1)),
                    chars2.eqmask(d.and(mask2)),
                )
            },
            |b| b & m1 == c1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::ScalarVector;

    fn fwd(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
        unsafe { verm_fwd::<ScalarVector>(c, nocase, buf) }
    }

    fn rev(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
        unsafe { verm_rev::<ScalarVector>(c, nocase, buf) }
    }

    fn nfwd(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
        unsafe { nverm_fwd::<ScalarVector>(c, nocase, buf) }
    }

    fn nrev(c: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
        unsafe { nverm_rev::<ScalarVector>(c, nocase, buf) }
    }

    fn dbl(c1: u8, c2: u8, nocase: bool, buf: &[u8]) -> Option<usize> {
        unsafe { verm_double_fwd::<ScalarVector>(c1, c2, nocase, buf) }
    }

    fn dbl_masked(c1: u8, c2: u8, m1: u8, m2: u8, buf: &[u8]) -> Option<usize> {
        unsafe { verm_double_masked_fwd::<ScalarVector>(c1, c2, m1, m2, buf) }
    }

    #[test]
    fn single_case_sensitive() {
        let mut buf = vec![b'b'; 50];
        buf[48] = b'a';
        assert_eq!(fwd(b'a', false, &buf), Some(48));
        assert_eq!(rev(b'a', false, &buf), Some(48));
        assert_eq!(fwd(b'A', false, &buf), None);
    }

    #[test]
    fn single_nocase_finds_both_cases() {
        let mut buf = Vec::new();
        for i in 0..49 {
            buf.push(if i % 2 == 0 { b'b' } else { b'B' });
        }
        buf.push(b'A');
        assert_eq!(fwd(b'a', true, &buf), Some(49));
        assert_eq!(rev(b'a', true, &buf), Some(49));
    }

    #[test]
    fn nocase_ignored_for_non_alpha() {
        // '[' (0x5B) folds to '{' (0x7B) only through the case mask; a
        // non-alphabetic needle must stay exact.
        assert_eq!(fwd(b'[', true, b"{{{["), Some(3));
        assert_eq!(fwd(b'[', true, b"{{{"), None);
    }

    #[test]
    fn negated_variants() {
        let buf = b"aaaaaaaaaaaaaaaaaaaaXaaa";
        assert_eq!(nfwd(b'a', false, buf), Some(20));
        assert_eq!(nrev(b'a', false, buf), Some(20));
        assert_eq!(nfwd(b'a', false, b"aaaa"), None);
        assert_eq!(nrev(b'a', false, b"aaaa"), None);
        // All bytes differ: first and last.
        assert_eq!(nfwd(b'q', false, buf), Some(0));
        assert_eq!(nrev(b'q', false, buf), Some(buf.len() - 1));
    }

    #[test]
    fn double_exact_and_nocase() {
        assert_eq!(dbl(b'a', b'b', false, b"xxaBxxab"), Some(6));
        assert_eq!(dbl(b'a', b'b', true, b"xxAbxx"), Some(2));
    }

    #[test]
    fn double_partial_at_end() {
        assert_eq!(dbl(b'a', b'b', false, b"xxxxa"), Some(4));
        assert_eq!(dbl(b'a', b'b', true, b"xxxxA"), Some(4));
        assert_eq!(dbl(b'a', b'b', false, b"xxxxx"), None);
    }

    #[test]
    fn double_straddles_block_boundary() {
        let mut buf = vec![b'.'; 40];
        buf[15] = b'a';
        buf[16] = b'b';
        assert_eq!(dbl(b'a', b'b', false, &buf), Some(15));
    }

    #[test]
    fn double_same_byte_pair() {
        assert_eq!(dbl(b'a', b'a', false, b"xbxaax"), Some(3));
        assert_eq!(dbl(b'a', b'a', false, b"xbxa"), Some(3)); // partial
    }

    #[test]
    fn masked_double() {
        // [cC][dD] via mask 0xDF on both positions.
        assert_eq!(
            dbl_masked(b'C', b'D', 0xdf, 0xdf, b"xxcdxx"),
            Some(2)
        );
        assert_eq!(
            dbl_masked(b'C', b'D', 0xdf, 0xdf, b"xxCDxx"),
            Some(2)
        );
        // Exact masks make it case sensitive again.
        assert_eq!(dbl_masked(b'C', b'D', 0xff, 0xff, b"xxcdxx"), None);
        // Partial via the first mask only.
        assert_eq!(dbl_masked(b'C', b'D', 0xdf, 0xdf, b"xxc"), Some(2));
    }

    #[test]
    fn boundary_lengths() {
        for len in [1usize, 15, 16, 17, 32, 33] {
            for at in [0, len / 2, len - 1] {
                let mut buf = vec![b'.'; len];
                buf[at] = b'V';
                assert_eq!(fwd(b'V', false, &buf), Some(at), "len {len} at {at}");
                assert_eq!(rev(b'V', false, &buf), Some(at), "len {len} at {at}");
            }
        }
    }
}
