// Noodle: single fixed literal matcher.
//
// A literal is compiled once into a `NoodTable`: one or two key bytes taken
// from the first position where adjacent bytes differ, plus a mask/compare
// word over the last eight bytes that verifies a candidate in a single
// 64-bit load. The scan itself is a vermicelli-shaped sweep for the key
// fragment; every surviving candidate fires the callback with the match's
// end offset.

use super::vermicelli::{CASE_CLEAR, fold_byte};
use crate::hwlm::{Error, HwlmCallback, HwlmStatus, LITERAL_MAX_LEN, MatchOutcome};
use crate::simd::vector::{Vector, align_gap, low_bits, prefetch_read, prefetch_span};

/// Compiled literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoodTable {
    id: u32,
    msk: u64,
    cmp: u64,
    msk_len: usize,
    key0: u8,
    key1: u8,
    key_offset: usize,
    single: bool,
    nocase: bool,
}

/// Offset of the key fragment: the first position whose adjacent bytes
/// differ (case-folded when `nocase`), so runs of one byte do not flood the
/// scanner with candidates.
fn frag_offset(lit: &[u8], nocase: bool) -> usize {
    for i in 0..lit.len() - 1 {
        if fold_byte(lit[i], nocase && lit[i].is_ascii_alphabetic())
            != fold_byte(lit[i + 1], nocase && lit[i + 1].is_ascii_alphabetic())
        {
            return i;
        }
    }
    lit.len() - 2
}

impl NoodTable {
    /// Compile `literal` into a table. `id` is handed back verbatim on
    /// every match.
    pub fn build(literal: &[u8], nocase: bool, id: u32) -> Result<NoodTable, Error> {
        if literal.is_empty() {
            return Err(Error::EmptyLiteral);
        }
        if literal.len() > LITERAL_MAX_LEN {
            return Err(Error::LiteralTooLong(literal.len()));
        }

        let k = literal.len();
        let msk_len = k.min(8);
        let mut msk = 0u64;
        let mut cmp = 0u64;
        for (i, &b) in literal[k - msk_len..].iter().enumerate() {
            let (mb, cb) = if nocase && b.is_ascii_alphabetic() {
                (CASE_CLEAR, b & CASE_CLEAR)
            } else {
                (0xff, b)
            };
            msk |= (mb as u64) << (8 * i);
            cmp |= (cb as u64) << (8 * i);
        }

        if k == 1 {
            Ok(NoodTable {
                id,
                msk,
                cmp,
                msk_len,
                key0: literal[0],
                key1: 0,
                key_offset: 1,
                single: true,
                nocase,
            })
        } else {
            let f = frag_offset(literal, nocase);
            Ok(NoodTable {
                id,
                msk,
                cmp,
                msk_len,
                key0: literal[f],
                key1: literal[f + 1],
                key_offset: k - f,
                single: false,
                nocase,
            })
        }
    }

    /// The report id passed to the callback.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn nocase(&self) -> bool {
        self.nocase
    }
}

/// `len <= 8` little-endian bytes of `s`, zero extended.
#[inline(always)]
fn partial_load_u64(s: &[u8], len: usize) -> u64 {
    debug_assert!(len <= 8 && s.len() >= len);
    let mut v = [0u8; 8];
    v[..len].copy_from_slice(&s[..len]);
    u64::from_le_bytes(v)
}

/// Verify a candidate key position and fire the callback on a true match.
#[inline(always)]
fn finalise(n: &NoodTable, buf: &[u8], pos: usize, cb: HwlmCallback<'_>) -> HwlmStatus {
    if n.msk_len > 1 {
        let at = pos + n.key_offset - n.msk_len;
        let v = partial_load_u64(&buf[at..], n.msk_len);
        if v & n.msk != n.cmp {
            return HwlmStatus::Success;
        }
    }
    let end = pos + n.key_offset - 1;
    match cb(end, n.id) {
        MatchOutcome::Terminate => HwlmStatus::Terminated,
        MatchOutcome::Continue => HwlmStatus::Success,
    }
}

/// Walk the candidate bits of one block, single-key scan.
#[inline(always)]
fn single_zscan(
    n: &NoodTable,
    buf: &[u8],
    off: usize,
    mut z: u64,
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    while z != 0 {
        let pos = off + z.trailing_zeros() as usize;
        z &= z - 1;
        if finalise(n, buf, pos, cb) == HwlmStatus::Terminated {
            return HwlmStatus::Terminated;
        }
    }
    HwlmStatus::Success
}

/// Walk the candidate bits of one block, pair scan. Bits sit on the second
/// key byte, so the recorded position steps back one.
#[inline(always)]
fn double_zscan(
    n: &NoodTable,
    buf: &[u8],
    off: usize,
    mut z: u64,
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    while z != 0 {
        let pos = off + z.trailing_zeros() as usize - 1;
        z &= z - 1;
        if finalise(n, buf, pos, cb) == HwlmStatus::Terminated {
            return HwlmStatus::Terminated;
        }
    }
    HwlmStatus::Success
}

#[inline(always)]
unsafe fn scan_single<V: Vector>(
    n: &NoodTable,
    buf: &[u8],
    start: usize,
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    let nocase = n.nocase && n.key0.is_ascii_alphabetic();
    let len = buf.len();
    let w = V::LANES;
    let base = buf.as_ptr();
    unsafe {
        let casemask = V::splat(if nocase { CASE_CLEAR } else { 0xff });
        let key = V::splat(fold_byte(n.key0, nocase));
        let mut off = start + n.msk_len - 1;
        prefetch_span(base.wrapping_add(off));

        if off + w <= len {
            let head = align_gap(base.wrapping_add(off), w);
            if head != 0 {
                let data = V::load_unaligned(base.add(off));
                let z = key.eqmask(data.and(casemask)) & low_bits(head);
                if single_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                    return HwlmStatus::Terminated;
                }
                off += head;
            }
            while off + w <= len {
                prefetch_read(base.wrapping_add(off + 4 * 64));
                let data = V::load_aligned(base.add(off));
                let z = key.eqmask(data.and(casemask));
                if single_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                    return HwlmStatus::Terminated;
                }
                off += w;
            }
        }
        if off < len {
            let l = len - off;
            let data = V::load_zero_pad(base.add(off), l);
            let z = key.eqmask(data.and(casemask)) & low_bits(l);
            if single_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                return HwlmStatus::Terminated;
            }
        }
    }
    HwlmStatus::Success
}

#[inline(always)]
unsafe fn scan_double<V: Vector>(
    n: &NoodTable,
    buf: &[u8],
    start: usize,
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    let len = buf.len();
    let w = V::LANES;
    let base = buf.as_ptr();
    // Stop scanning for the fragment where the rest of the literal can no
    // longer fit.
    let e = len - n.key_offset + 2;
    debug_assert_eq!(V::MASK_WIDTH, 1);
    unsafe {
        let casemask = V::splat(if n.nocase { CASE_CLEAR } else { 0xff });
        let key1 = V::splat(fold_byte(n.key0, n.nocase));
        let key2 = V::splat(fold_byte(n.key1, n.nocase));
        let mut off = start + n.msk_len - n.key_offset;
        let mut lastz1 = 0u64;
        prefetch_span(base.wrapping_add(off));

        if off + w <= e {
            let head = align_gap(base.wrapping_add(off), w);
            if head != 0 {
                let data = V::load_unaligned(base.add(off)).and(casemask);
                let z1 = key1.eqmask(data);
                let z2 = key2.eqmask(data);
                let z = ((z1 << 1) | lastz1) & z2 & low_bits(head);
                lastz1 = (z1 >> (head - 1)) & 1;
                if double_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                    return HwlmStatus::Terminated;
                }
                off += head;
            }
            while off + w <= e {
                prefetch_read(base.wrapping_add(off + 4 * 64));
                let data = V::load_aligned(base.add(off)).and(casemask);
                let z1 = key1.eqmask(data);
                let z2 = key2.eqmask(data);
                let z = ((z1 << 1) | lastz1) & z2;
                lastz1 = (z1 >> (w - 1)) & 1;
                if double_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                    return HwlmStatus::Terminated;
                }
                off += w;
            }
        }
        if off < e {
            let l = e - off;
            let data = V::load_zero_pad(base.add(off), l).and(casemask);
            let z1 = key1.eqmask(data);
            let z2 = key2.eqmask(data);
            let z = ((z1 << 1) | lastz1) & z2 & low_bits(l);
            if double_zscan(n, buf, off, z, cb) == HwlmStatus::Terminated {
                return HwlmStatus::Terminated;
            }
        }
    }
    HwlmStatus::Success
}

/// Block-mode scan of `buf[start..]` for the compiled literal.
#[inline(always)]
pub(crate) unsafe fn nood_scan<V: Vector>(
    n: &NoodTable,
    buf: &[u8],
    start: usize,
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    log::trace!(
        "noodle scan of {} bytes from {start}, id {}",
        buf.len(),
        n.id
    );
    if buf.len() < start || buf.len() - start < n.msk_len {
        // A literal of msk_len bytes cannot fit in a shorter buffer.
        return HwlmStatus::Success;
    }
    if n.single {
        unsafe { scan_single::<V>(n, buf, start, cb) }
    } else {
        unsafe { scan_double::<V>(n, buf, start, cb) }
    }
}

/// Streaming-mode scan: matches crossing the history/current boundary are
/// stitched through a small byte-checked buffer, then `buf` is scanned in
/// block mode. Reported offsets are relative to the start of `buf`.
#[inline(always)]
pub(crate) unsafe fn nood_scan_streaming<V: Vector>(
    n: &NoodTable,
    hbuf: &[u8],
    buf: &[u8],
    cb: HwlmCallback<'_>,
) -> HwlmStatus {
    log::trace!(
        "noodle streaming scan of {} bytes ({} history), id {}",
        buf.len(),
        hbuf.len(),
        n.id
    );
    if hbuf.len() + buf.len() < n.msk_len {
        return HwlmStatus::Success;
    }

    if !hbuf.is_empty() && n.msk_len > 1 {
        // Synthesise up to msk_len-1 bytes either side of the join; the
        // window is short enough to check per byte offset.
        let mut temp = [0u8; 2 * (LITERAL_MAX_LEN - 1)];
        let tl1 = (n.msk_len - 1).min(hbuf.len());
        let tl2 = (n.msk_len - 1).min(buf.len());
        temp[..tl1].copy_from_slice(&hbuf[hbuf.len() - tl1..]);
        temp[tl1..tl1 + tl2].copy_from_slice(&buf[..tl2]);

        if tl1 + tl2 >= n.msk_len {
            for i in 0..=tl1 + tl2 - n.msk_len {
                let v = partial_load_u64(&temp[i..], n.msk_len);
                if v & n.msk == n.cmp {
                    let end = i + n.msk_len - 1 - tl1;
                    if cb(end, n.id) == MatchOutcome::Terminate {
                        return HwlmStatus::Terminated;
                    }
                }
            }
        }
    }

    if buf.is_empty() {
        return HwlmStatus::Success;
    }
    unsafe { nood_scan::<V>(n, buf, 0, cb) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::ScalarVector;

    fn run(n: &NoodTable, buf: &[u8], start: usize) -> Vec<(usize, u32)> {
        let mut hits = Vec::new();
        let mut cb = |end: usize, id: u32| {
            hits.push((end, id));
            MatchOutcome::Continue
        };
        let rv = unsafe { nood_scan::<ScalarVector>(n, buf, start, &mut cb) };
        assert_eq!(rv, HwlmStatus::Success);
        hits
    }

    fn run_streaming(n: &NoodTable, hbuf: &[u8], buf: &[u8]) -> Vec<(usize, u32)> {
        let mut hits = Vec::new();
        let mut cb = |end: usize, id: u32| {
            hits.push((end, id));
            MatchOutcome::Continue
        };
        let rv =
            unsafe { nood_scan_streaming::<ScalarVector>(n, hbuf, buf, &mut cb) };
        assert_eq!(rv, HwlmStatus::Success);
        hits
    }

    #[test]
    fn build_rejects_bad_literals() {
        assert_eq!(NoodTable::build(b"", false, 0), Err(Error::EmptyLiteral));
        assert_eq!(
            NoodTable::build(b"toolonglit", false, 0),
            Err(Error::LiteralTooLong(10))
        );
        assert!(NoodTable::build(b"12345678", false, 0).is_ok());
    }

    #[test]
    fn fragment_offset_skips_runs() {
        assert_eq!(frag_offset(b"ert", false), 0);
        assert_eq!(frag_offset(b"aab", false), 1);
        assert_eq!(frag_offset(b"aaaa", false), 2);
        assert_eq!(frag_offset(b"aAb", true), 1);
        assert_eq!(frag_offset(b"aAb", false), 0);
    }

    #[test]
    fn seed_literal_ert() {
        let n = NoodTable::build(b"ert", false, 1000).unwrap();
        let hits = run(&n, b"azertyuioperty", 0);
        assert_eq!(hits, vec![(4, 1000), (12, 1000)]);

        let hits = run(&n, b"tyuioperty", 0);
        assert_eq!(hits, vec![(8, 1000)]);
    }

    #[test]
    fn single_byte_literal() {
        let n = NoodTable::build(b"a", false, 7).unwrap();
        let hits = run(&n, b"abcabca", 0);
        assert_eq!(hits, vec![(0, 7), (3, 7), (6, 7)]);
    }

    #[test]
    fn single_byte_nocase() {
        let n = NoodTable::build(b"a", true, 7).unwrap();
        let hits = run(&n, b"AbcaBcA", 0);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn longest_literal() {
        let n = NoodTable::build(b"abcdefgh", false, 2).unwrap();
        let hits = run(&n, b"xxabcdefghxxabcdefgh", 0);
        assert_eq!(hits, vec![(9, 2), (19, 2)]);
    }

    #[test]
    fn nocase_double() {
        let n = NoodTable::build(b"AbC", true, 3).unwrap();
        let hits = run(&n, b"xxabcxxABCxxaBcxx", 0);
        assert_eq!(
            hits.iter().map(|h| h.0).collect::<Vec<_>>(),
            vec![4, 9, 14]
        );
    }

    #[test]
    fn key_collisions_are_verified_away() {
        // "er" occurs without the trailing 't'; the mask check must reject
        // those candidates.
        let n = NoodTable::build(b"ert", false, 1).unwrap();
        let hits = run(&n, b"erase every ert", 0);
        assert_eq!(hits, vec![(14, 1)]);
    }

    #[test]
    fn start_offset_skips_earlier_matches() {
        let n = NoodTable::build(b"ab", false, 1).unwrap();
        let hits = run(&n, b"ababab", 2);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn short_buffer_is_success() {
        let n = NoodTable::build(b"abc", false, 1).unwrap();
        assert_eq!(run(&n, b"ab", 0), vec![]);
        assert_eq!(run(&n, b"", 0), vec![]);
    }

    #[test]
    fn overlapping_occurrences() {
        let n = NoodTable::build(b"aa", false, 1).unwrap();
        let hits = run(&n, b"aaaa", 0);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn terminate_stops_the_scan() {
        let n = NoodTable::build(b"ab", false, 1).unwrap();
        let mut seen = 0;
        let mut cb = |_end: usize, _id: u32| {
            seen += 1;
            if seen == 2 {
                MatchOutcome::Terminate
            } else {
                MatchOutcome::Continue
            }
        };
        let rv = unsafe {
            nood_scan::<ScalarVector>(&n, b"ab ab ab ab", 0, &mut cb)
        };
        assert_eq!(rv, HwlmStatus::Terminated);
        assert_eq!(seen, 2);
    }

    #[test]
    fn streaming_match_across_join() {
        let n = NoodTable::build(b"hello", false, 5).unwrap();
        // "he" at the end of history, "llo" opening the current block.
        let hits = run_streaming(&n, b"xxxhe", b"llo more hello");
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![2, 13]);
    }

    #[test]
    fn streaming_equals_block_on_concatenation() {
        let n = NoodTable::build(b"ana", false, 9).unwrap();
        let history = b"banan";
        let current = b"a bandana banana";

        let streamed = run_streaming(&n, history, current);

        let mut concat = history.to_vec();
        concat.extend_from_slice(current);
        let block: Vec<(usize, u32)> = run(&n, &concat, 0)
            .into_iter()
            .filter(|&(end, _)| end >= history.len())
            .map(|(end, id)| (end - history.len(), id))
            .collect();

        assert_eq!(streamed, block);
    }

    #[test]
    fn streaming_without_history_is_block_mode() {
        let n = NoodTable::build(b"ab", false, 1).unwrap();
        assert_eq!(run_streaming(&n, b"", b"xxabxx"), run(&n, b"xxabxx", 0));
    }

    #[test]
    fn streaming_too_short_overall() {
        let n = NoodTable::build(b"abcdef", false, 1).unwrap();
        assert_eq!(run_streaming(&n, b"ab", b"cd"), vec![]);
    }
}
