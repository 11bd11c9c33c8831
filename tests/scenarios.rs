// End-to-end scenarios through the public API: known-answer scans,
// boundary sizes around the vector widths, and callback termination.

use litscan::{
    CharClass, HwlmStatus, MatchOutcome, NoodTable, counting_miracle_scan,
    counting_miracle_scan_shufti, nood_exec, nood_exec_streaming, rshufti_exec, rtruffle_exec,
    rverm_exec, shufti_double_exec, shufti_exec, truffle_exec, verm_double_exec, verm_exec,
};

#[test]
fn shufti_single_class() {
    let m = CharClass::from_bytes(b"a").build_shufti_masks().unwrap();
    let mut buf = vec![b'b'; 40];
    buf[17] = b'a';
    assert_eq!(shufti_exec(&m, &buf), Some(17));
    assert_eq!(rshufti_exec(&m, &buf), Some(17));
}

#[test]
fn shufti_double_pair_and_partial() {
    let a = CharClass::from_bytes(b"a");
    let b = CharClass::from_bytes(b"b");
    let m = a.build_shufti_double_masks(&b).unwrap();

    let mut buf = vec![b'x'; 40];
    buf[12] = b'a';
    buf[13] = b'b';
    assert_eq!(shufti_double_exec(&m, &buf), Some(12));

    let mut buf = vec![b'x'; 40];
    *buf.last_mut().unwrap() = b'a';
    assert_eq!(shufti_double_exec(&m, &buf), Some(39));
}

#[test]
fn truffle_high_byte() {
    let mut class = CharClass::new();
    class.set_range(0x80, 0xff);
    let m = class.build_truffle_masks();
    let mut buf = vec![b'*'; 128];
    buf[40] = 0xc3;
    assert_eq!(truffle_exec(&m, &buf), Some(40));
    assert_eq!(rtruffle_exec(&m, &buf), Some(40));
}

#[test]
fn vermicelli_nocase_and_double() {
    let mut buf = Vec::new();
    for i in 0..48 {
        buf.push(if i % 2 == 0 { b'b' } else { b'B' });
    }
    buf.push(b'A');
    assert_eq!(verm_exec(b'a', true, &buf), Some(48));
    assert_eq!(rverm_exec(b'a', true, &buf), Some(48));

    assert_eq!(verm_double_exec(b'a', b'b', true, b"xxAbxx"), Some(2));
}

#[test]
fn noodle_block_and_tail_rescan() {
    let n = NoodTable::build(b"ert", false, 1000).unwrap();

    let mut ends = Vec::new();
    let mut cb = |end: usize, id: u32| {
        assert_eq!(id, 1000);
        ends.push(end);
        MatchOutcome::Continue
    };
    assert_eq!(
        nood_exec(&n, b"azertyuioperty", 0, &mut cb),
        HwlmStatus::Success
    );
    assert_eq!(ends, vec![4, 12]);

    let mut ends = Vec::new();
    let mut cb = |end: usize, _| {
        ends.push(end);
        MatchOutcome::Continue
    };
    assert_eq!(nood_exec(&n, b"tyuioperty", 0, &mut cb), HwlmStatus::Success);
    assert_eq!(ends, vec![8]);
}

#[test]
fn counting_miracle_third_from_the_end() {
    let mut buf = vec![b'.'; 32];
    for &at in &[5usize, 10, 20, 25] {
        buf[at] = b'a';
    }
    let mut count = 0;
    assert_eq!(counting_miracle_scan(b'a', &buf, 3, &mut count), Some(10));
    assert!(count >= 3);

    let m = CharClass::from_bytes(b"a").build_shufti_masks().unwrap();
    let mut count = 0;
    assert_eq!(
        counting_miracle_scan_shufti(&m, &buf, 3, &mut count),
        Some(10)
    );
}

// ---------------------------------------------------------------------------
// Boundary sizes
// ---------------------------------------------------------------------------

// Cover lengths around every vector width in play (16, 32, and the 64-byte
// composed tier), with the match at the first byte, the last byte, and
// straddling each block boundary.
#[test]
fn boundary_sweep_single_scanners() {
    let class = CharClass::from_bytes(b"~");
    let sh = class.build_shufti_masks().unwrap();
    let tr = class.build_truffle_masks();

    for len in [1usize, 2, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 200] {
        let mut positions = vec![0, len / 2, len - 1];
        for w in [16usize, 32, 64] {
            if len > w {
                positions.push(w - 1);
                positions.push(w);
            }
        }
        for at in positions {
            let mut buf = vec![b'-'; len];
            buf[at] = b'~';
            assert_eq!(shufti_exec(&sh, &buf), Some(at), "shufti len {len} at {at}");
            assert_eq!(rshufti_exec(&sh, &buf), Some(at), "rshufti len {len} at {at}");
            assert_eq!(truffle_exec(&tr, &buf), Some(at), "truffle len {len} at {at}");
            assert_eq!(rtruffle_exec(&tr, &buf), Some(at), "rtruffle len {len} at {at}");
            assert_eq!(verm_exec(b'~', false, &buf), Some(at), "verm len {len} at {at}");
            assert_eq!(rverm_exec(b'~', false, &buf), Some(at), "rverm len {len} at {at}");
        }
    }
}

#[test]
fn boundary_sweep_empty_and_missing() {
    let class = CharClass::from_bytes(b"~");
    let sh = class.build_shufti_masks().unwrap();
    let tr = class.build_truffle_masks();

    assert_eq!(shufti_exec(&sh, b""), None);
    assert_eq!(rshufti_exec(&sh, b""), None);
    assert_eq!(truffle_exec(&tr, b""), None);
    assert_eq!(rtruffle_exec(&tr, b""), None);
    assert_eq!(verm_exec(b'~', false, b""), None);
    assert_eq!(rverm_exec(b'~', false, b""), None);

    for len in [1usize, 16, 17, 64, 129] {
        let buf = vec![b'-'; len];
        assert_eq!(shufti_exec(&sh, &buf), None, "len {len}");
        assert_eq!(rshufti_exec(&sh, &buf), None, "len {len}");
        assert_eq!(truffle_exec(&tr, &buf), None, "len {len}");
        assert_eq!(rtruffle_exec(&tr, &buf), None, "len {len}");
    }
}

#[test]
fn double_scanners_straddle_every_width() {
    let a = CharClass::from_bytes(b"a");
    let b = CharClass::from_bytes(b"b");
    let m = a.build_shufti_double_masks(&b).unwrap();

    for w in [16usize, 32, 64] {
        let mut buf = vec![b'.'; 3 * w];
        buf[w - 1] = b'a';
        buf[w] = b'b';
        assert_eq!(shufti_double_exec(&m, &buf), Some(w - 1), "width {w}");
        assert_eq!(
            verm_double_exec(b'a', b'b', false, &buf),
            Some(w - 1),
            "width {w}"
        );
    }
}

// ---------------------------------------------------------------------------
// Callback termination
// ---------------------------------------------------------------------------

fn terminate_at(n: &NoodTable, buf: &[u8], stop_after: usize) -> (Vec<usize>, HwlmStatus) {
    let mut ends = Vec::new();
    let mut cb = |end: usize, _id: u32| {
        ends.push(end);
        if ends.len() == stop_after {
            MatchOutcome::Terminate
        } else {
            MatchOutcome::Continue
        }
    };
    let rv = nood_exec(n, buf, 0, &mut cb);
    (ends, rv)
}

#[test]
fn terminate_on_first_middle_last() {
    let n = NoodTable::build(b"ab", false, 1).unwrap();
    let buf = b"ab..ab..ab..ab";

    let (ends, rv) = terminate_at(&n, buf, 1);
    assert_eq!(rv, HwlmStatus::Terminated);
    assert_eq!(ends, vec![1]);

    let (ends, rv) = terminate_at(&n, buf, 2);
    assert_eq!(rv, HwlmStatus::Terminated);
    assert_eq!(ends, vec![1, 5]);

    // Terminating on the final match still reports Terminated.
    let (ends, rv) = terminate_at(&n, buf, 4);
    assert_eq!(rv, HwlmStatus::Terminated);
    assert_eq!(ends, vec![1, 5, 9, 13]);

    // Never terminating runs to Success.
    let (ends, rv) = terminate_at(&n, buf, 99);
    assert_eq!(rv, HwlmStatus::Success);
    assert_eq!(ends, vec![1, 5, 9, 13]);
}

#[test]
fn streaming_terminate_in_stitched_region() {
    let n = NoodTable::build(b"hello", false, 5).unwrap();
    let mut calls = 0;
    let mut cb = |_end: usize, _id: u32| {
        calls += 1;
        MatchOutcome::Terminate
    };
    // One match across the join, one in the block; the first must stop it.
    let rv = nood_exec_streaming(&n, b"...he", b"llo and hello", &mut cb);
    assert_eq!(rv, HwlmStatus::Terminated);
    assert_eq!(calls, 1);
}

#[test]
fn match_order_is_ascending() {
    let n = NoodTable::build(b"aa", false, 2).unwrap();
    let buf = vec![b'a'; 200];
    let mut last = None;
    let mut cb = |end: usize, _id: u32| {
        if let Some(prev) = last {
            assert!(end > prev, "ends must ascend: {prev} then {end}");
        }
        last = Some(end);
        MatchOutcome::Continue
    };
    assert_eq!(nood_exec(&n, &buf, 0, &mut cb), HwlmStatus::Success);
    assert_eq!(last, Some(199));
}
