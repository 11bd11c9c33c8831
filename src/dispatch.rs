// Fat dispatch: one process-wide function pointer per exported scanner.
//
// Each pointer starts out aimed at a resolver. The first call probes the
// CPU once, stores the best specialisation back into the pointer with a
// release store, and tail-calls it; later calls branch straight through the
// pointer with an acquire load and no further checks. Racing first calls
// all store the same value, which is benign, and both the cold and the warm
// path are wait-free. There is no teardown.
//
// Tier precedence:
//   x86_64:  avx512vbmi > avx512 > avx2 > sse4.2+popcnt > ssse3 > scalar
//   aarch64: sve2 > sve > neon > scalar
//
// The AVX-512 tiers run the 64-byte-wide kernels (two 32-byte halves, so
// they execute on any AVX2 machine and stay on stable Rust); the SVE tiers
// currently route to the NEON build, pending usable SVE intrinsics. The C
// ancestry ends its chain with an arch-error stub instead of `scalar`; this
// port always carries the portable backend, so resolution cannot fail.

use core::sync::atomic::{AtomicPtr, Ordering};

use crate::hwlm::{HwlmCallback, HwlmStatus};
use crate::mask::shufti::{ShuftiDoubleMask, ShuftiMask};
use crate::mask::truffle::TruffleMask;
use crate::scan::miracle::{miracle_byte, miracle_shufti};
use crate::scan::noodle::{NoodTable, nood_scan, nood_scan_streaming};
use crate::scan::shufti::{shufti_double_fwd, shufti_fwd, shufti_rev};
use crate::scan::truffle::{truffle_fwd, truffle_rev};
use crate::scan::vermicelli::{
    nverm_fwd, nverm_rev, verm_double_fwd, verm_double_masked_fwd, verm_fwd, verm_rev,
};
use crate::simd::scalar::ScalarVector;

// ---------------------------------------------------------------------------
// CPU feature checks
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_avx512vbmi() -> bool {
    if cfg!(feature = "no-avx512-vbmi") {
        return false;
    }
    check_avx512() && is_x86_feature_detected!("avx512vbmi")
}

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_avx512() -> bool {
    if cfg!(feature = "no-avx512") {
        return false;
    }
    is_x86_feature_detected!("avx512f")
        && is_x86_feature_detected!("avx512bw")
        && is_x86_feature_detected!("avx512vl")
}

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_sse42() -> bool {
    is_x86_feature_detected!("sse4.2")
}

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_popcnt() -> bool {
    is_x86_feature_detected!("popcnt")
}

#[cfg(target_arch = "x86_64")]
pub(crate) fn check_ssse3() -> bool {
    is_x86_feature_detected!("ssse3")
}

#[cfg(target_arch = "aarch64")]
pub(crate) fn check_sve2() -> bool {
    std::arch::is_aarch64_feature_detected!("sve2")
}

#[cfg(target_arch = "aarch64")]
pub(crate) fn check_sve() -> bool {
    std::arch::is_aarch64_feature_detected!("sve")
}

#[cfg(target_arch = "aarch64")]
pub(crate) fn check_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

// ---------------------------------------------------------------------------
// Tier selection
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
fn select_tier<F: Copy>(sse: F, avx2: F, wide: F, scalar: F) -> (F, &'static str) {
    if check_avx512vbmi() {
        (wide, "avx512vbmi")
    } else if check_avx512() {
        (wide, "avx512")
    } else if check_avx2() {
        (avx2, "avx2")
    } else if check_sse42() && check_popcnt() {
        (sse, "sse4.2")
    } else if check_ssse3() {
        (sse, "ssse3")
    } else {
        (scalar, "scalar")
    }
}

#[cfg(target_arch = "aarch64")]
fn select_tier<F: Copy>(neon: F, scalar: F) -> (F, &'static str) {
    if check_sve2() {
        (neon, "sve2")
    } else if check_sve() {
        (neon, "sve")
    } else if check_neon() {
        (neon, "neon")
    } else {
        (scalar, "scalar")
    }
}

fn install(cell: &AtomicPtr<()>, f: *mut (), name: &'static str, tier: &'static str) {
    // Racing resolvers store the same pointer; release pairs with the
    // acquire load in the entry shim.
    cell.store(f, Ordering::Release);
    log::debug!("{name}: resolved to the {tier} implementation");
}

// ---------------------------------------------------------------------------
// Dispatch plumbing
// ---------------------------------------------------------------------------

macro_rules! fat_dispatch {
    (
        $(#[$meta:meta])*
        fn $name:ident / $imp:ident ($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty = $kernel:ident
    ) => {
        $(#[$meta])*
        pub fn $name($($arg: $ty),*) -> $ret {
            let f = $imp::CELL.load(Ordering::Acquire);
            // Safety: CELL only ever holds pointers of type `$imp::Sig`.
            let f: $imp::Sig = unsafe { core::mem::transmute(f) };
            f($($arg),*)
        }

        mod $imp {
            use super::*;

            pub(super) type Sig = fn($($ty),*) -> $ret;

            pub(super) static CELL: AtomicPtr<()> =
                AtomicPtr::new(resolve as Sig as *mut ());

            fn resolve($($arg: $ty),*) -> $ret {
                #[cfg(target_arch = "x86_64")]
                let (f, tier) =
                    select_tier::<Sig>(sse_entry, avx2_entry, wide_entry, scalar_entry);
                #[cfg(target_arch = "aarch64")]
                let (f, tier) = select_tier::<Sig>(neon_entry, scalar_entry);
                #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
                let (f, tier) = (scalar_entry as Sig, "scalar");

                install(&CELL, f as *mut (), stringify!($name), tier);
                f($($arg),*)
            }

            fn scalar_entry($($arg: $ty),*) -> $ret {
                // Safety: the portable backend needs no CPU features.
                unsafe { $kernel::<ScalarVector>($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            fn sse_entry($($arg: $ty),*) -> $ret {
                // Safety: installed only after check_ssse3() (or better).
                unsafe { sse_impl($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            #[target_feature(enable = "ssse3")]
            unsafe fn sse_impl($($arg: $ty),*) -> $ret {
                unsafe { $kernel::<crate::simd::x86::V128>($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            fn avx2_entry($($arg: $ty),*) -> $ret {
                // Safety: installed only after check_avx2().
                unsafe { avx2_impl($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            #[target_feature(enable = "avx2")]
            unsafe fn avx2_impl($($arg: $ty),*) -> $ret {
                unsafe { $kernel::<crate::simd::x86::V256>($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            fn wide_entry($($arg: $ty),*) -> $ret {
                // Safety: installed only after check_avx512(), which implies
                // the AVX2 the half-width kernels require.
                unsafe { wide_impl($($arg),*) }
            }

            #[cfg(target_arch = "x86_64")]
            #[target_feature(enable = "avx2")]
            unsafe fn wide_impl($($arg: $ty),*) -> $ret {
                unsafe { $kernel::<crate::simd::x86::V512>($($arg),*) }
            }

            #[cfg(target_arch = "aarch64")]
            fn neon_entry($($arg: $ty),*) -> $ret {
                // Safety: installed only after check_neon() (or better).
                unsafe { neon_impl($($arg),*) }
            }

            #[cfg(target_arch = "aarch64")]
            #[target_feature(enable = "neon")]
            unsafe fn neon_impl($($arg: $ty),*) -> $ret {
                unsafe { $kernel::<crate::simd::neon::V128>($($arg),*) }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Exported scanners
// ---------------------------------------------------------------------------

fat_dispatch! {
    /// Index of the first byte of `buf` in the class, or `None`.
    fn shufti_exec / shufti_exec_impl (mask: &ShuftiMask, buf: &[u8]) -> Option<usize> = shufti_fwd
}

fat_dispatch! {
    /// Index of the last byte of `buf` in the class, or `None`.
    fn rshufti_exec / rshufti_exec_impl (mask: &ShuftiMask, buf: &[u8]) -> Option<usize> = shufti_rev
}

fat_dispatch! {
    /// First index `i` where `buf[i]` is in the first class and
    /// `buf[i + 1]` in the second. If the final byte is in the first class
    /// and no full pair exists, `len - 1` is reported as a partial match.
    fn shufti_double_exec / shufti_double_exec_impl (mask: &ShuftiDoubleMask, buf: &[u8]) -> Option<usize>
        = shufti_double_fwd
}

fat_dispatch! {
    /// Index of the first byte of `buf` in the class, or `None`. Unlike
    /// Shufti, Truffle accepts any class.
    fn truffle_exec / truffle_exec_impl (mask: &TruffleMask, buf: &[u8]) -> Option<usize> = truffle_fwd
}

fat_dispatch! {
    /// Index of the last byte of `buf` in the class, or `None`.
    fn rtruffle_exec / rtruffle_exec_impl (mask: &TruffleMask, buf: &[u8]) -> Option<usize> = truffle_rev
}

fat_dispatch! {
    /// Index of the first byte equal to `c`, case-folded when `nocase` and
    /// `c` is alphabetic.
    fn verm_exec / verm_exec_impl (c: u8, nocase: bool, buf: &[u8]) -> Option<usize> = verm_fwd
}

fat_dispatch! {
    /// Index of the last byte equal to `c`.
    fn rverm_exec / rverm_exec_impl (c: u8, nocase: bool, buf: &[u8]) -> Option<usize> = verm_rev
}

fat_dispatch! {
    /// Index of the first byte NOT equal to `c`.
    fn nverm_exec / nverm_exec_impl (c: u8, nocase: bool, buf: &[u8]) -> Option<usize> = nverm_fwd
}

fat_dispatch! {
    /// Index of the last byte NOT equal to `c`.
    fn rnverm_exec / rnverm_exec_impl (c: u8, nocase: bool, buf: &[u8]) -> Option<usize> = nverm_rev
}

fat_dispatch! {
    /// First index of the two-byte string `c1 c2`, with the trailing
    /// partial-match rule of [`shufti_double_exec`].
    fn verm_double_exec / verm_double_exec_impl (c1: u8, c2: u8, nocase: bool, buf: &[u8]) -> Option<usize>
        = verm_double_fwd
}

fat_dispatch! {
    /// First index of a pair with `(buf[i] & m1) == c1` and
    /// `(buf[i + 1] & m2) == c2`; compiles `[cC][dD]`-style alternations
    /// into one pass.
    fn verm_double_masked_exec / verm_double_masked_exec_impl (
        c1: u8,
        c2: u8,
        m1: u8,
        m2: u8,
        buf: &[u8],
    ) -> Option<usize> = verm_double_masked_fwd
}

fat_dispatch! {
    /// Block-mode literal scan: fires `cb(end_offset, id)` for every
    /// occurrence of the compiled literal in `buf[start..]`, in ascending
    /// end-offset order.
    fn nood_exec / nood_exec_impl (
        n: &NoodTable,
        buf: &[u8],
        start: usize,
        cb: HwlmCallback<'_>,
    ) -> HwlmStatus = nood_scan
}

fat_dispatch! {
    /// Streaming-mode literal scan across a history/current buffer split.
    /// Offsets are relative to `buf`; matches ending in history were the
    /// previous block's to report.
    fn nood_exec_streaming / nood_exec_streaming_impl (
        n: &NoodTable,
        hbuf: &[u8],
        buf: &[u8],
        cb: HwlmCallback<'_>,
    ) -> HwlmStatus = nood_scan_streaming
}

fat_dispatch! {
    /// Count occurrences of `c` backwards through `buf`, stopping once the
    /// running count reaches `target`. Returns the offset where it was
    /// reached; `count` accumulates across calls so a window can span
    /// history and current buffers.
    fn counting_miracle_scan / counting_miracle_scan_impl (
        c: u8,
        buf: &[u8],
        target: u32,
        count: &mut u32,
    ) -> Option<usize> = miracle_byte
}

fat_dispatch! {
    /// [`counting_miracle_scan`] over a Shufti class instead of one byte.
    fn counting_miracle_scan_shufti / counting_miracle_scan_shufti_impl (
        mask: &ShuftiMask,
        buf: &[u8],
        target: u32,
        count: &mut u32,
    ) -> Option<usize> = miracle_shufti
}
