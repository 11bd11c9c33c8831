//! litscan: SIMD literal and character-class scanning.
//!
//! A Rust reimplementation of the acceleration core of Hyperscan: the
//! Shufti, Truffle and Vermicelli byte-class scanners, the Noodle literal
//! matcher and the counting-miracle bulk count, built on a fixed-width
//! vector abstraction with a per-CPU specialisation of every scanner
//! selected once, on first call.
//!
//! The crate provides:
//! - [`CharClass`] and the precompiled masks built from it (`mask`)
//! - forward/reverse class scans ([`shufti_exec`], [`truffle_exec`], ...)
//! - single/double literal-byte scans ([`verm_exec`], [`verm_double_exec`])
//! - the [`NoodTable`] literal matcher with block and streaming entry
//!   points
//! - the counting-miracle reverse bulk count
//!
//! # Quick Start
//!
//! ```
//! use litscan::{CharClass, MatchOutcome, NoodTable, nood_exec, shufti_exec};
//!
//! // Class scan: index of the first vowel.
//! let vowels = CharClass::from_bytes(b"aeiou");
//! let mask = vowels.build_shufti_masks().expect("fits in eight buckets");
//! assert_eq!(shufti_exec(&mask, b"bcdfghi"), Some(6));
//!
//! // Literal scan: every occurrence reported through the callback.
//! let table = NoodTable::build(b"ert", false, 1000).unwrap();
//! let mut ends = Vec::new();
//! let mut on_match = |end: usize, _id: u32| {
//!     ends.push(end);
//!     MatchOutcome::Continue
//! };
//! nood_exec(&table, b"azertyuioperty", 0, &mut on_match);
//! assert_eq!(ends, vec![4, 12]);
//! ```

pub mod charclass;
mod dispatch;
pub mod hwlm;
pub mod mask;
mod scan;
mod simd;

pub use charclass::CharClass;
pub use dispatch::{
    counting_miracle_scan, counting_miracle_scan_shufti, nood_exec, nood_exec_streaming,
    nverm_exec, rnverm_exec, rshufti_exec, rtruffle_exec, rverm_exec, shufti_double_exec,
    shufti_exec, truffle_exec, verm_double_exec, verm_double_masked_exec, verm_exec,
};
pub use hwlm::{Error, HwlmCallback, HwlmStatus, LITERAL_MAX_LEN, MatchOutcome};
pub use mask::{ShuftiDoubleMask, ShuftiMask, TruffleMask, TruffleWideMask};
pub use scan::miracle::COUNTING_MIRACLE_LEN_MAX;
pub use scan::noodle::NoodTable;
pub use scan::truffle::{rtruffle_wide_exec, truffle_wide_exec};
