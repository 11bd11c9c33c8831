// Precompiled scan masks: small architecture-independent blobs built from a
// CharClass once, then handed to the scanners by value or reference.

pub mod shufti;
pub mod truffle;

pub use shufti::{ShuftiDoubleMask, ShuftiMask};
pub use truffle::{TruffleMask, TruffleWideMask};
