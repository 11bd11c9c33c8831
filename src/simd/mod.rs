// Fixed-width vector backends.
//
// `vector` holds the trait and shared helpers; one module per target family
// holds the concrete implementations. The scalar backend compiles
// everywhere and defines the reference semantics.

pub(crate) mod scalar;
pub(crate) mod vector;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;
