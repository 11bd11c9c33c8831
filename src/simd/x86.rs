// x86_64 implementations of the vector abstraction.
//
// `V128` needs SSSE3 (pshufb), `V256` needs AVX2. `V512` is the 64-byte
// width assembled from two `V256` halves; the AVX-512 dispatch tiers select
// it, and any AVX2-capable machine can execute it.

use core::arch::x86_64::*;

use super::vector::{LOADMASK, Vector, copy_runt_block};

// ---------------------------------------------------------------------------
// V128 (SSSE3)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub(crate) struct V128(__m128i);

impl V128 {
    #[inline(always)]
    pub(crate) fn bytes(self) -> [u8; 16] {
        // Safety: __m128i is a plain 16-byte value.
        unsafe { core::mem::transmute(self.0) }
    }
}

impl PartialEq for V128 {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl core::fmt::Debug for V128 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "V128({:02x?})", self.bytes())
    }
}

unsafe impl Vector for V128 {
    const LANES: usize = 16;
    const MASK_WIDTH: u32 = 1;
    const MASK_BITS: u32 = 16;

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        unsafe { V128(_mm_set1_epi8(b as i8)) }
    }

    #[inline(always)]
    unsafe fn splat_u16(h: u16) -> Self {
        unsafe { V128(_mm_set1_epi16(h as i16)) }
    }

    #[inline(always)]
    unsafe fn splat_u32(d: u32) -> Self {
        unsafe { V128(_mm_set1_epi32(d as i32)) }
    }

    #[inline(always)]
    unsafe fn splat_u64(q: u64) -> Self {
        unsafe { V128(_mm_set1_epi64x(q as i64)) }
    }

    #[inline(always)]
    unsafe fn zeroes() -> Self {
        unsafe { V128(_mm_setzero_si128()) }
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        unsafe { V128(_mm_set1_epi8(-1)) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert_eq!(ptr as usize % 16, 0);
        unsafe { V128(_mm_load_si128(ptr as *const __m128i)) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { V128(_mm_loadu_si128(ptr as *const __m128i)) }
    }

    #[inline(always)]
    unsafe fn load_zero_pad(ptr: *const u8, len: usize) -> Self {
        debug_assert!(len <= 16);
        let mut tmp = [0u8; 16];
        unsafe {
            copy_runt_block(tmp.as_mut_ptr(), ptr, len);
            Self::load_unaligned(tmp.as_ptr())
        }
    }

    #[inline(always)]
    unsafe fn load_tbl16(tbl: &[u8; 16]) -> Self {
        unsafe { Self::load_unaligned(tbl.as_ptr()) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        unsafe { _mm_storeu_si128(ptr as *mut __m128i, self.0) }
    }

    #[inline(always)]
    unsafe fn and(self, b: Self) -> Self {
        unsafe { V128(_mm_and_si128(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn or(self, b: Self) -> Self {
        unsafe { V128(_mm_or_si128(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn xor(self, b: Self) -> Self {
        unsafe { V128(_mm_xor_si128(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn not(self) -> Self {
        unsafe { self.xor(Self::ones()) }
    }

    #[inline(always)]
    unsafe fn andnot(self, b: Self) -> Self {
        // The intrinsic computes !a & b, so the operands swap.
        unsafe { V128(_mm_andnot_si128(b.0, self.0)) }
    }

    #[inline(always)]
    unsafe fn eq(self, b: Self) -> Self {
        unsafe { V128(_mm_cmpeq_epi8(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn gt_signed(self, b: Self) -> Self {
        unsafe { V128(_mm_cmpgt_epi8(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn lt_signed(self, b: Self) -> Self {
        unsafe { V128(_mm_cmpgt_epi8(b.0, self.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle(self, idx: Self) -> Self {
        unsafe { V128(_mm_shuffle_epi8(self.0, idx.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle_maskz(self, idx: Self) -> Self {
        // pshufb already zeroes high-bit lanes.
        unsafe { V128(_mm_shuffle_epi8(self.0, idx.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle_maskz_len(self, idx: Self, len: usize) -> Self {
        debug_assert!(len <= 16);
        unsafe {
            let live = Self::load_unaligned(LOADMASK.as_ptr().add(64 - len));
            self.shuffle_maskz(idx).and(live)
        }
    }

    #[inline(always)]
    unsafe fn shr16<const N: i32>(self) -> Self {
        unsafe { V128(_mm_srli_epi16::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl16<const N: i32>(self) -> Self {
        unsafe { V128(_mm_slli_epi16::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shr32<const N: i32>(self) -> Self {
        unsafe { V128(_mm_srli_epi32::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl32<const N: i32>(self) -> Self {
        unsafe { V128(_mm_slli_epi32::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shr64<const N: i32>(self) -> Self {
        unsafe { V128(_mm_srli_epi64::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl64<const N: i32>(self) -> Self {
        unsafe { V128(_mm_slli_epi64::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shift_right_bytes<const N: i32>(self) -> Self {
        unsafe { V128(_mm_srli_si128::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shift_left_bytes<const N: i32>(self) -> Self {
        unsafe { V128(_mm_slli_si128::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn alignr(self, low: Self, offset: usize) -> Self {
        debug_assert!(offset <= 16);
        // palignr takes an immediate; select the variant by case, as wide as
        // the window can sit.
        unsafe {
            match offset {
                0 => low,
                1 => V128(_mm_alignr_epi8::<1>(self.0, low.0)),
                2 => V128(_mm_alignr_epi8::<2>(self.0, low.0)),
                3 => V128(_mm_alignr_epi8::<3>(self.0, low.0)),
                4 => V128(_mm_alignr_epi8::<4>(self.0, low.0)),
                5 => V128(_mm_alignr_epi8::<5>(self.0, low.0)),
                6 => V128(_mm_alignr_epi8::<6>(self.0, low.0)),
                7 => V128(_mm_alignr_epi8::<7>(self.0, low.0)),
                8 => V128(_mm_alignr_epi8::<8>(self.0, low.0)),
                9 => V128(_mm_alignr_epi8::<9>(self.0, low.0)),
                10 => V128(_mm_alignr_epi8::<10>(self.0, low.0)),
                11 => V128(_mm_alignr_epi8::<11>(self.0, low.0)),
                12 => V128(_mm_alignr_epi8::<12>(self.0, low.0)),
                13 => V128(_mm_alignr_epi8::<13>(self.0, low.0)),
                14 => V128(_mm_alignr_epi8::<14>(self.0, low.0)),
                15 => V128(_mm_alignr_epi8::<15>(self.0, low.0)),
                _ => self,
            }
        }
    }

    #[inline(always)]
    unsafe fn comparemask(self) -> u64 {
        unsafe { _mm_movemask_epi8(self.0) as u32 as u64 }
    }
}

// ---------------------------------------------------------------------------
// V256 (AVX2)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub(crate) struct V256(__m256i);

impl V256 {
    #[inline(always)]
    pub(crate) fn bytes(self) -> [u8; 32] {
        // Safety: __m256i is a plain 32-byte value.
        unsafe { core::mem::transmute(self.0) }
    }
}

impl PartialEq for V256 {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl core::fmt::Debug for V256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "V256({:02x?})", self.bytes())
    }
}

unsafe impl Vector for V256 {
    const LANES: usize = 32;
    const MASK_WIDTH: u32 = 1;
    const MASK_BITS: u32 = 32;

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        unsafe { V256(_mm256_set1_epi8(b as i8)) }
    }

    #[inline(always)]
    unsafe fn splat_u16(h: u16) -> Self {
        unsafe { V256(_mm256_set1_epi16(h as i16)) }
    }

    #[inline(always)]
    unsafe fn splat_u32(d: u32) -> Self {
        unsafe { V256(_mm256_set1_epi32(d as i32)) }
    }

    #[inline(always)]
    unsafe fn splat_u64(q: u64) -> Self {
        unsafe { V256(_mm256_set1_epi64x(q as i64)) }
    }

    #[inline(always)]
    unsafe fn zeroes() -> Self {
        unsafe { V256(_mm256_setzero_si256()) }
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        unsafe { V256(_mm256_set1_epi8(-1)) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert_eq!(ptr as usize % 32, 0);
        unsafe { V256(_mm256_load_si256(ptr as *const __m256i)) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { V256(_mm256_loadu_si256(ptr as *const __m256i)) }
    }

    #[inline(always)]
    unsafe fn load_zero_pad(ptr: *const u8, len: usize) -> Self {
        debug_assert!(len <= 32);
        let mut tmp = [0u8; 32];
        unsafe {
            copy_runt_block(tmp.as_mut_ptr(), ptr, len);
            Self::load_unaligned(tmp.as_ptr())
        }
    }

    #[inline(always)]
    unsafe fn load_tbl16(tbl: &[u8; 16]) -> Self {
        unsafe {
            V256(_mm256_broadcastsi128_si256(_mm_loadu_si128(
                tbl.as_ptr() as *const __m128i
            )))
        }
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        unsafe { _mm256_storeu_si256(ptr as *mut __m256i, self.0) }
    }

    #[inline(always)]
    unsafe fn and(self, b: Self) -> Self {
        unsafe { V256(_mm256_and_si256(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn or(self, b: Self) -> Self {
        unsafe { V256(_mm256_or_si256(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn xor(self, b: Self) -> Self {
        unsafe { V256(_mm256_xor_si256(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn not(self) -> Self {
        unsafe { self.xor(Self::ones()) }
    }

    #[inline(always)]
    unsafe fn andnot(self, b: Self) -> Self {
        unsafe { V256(_mm256_andnot_si256(b.0, self.0)) }
    }

    #[inline(always)]
    unsafe fn eq(self, b: Self) -> Self {
        unsafe { V256(_mm256_cmpeq_epi8(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn gt_signed(self, b: Self) -> Self {
        unsafe { V256(_mm256_cmpgt_epi8(self.0, b.0)) }
    }

    #[inline(always)]
    unsafe fn lt_signed(self, b: Self) -> Self {
        unsafe { V256(_mm256_cmpgt_epi8(b.0, self.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle(self, idx: Self) -> Self {
        // vpshufb shuffles within each 128-bit lane, which is exactly what
        // the broadcast tables want.
        unsafe { V256(_mm256_shuffle_epi8(self.0, idx.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle_maskz(self, idx: Self) -> Self {
        unsafe { V256(_mm256_shuffle_epi8(self.0, idx.0)) }
    }

    #[inline(always)]
    unsafe fn shuffle_maskz_len(self, idx: Self, len: usize) -> Self {
        debug_assert!(len <= 32);
        unsafe {
            let live = Self::load_unaligned(LOADMASK.as_ptr().add(64 - len));
            self.shuffle_maskz(idx).and(live)
        }
    }

    #[inline(always)]
    unsafe fn shr16<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_srli_epi16::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl16<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_slli_epi16::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shr32<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_srli_epi32::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl32<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_slli_epi32::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shr64<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_srli_epi64::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shl64<const N: i32>(self) -> Self {
        unsafe { V256(_mm256_slli_epi64::<N>(self.0)) }
    }

    #[inline(always)]
    unsafe fn shift_right_bytes<const N: i32>(self) -> Self {
        // Shift across the 128-bit lane boundary: feed palignr the upper
        // half so lane 0 can pull bytes from lane 1.
        unsafe {
            let hi = _mm256_permute2x128_si256::<0x81>(self.0, self.0);
            V256(_mm256_alignr_epi8::<N>(hi, self.0))
        }
    }

    #[inline(always)]
    unsafe fn shift_left_bytes<const N: i32>(self) -> Self {
        // Cold operation; a spill through memory keeps the immediate
        // arithmetic out of const generics.
        let mut tmp = [0u8; 64];
        unsafe {
            self.store_unaligned(tmp.as_mut_ptr().add(32));
            Self::load_unaligned(tmp.as_ptr().add(32 - N as usize))
        }
    }

    #[inline(always)]
    unsafe fn alignr(self, low: Self, offset: usize) -> Self {
        debug_assert!(offset <= 32);
        let mut tmp = [0u8; 64];
        unsafe {
            low.store_unaligned(tmp.as_mut_ptr());
            self.store_unaligned(tmp.as_mut_ptr().add(32));
            Self::load_unaligned(tmp.as_ptr().add(offset))
        }
    }

    #[inline(always)]
    unsafe fn comparemask(self) -> u64 {
        unsafe { _mm256_movemask_epi8(self.0) as u32 as u64 }
    }
}

// ---------------------------------------------------------------------------
// V512 (two V256 halves)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq)]
pub(crate) struct V512 {
    lo: V256,
    hi: V256,
}

impl V512 {
    /// Assemble the 64-byte width from two 32-byte halves.
    #[inline(always)]
    pub(crate) fn from_halves(lo: V256, hi: V256) -> Self {
        V512 { lo, hi }
    }
}

impl core::fmt::Debug for V512 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "V512({:02x?}, {:02x?})", self.lo.bytes(), self.hi.bytes())
    }
}

macro_rules! per_half {
    ($self:ident, $b:ident, $op:ident) => {
        V512 {
            lo: unsafe { $self.lo.$op($b.lo) },
            hi: unsafe { $self.hi.$op($b.hi) },
        }
    };
    ($self:ident, $op:ident $(, const $n:ident)?) => {
        V512 {
            lo: unsafe { $self.lo.$op$(::<$n>)?() },
            hi: unsafe { $self.hi.$op$(::<$n>)?() },
        }
    };
}

unsafe impl Vector for V512 {
    const LANES: usize = 64;
    const MASK_WIDTH: u32 = 1;
    const MASK_BITS: u32 = 64;

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        let half = unsafe { V256::splat(b) };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn splat_u16(h: u16) -> Self {
        let half = unsafe { V256::splat_u16(h) };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn splat_u32(d: u32) -> Self {
        let half = unsafe { V256::splat_u32(d) };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn splat_u64(q: u64) -> Self {
        let half = unsafe { V256::splat_u64(q) };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn zeroes() -> Self {
        let half = unsafe { V256::zeroes() };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        let half = unsafe { V256::ones() };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert_eq!(ptr as usize % 64, 0);
        unsafe {
            V512::from_halves(V256::load_aligned(ptr), V256::load_aligned(ptr.add(32)))
        }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe {
            V512::from_halves(
                V256::load_unaligned(ptr),
                V256::load_unaligned(ptr.add(32)),
            )
        }
    }

    #[inline(always)]
    unsafe fn load_zero_pad(ptr: *const u8, len: usize) -> Self {
        debug_assert!(len <= 64);
        unsafe {
            if len > 32 {
                V512::from_halves(
                    V256::load_unaligned(ptr),
                    V256::load_zero_pad(ptr.add(32), len - 32),
                )
            } else {
                V512::from_halves(V256::load_zero_pad(ptr, len), V256::zeroes())
            }
        }
    }

    #[inline(always)]
    unsafe fn load_tbl16(tbl: &[u8; 16]) -> Self {
        let half = unsafe { V256::load_tbl16(tbl) };
        V512::from_halves(half, half)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        unsafe {
            self.lo.store_unaligned(ptr);
            self.hi.store_unaligned(ptr.add(32));
        }
    }

    #[inline(always)]
    unsafe fn and(self, b: Self) -> Self {
        per_half!(self, b, and)
    }

    #[inline(always)]
    unsafe fn or(self, b: Self) -> Self {
        per_half!(self, b, or)
    }

    #[inline(always)]
    unsafe fn xor(self, b: Self) -> Self {
        per_half!(self, b, xor)
    }

    #[inline(always)]
    unsafe fn not(self) -> Self {
        per_half!(self, not)
    }

    #[inline(always)]
    unsafe fn andnot(self, b: Self) -> Self {
        per_half!(self, b, andnot)
    }

    #[inline(always)]
    unsafe fn eq(self, b: Self) -> Self {
        per_half!(self, b, eq)
    }

    #[inline(always)]
    unsafe fn gt_signed(self, b: Self) -> Self {
        per_half!(self, b, gt_signed)
    }

    #[inline(always)]
    unsafe fn lt_signed(self, b: Self) -> Self {
        per_half!(self, b, lt_signed)
    }

    #[inline(always)]
    unsafe fn shuffle(self, idx: Self) -> Self {
        per_half!(self, idx, shuffle)
    }

    #[inline(always)]
    unsafe fn shuffle_maskz(self, idx: Self) -> Self {
        per_half!(self, idx, shuffle_maskz)
    }

    #[inline(always)]
    unsafe fn shuffle_maskz_len(self, idx: Self, len: usize) -> Self {
        debug_assert!(len <= 64);
        unsafe {
            if len > 32 {
                V512::from_halves(
                    self.lo.shuffle_maskz(idx.lo),
                    self.hi.shuffle_maskz_len(idx.hi, len - 32),
                )
            } else {
                V512::from_halves(self.lo.shuffle_maskz_len(idx.lo, len), V256::zeroes())
            }
        }
    }

    #[inline(always)]
    unsafe fn shr16<const N: i32>(self) -> Self {
        per_half!(self, shr16, const N)
    }

    #[inline(always)]
    unsafe fn shl16<const N: i32>(self) -> Self {
        per_half!(self, shl16, const N)
    }

    #[inline(always)]
    unsafe fn shr32<const N: i32>(self) -> Self {
        per_half!(self, shr32, const N)
    }

    #[inline(always)]
    unsafe fn shl32<const N: i32>(self) -> Self {
        per_half!(self, shl32, const N)
    }

    #[inline(always)]
    unsafe fn shr64<const N: i32>(self) -> Self {
        per_half!(self, shr64, const N)
    }

    #[inline(always)]
    unsafe fn shl64<const N: i32>(self) -> Self {
        per_half!(self, shl64, const N)
    }

    #[inline(always)]
    unsafe fn shift_right_bytes<const N: i32>(self) -> Self {
        unsafe {
            V512::from_halves(
                self.hi.alignr(self.lo, N as usize),
                self.hi.shift_right_bytes::<N>(),
            )
        }
    }

    #[inline(always)]
    unsafe fn shift_left_bytes<const N: i32>(self) -> Self {
        unsafe {
            // The top N bytes of the low half carry into the high half.
            let carry = V256::zeroes().alignr(self.lo, 32 - N as usize);
            V512::from_halves(
                self.lo.shift_left_bytes::<N>(),
                carry.or(self.hi.shift_left_bytes::<N>()),
            )
        }
    }

    #[inline(always)]
    unsafe fn alignr(self, low: Self, offset: usize) -> Self {
        debug_assert!(offset <= 64);
        let mut tmp = [0u8; 128];
        unsafe {
            low.store_unaligned(tmp.as_mut_ptr());
            self.store_unaligned(tmp.as_mut_ptr().add(64));
            Self::load_unaligned(tmp.as_ptr().add(offset))
        }
    }

    #[inline(always)]
    unsafe fn comparemask(self) -> u64 {
        unsafe { self.lo.comparemask() | (self.hi.comparemask() << 32) }
    }
}

// ---------------------------------------------------------------------------
// Tests (all runtime-gated on the host's features)
// ---------------------------------------------------------------------------
