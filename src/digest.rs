//! Key digests: 32-bit hashes with a reserved zero.
//!
//! The hash table stores digests, not keys, and digest 0 is the slot sentinel
//! for "never occupied". A conforming [`KeyDigest`] implementation must never
//! produce 0 for a valid key; the provided implementations fold a computed 0
//! back to the FNV offset basis so the sentinel is unreachable.

/// 32-bit digest of a key.
///
/// Contract: `digest` must never return 0 for any valid key, and equal keys
/// must produce equal digests. The table keys on the digest alone — two keys
/// with the same digest are the same entry.
pub trait KeyDigest {
    fn digest(&self) -> u32;
}

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn nonzero(digest: u32) -> u32 {
    if digest == 0 {
        FNV_OFFSET
    } else {
        digest
    }
}

/// FNV-1a over a byte slice.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut digest = FNV_OFFSET;
    for &byte in bytes {
        digest ^= u32::from(byte);
        digest = digest.wrapping_mul(FNV_PRIME);
    }
    nonzero(digest)
}

/// Avalanche finalizer for integer keys. Bijective on `u32` (modulo the zero
/// fold), so distinct 32-bit keys get distinct digests.
pub fn mix32(value: u32) -> u32 {
    let mut digest = value;
    digest ^= digest >> 16;
    digest = digest.wrapping_mul(0x85eb_ca6b);
    digest ^= digest >> 13;
    digest = digest.wrapping_mul(0xc2b2_ae35);
    digest ^= digest >> 16;
    nonzero(digest)
}

fn mix64(value: u64) -> u32 {
    mix32((value ^ (value >> 32)) as u32)
}

macro_rules! digest_via_mix32 {
    ($($ty:ty),*) => {
        $(impl KeyDigest for $ty {
            fn digest(&self) -> u32 {
                mix32(*self as u32)
            }
        })*
    };
}

macro_rules! digest_via_mix64 {
    ($($ty:ty),*) => {
        $(impl KeyDigest for $ty {
            fn digest(&self) -> u32 {
                mix64(*self as u64)
            }
        })*
    };
}

digest_via_mix32!(u8, u16, u32, i8, i16, i32);
digest_via_mix64!(u64, i64, usize, isize);

impl KeyDigest for str {
    fn digest(&self) -> u32 {
        fnv1a(self.as_bytes())
    }
}

impl KeyDigest for String {
    fn digest(&self) -> u32 {
        fnv1a(self.as_bytes())
    }
}

impl KeyDigest for [u8] {
    fn digest(&self) -> u32 {
        fnv1a(self)
    }
}

impl<K: KeyDigest + ?Sized> KeyDigest for &K {
    fn digest(&self) -> u32 {
        (**self).digest()
    }
}
