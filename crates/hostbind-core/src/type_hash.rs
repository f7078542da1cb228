//! Deterministic hash-based identity for exposed types and callables.
//!
//! [`TypeHash`] is a 64-bit hash computed from names, so the same
//! declaration always produces the same identity regardless of the order in
//! which bindings are registered. Handles carry their type's hash, which lets
//! the registry dispatch on a handle without a name lookup.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so a type, a free
//! function, a method and a field that share a name never collide.
//!
//! # Examples
//!
//! ```
//! use hostbind_core::TypeHash;
//!
//! let point = TypeHash::from_name("Point");
//! assert_eq!(point, TypeHash::from_name("Point"));
//!
//! let method = TypeHash::from_method(point, "scaled");
//! assert_ne!(method, TypeHash::from_function("scaled"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant mixed between owner and member
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for free function hashes
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructor hashes
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for field accessor hashes
    pub const FIELD: u64 = 0x1a095090689d4647;

    /// Distinguishes a field setter from its getter
    pub const SETTER: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit hash identifying a type, function, method or field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from an exposed type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a hash for a free function.
    #[inline]
    pub fn from_function(name: &str) -> Self {
        TypeHash(hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a hash for a method of `owner`.
    ///
    /// The owner is folded in with a multiply so `(A, m)` and `(B, m)` stay
    /// distinct even when the XOR of the two owner hashes is zero.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str) -> Self {
        let hash = (hash_constants::METHOD ^ owner.0)
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(xxh64(name.as_bytes(), 0));
        TypeHash(hash)
    }

    /// Create a hash for the constructor of `owner`.
    #[inline]
    pub fn from_constructor(owner: TypeHash) -> Self {
        TypeHash((hash_constants::CONSTRUCTOR ^ owner.0).wrapping_mul(hash_constants::SEP))
    }

    /// Create a hash for the getter of field `name` on `owner`.
    #[inline]
    pub fn from_field(owner: TypeHash, name: &str) -> Self {
        let hash = (hash_constants::FIELD ^ owner.0)
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(xxh64(name.as_bytes(), 0));
        TypeHash(hash)
    }

    /// Create a hash for the setter of field `name` on `owner`.
    #[inline]
    pub fn from_field_setter(owner: TypeHash, name: &str) -> Self {
        TypeHash(Self::from_field(owner, name).0 ^ hash_constants::SETTER)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
