use std::fmt::Debug;
use std::hash::Hasher;

use anyhow::Result;

/// Digest value stored in the merkle tree.
pub trait Element: Clone + Eq + AsRef<[u8]> + Send + Sync + Default + Debug {
    /// Returns the length of an element when serialized as a byte slice.
    fn byte_len() -> usize;

    /// Creates the element from its byte form. Panics if the slice is not appropriately sized.
    fn from_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($len:expr),*) => {$(
        impl Element for [u8; $len] {
            fn byte_len() -> usize {
                $len
            }

            fn from_slice(bytes: &[u8]) -> Self {
                assert_eq!(bytes.len(), Self::byte_len());
                let mut el = [0u8; $len];
                el[..].copy_from_slice(bytes);
                el
            }
        }
    )*}
}

impl_element!(16, 20, 28, 32);

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait and provides methods to return
/// full length hash and reset current state. The data stream is fed through
/// [`Hasher::write`].
///
/// A fresh instance is created per worker with [`Default`], so implementations
/// must not share mutable state between instances. Given the same input, every
/// instance must return the same digest.
///
/// Leaf digests are the digest of the payload alone and node digests are the
/// digest of `left ++ right`. Implementations may override [`Algorithm::leaf`]
/// and [`Algorithm::node`] to add their own framing.
pub trait Algorithm<T>: Hasher + Default
where
    T: Element,
{
    /// Returns the hash value for the data stream written so far.
    fn hash(&mut self) -> Result<T>;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Returns the hash value of a leaf payload.
    fn leaf(&mut self, payload: &[u8]) -> Result<T> {
        self.reset();
        self.write(payload);
        self.hash()
    }

    /// Returns the hash value of an interior node from its children hashes.
    fn node(&mut self, left: &T, right: &T) -> Result<T> {
        self.reset();
        self.write(left.as_ref());
        self.write(right.as_ref());
        self.hash()
    }
}
