//! Digest function adapters.
//!
//! Both adapters compute plain SHA-256 and produce identical trees; the
//! `ring` one is only compiled with the `ring` feature.

use std::fmt;
use std::hash::Hasher;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::hash::{Algorithm, Element};

/// SHA-256 digest value.
pub type Sha256Hash = [u8; 32];

/// SHA-256 over the `sha2` crate.
#[derive(Clone, Default)]
pub struct Sha256Algorithm(Sha256);

impl Sha256Algorithm {
    /// Creates a hasher with an empty data stream.
    pub fn new() -> Sha256Algorithm {
        Sha256Algorithm(Sha256::new())
    }
}

impl fmt::Debug for Sha256Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Sha256Algorithm")
    }
}

impl Hasher for Sha256Algorithm {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        self.0.update(msg)
    }

    fn finish(&self) -> u64 {
        let h = self.0.clone().finalize();
        let mut b = [0u8; 8];
        b.copy_from_slice(&h[..8]);
        u64::from_le_bytes(b)
    }
}

impl Algorithm<Sha256Hash> for Sha256Algorithm {
    #[inline]
    fn hash(&mut self) -> Result<Sha256Hash> {
        Ok(Sha256Hash::from_slice(&self.0.finalize_reset()))
    }

    #[inline]
    fn reset(&mut self) {
        Digest::reset(&mut self.0);
    }
}

#[cfg(feature = "ring")]
pub use self::ring_impl::RingSha256Algorithm;

#[cfg(feature = "ring")]
mod ring_impl {
    use std::fmt;
    use std::hash::Hasher;

    use anyhow::Result;
    use ring::digest::{Context, SHA256};

    use super::Sha256Hash;
    use crate::hash::{Algorithm, Element};

    /// SHA-256 over `ring::digest`.
    #[derive(Clone)]
    pub struct RingSha256Algorithm(Context);

    impl RingSha256Algorithm {
        /// Creates a hasher with an empty data stream.
        pub fn new() -> RingSha256Algorithm {
            RingSha256Algorithm(Context::new(&SHA256))
        }
    }

    impl Default for RingSha256Algorithm {
        fn default() -> RingSha256Algorithm {
            RingSha256Algorithm::new()
        }
    }

    impl fmt::Debug for RingSha256Algorithm {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("RingSha256Algorithm")
        }
    }

    impl Hasher for RingSha256Algorithm {
        #[inline]
        fn write(&mut self, msg: &[u8]) {
            self.0.update(msg)
        }

        fn finish(&self) -> u64 {
            let h = self.0.clone().finish();
            let mut b = [0u8; 8];
            b.copy_from_slice(&h.as_ref()[..8]);
            u64::from_le_bytes(b)
        }
    }

    impl Algorithm<Sha256Hash> for RingSha256Algorithm {
        /// `ring::digest::Context` is consumed by `finish`, so the running
        /// context is swapped for a fresh one before finalizing.
        #[inline]
        fn hash(&mut self) -> Result<Sha256Hash> {
            let ctx = std::mem::replace(&mut self.0, Context::new(&SHA256));
            Ok(Sha256Hash::from_slice(ctx.finish().as_ref()))
        }

        #[inline]
        fn reset(&mut self) {
            self.0 = Context::new(&SHA256);
        }
    }
}
