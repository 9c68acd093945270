use std::hash::Hasher;

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};

use crate::digest::Sha256Hash;
use crate::hash::{Algorithm, Element};

pub const THREAD_COUNTS: [usize; 5] = [1, 2, 3, 8, 64];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sha256(data: &[u8]) -> Sha256Hash {
    Sha256Hash::from_slice(&Sha256::digest(data))
}

pub fn sha256_pair(left: &Sha256Hash, right: &Sha256Hash) -> Sha256Hash {
    let mut c = Sha256::new();
    c.update(left);
    c.update(right);
    Sha256Hash::from_slice(&c.finalize())
}

/// `["0", "1", ..]`
pub fn numbered_leaves(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

/// Level by level serial reference with the same self pairing rule.
pub fn serial_root<D: AsRef<[u8]>>(leaves: &[D]) -> Sha256Hash {
    assert!(!leaves.is_empty());

    let mut level: Vec<Sha256Hash> = leaves.iter().map(|l| sha256(l.as_ref())).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                sha256_pair(&pair[0], right)
            })
            .collect();
    }
    level[0]
}

/// SHA-256 buffering its input so the whole message can be inspected on
/// `hash`.
#[derive(Debug, Clone, Default)]
pub struct Buffered(pub Vec<u8>);

impl Buffered {
    pub fn left_child(&self) -> Option<&[u8]> {
        if self.0.len() == 2 * Sha256Hash::byte_len() {
            Some(&self.0[..Sha256Hash::byte_len()])
        } else {
            None
        }
    }
}

impl Hasher for Buffered {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes)
    }

    fn finish(&self) -> u64 {
        unimplemented!()
    }
}

/// Fails on the `poison` leaf and on every interior node whose left child
/// is the `taint` leaf.
#[derive(Debug, Clone, Default)]
pub struct PoisonAlgorithm(Buffered);

impl Hasher for PoisonAlgorithm {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes)
    }

    fn finish(&self) -> u64 {
        unimplemented!()
    }
}

impl Algorithm<Sha256Hash> for PoisonAlgorithm {
    fn hash(&mut self) -> Result<Sha256Hash> {
        let data = std::mem::take(&mut (self.0).0);
        if data == b"poison" {
            bail!("poisoned leaf");
        }
        let buf = Buffered(data);
        if buf.left_child() == Some(&sha256(b"taint")[..]) {
            bail!("tainted node");
        }
        Ok(sha256(&buf.0))
    }

    fn reset(&mut self) {
        (self.0).0.clear();
    }
}

/// Panics on the `boom` leaf and on interior nodes whose left child is the
/// `fuse` leaf.
#[derive(Debug, Clone, Default)]
pub struct PanicAlgorithm(Buffered);

impl Hasher for PanicAlgorithm {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes)
    }

    fn finish(&self) -> u64 {
        unimplemented!()
    }
}

impl Algorithm<Sha256Hash> for PanicAlgorithm {
    fn hash(&mut self) -> Result<Sha256Hash> {
        let buf = Buffered(std::mem::take(&mut (self.0).0));
        if buf.0 == b"boom" {
            panic!("boom");
        }
        if buf.left_child() == Some(&sha256(b"fuse")[..]) {
            panic!("fuse");
        }
        Ok(sha256(&buf.0))
    }

    fn reset(&mut self) {
        (self.0).0.clear();
    }
}
