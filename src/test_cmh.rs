use std::hash::Hasher;

use anyhow::Result;

use crate::digest::{Sha256Algorithm, Sha256Hash};
use crate::hash::Algorithm;
use crate::merkle::{MerkleTree, Sha256MerkleTree};
use crate::test_common::{numbered_leaves, sha256, THREAD_COUNTS};

/// MT leaf hash prefix
const LEAF: u8 = 0x00;

/// MT interior node hash prefix
const INTERIOR: u8 = 0x01;

/// Custom merkle hasher: RFC 6962 style domain separation on top of SHA-256.
#[derive(Debug, Clone, Default)]
struct CMH(Sha256Algorithm);

impl Hasher for CMH {
    fn write(&mut self, msg: &[u8]) {
        self.0.write(msg)
    }

    fn finish(&self) -> u64 {
        self.0.finish()
    }
}

impl Algorithm<Sha256Hash> for CMH {
    fn hash(&mut self) -> Result<Sha256Hash> {
        self.0.hash()
    }

    fn reset(&mut self) {
        self.0.reset()
    }

    fn leaf(&mut self, payload: &[u8]) -> Result<Sha256Hash> {
        self.reset();
        self.write_u8(LEAF);
        self.write(payload);
        self.hash()
    }

    fn node(&mut self, left: &Sha256Hash, right: &Sha256Hash) -> Result<Sha256Hash> {
        self.reset();
        self.write_u8(INTERIOR);
        self.write(left);
        self.write(right);
        self.hash()
    }
}

fn cmh_reference(leaves: &[String]) -> Sha256Hash {
    let mut level: Vec<Sha256Hash> = leaves
        .iter()
        .map(|l| {
            let mut buf = vec![LEAF];
            buf.extend_from_slice(l.as_bytes());
            sha256(&buf)
        })
        .collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = vec![INTERIOR];
                buf.extend_from_slice(&pair[0]);
                buf.extend_from_slice(pair.get(1).unwrap_or(&pair[0]));
                sha256(&buf)
            })
            .collect();
    }
    level[0]
}

#[test]
fn test_custom_merkle_hasher() {
    for n in [1usize, 2, 3, 6, 17, 100].iter() {
        let leaves = numbered_leaves(*n);
        let expected = cmh_reference(&leaves);

        for &threads in THREAD_COUNTS.iter() {
            let mt: MerkleTree<Sha256Hash, CMH> = MerkleTree::build(&leaves, threads).unwrap();
            assert_eq!(mt.root(), expected, "{} leaves, {} threads", n, threads);
        }
    }
}

#[test]
fn test_custom_hasher_keeps_shape() {
    let leaves = numbered_leaves(6);
    let plain = Sha256MerkleTree::build(&leaves, 4).unwrap();
    let custom: MerkleTree<Sha256Hash, CMH> = MerkleTree::build(&leaves, 4).unwrap();

    assert_eq!(plain.len(), custom.len());
    assert_eq!(plain.height(), custom.height());
    for (p, c) in plain.nodes().iter().zip(custom.nodes()) {
        assert_eq!(p.kind(), c.kind());
        assert_eq!(p.parent(), c.parent());
        assert_ne!(p.hash(), c.hash());
    }
}
