use std::collections::BTreeSet;

use super::sampling::NoiseSampler;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum KeyType {
    Encryption,
    Multiplication,
    Conjugation,
    Rotation(usize),
}

/// Identifies the secret every ciphertext and evaluation key is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sk {
    pub(crate) id: u64,
}

/// Key material enabling ciphertext x ciphertext multiplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelinearizationKey {
    pub(crate) key_id: u64,
}

/// Galois keys: left rotations, one per offset, and optionally the complex
/// conjugation. Never mutated once generated; larger sets are built with
/// [`RotationKeySet::union`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationKeySet {
    pub(crate) key_id: Option<u64>,
    offsets: BTreeSet<usize>,
    conjugation: bool,
}

impl RotationKeySet {
    pub fn contains(&self, offset: usize) -> bool {
        self.offsets.contains(&offset)
    }

    pub fn has_conjugation(&self) -> bool {
        self.conjugation
    }

    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty() && !self.conjugation
    }

    /// Keys of both sets. Keys bound to a different secret than `self` are
    /// dropped: they could not switch keys for ciphertexts under `self`'s secret.
    pub fn union(&self, other: &RotationKeySet) -> RotationKeySet {
        match (self.key_id, other.key_id) {
            (Some(a), Some(b)) if a != b => self.clone(),
            (None, _) => other.clone(),
            _ => RotationKeySet {
                key_id: self.key_id,
                offsets: self.offsets.union(&other.offsets).copied().collect(),
                conjugation: self.conjugation || other.conjugation,
            },
        }
    }
}

/// Derives every key from a secret.
#[derive(Debug, Clone, Copy)]
pub struct KeyGenerator {
    slots: usize,
}

impl KeyGenerator {
    pub(crate) fn new(slots: usize) -> Self {
        Self { slots }
    }

    pub fn gen_secret_key(&self, sampler: &mut NoiseSampler) -> Sk {
        Sk { id: sampler.next_u64() }
    }

    pub fn gen_relinearization_key(&self, sk: &Sk) -> RelinearizationKey {
        RelinearizationKey { key_id: sk.id }
    }

    /// Rotation keys for the given left offsets, reduced mod the slot count.
    /// Offset 0 needs no key.
    pub fn gen_rotation_keys(&self, sk: &Sk, offsets: &[usize]) -> RotationKeySet {
        RotationKeySet {
            key_id: Some(sk.id),
            offsets: offsets
                .iter()
                .map(|&rot| rot % self.slots)
                .filter(|&rot| rot != 0)
                .collect(),
            conjugation: false,
        }
    }

    /// Key for the automorphism X -> X^-1, which conjugates every slot.
    pub fn gen_conjugation_key(&self, sk: &Sk) -> RotationKeySet {
        RotationKeySet {
            key_id: Some(sk.id),
            offsets: BTreeSet::new(),
            conjugation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keys_are_reduced() {
        let mut sampler = NoiseSampler::new(b"keys", 3.2).unwrap();
        let kgen = KeyGenerator::new(8);
        let sk = kgen.gen_secret_key(&mut sampler);
        let keys = kgen.gen_rotation_keys(&sk, &[1, 9, 0, 8, 3]);
        assert_eq!(keys.offsets().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_union_is_append_only() {
        let mut sampler = NoiseSampler::new(b"keys", 3.2).unwrap();
        let kgen = KeyGenerator::new(64);
        let sk = kgen.gen_secret_key(&mut sampler);
        let a = kgen.gen_rotation_keys(&sk, &[1, 2]);
        let b = kgen.gen_rotation_keys(&sk, &[2, 4]);
        let both = a.union(&b);
        assert_eq!(both.offsets().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(a.len(), 2);
        assert!(RotationKeySet::default().union(&a) == a);
    }

    #[test]
    fn test_conjugation_key_survives_union() {
        let mut sampler = NoiseSampler::new(b"keys", 3.2).unwrap();
        let kgen = KeyGenerator::new(64);
        let sk = kgen.gen_secret_key(&mut sampler);
        let rotations = kgen.gen_rotation_keys(&sk, &[1]);
        let conj = kgen.gen_conjugation_key(&sk);
        assert!(!rotations.has_conjugation());
        assert!(!conj.is_empty());

        let both = rotations.union(&conj);
        assert!(both.has_conjugation());
        assert!(both.contains(1));
    }

    #[test]
    fn test_union_ignores_foreign_keys() {
        let mut sampler = NoiseSampler::new(b"keys", 3.2).unwrap();
        let kgen = KeyGenerator::new(64);
        let sk1 = kgen.gen_secret_key(&mut sampler);
        let sk2 = kgen.gen_secret_key(&mut sampler);
        let a = kgen.gen_rotation_keys(&sk1, &[1]);
        let b = kgen.gen_rotation_keys(&sk2, &[2]);
        assert_eq!(a.union(&b), a);
    }
}
