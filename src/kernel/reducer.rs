use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    backend::HomomorphicBackend,
    error::{Error, Result},
};

/// How the slots of a block are folded together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionStrategy {
    /// `k - 1` chained rotations by `step`. Only one rotation key is needed.
    Linear,
    /// Prefix doubling, `O(log k)` rotations over power-of-two offsets.
    #[default]
    Logarithmic,
}

/// Sums contiguous blocks of slots using rotations and additions only.
///
/// After [`RotateSumReducer::reduce`] with block width `k`, the first slot of
/// every block holds the sum of the `k` slots of that block. The other slots
/// hold partial sums reaching into the next block.
#[derive(Debug, Clone, Copy)]
pub struct RotateSumReducer {
    strategy: ReductionStrategy,
    step: usize,
}

impl RotateSumReducer {
    pub fn new(strategy: ReductionStrategy) -> Self {
        Self { strategy, step: 1 }
    }

    /// Sums slots that are `step` apart instead of adjacent ones.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn strategy(&self) -> ReductionStrategy {
        self.strategy
    }

    /// Rotation offsets [`Self::reduce`] uses for blocks of width `k`, in the
    /// order they are first needed and without duplicates.
    pub fn rotation_offsets(&self, k: usize) -> Vec<usize> {
        let mut offsets = Vec::new();
        match self.strategy {
            ReductionStrategy::Linear => {
                if k > 1 {
                    offsets.push(self.step);
                }
            }
            ReductionStrategy::Logarithmic => {
                let mut offset = 0;
                let mut width = 1;
                while width <= k {
                    if k & width != 0 {
                        if offset != 0 {
                            offsets.push(offset * self.step);
                        }
                        offset += width;
                    }
                    if 2 * width > k {
                        break;
                    }
                    offsets.push(width * self.step);
                    width *= 2;
                }
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        offsets.retain(|rot| seen.insert(*rot));
        offsets
    }

    pub fn reduce<B: HomomorphicBackend>(&self, backend: &B, ct: &B::Ciphertext, k: usize) -> Result<B::Ciphertext> {
        if k == 0 {
            return Err(Error::Shape("cannot reduce blocks of width 0".into()));
        }
        match self.strategy {
            ReductionStrategy::Linear => self.reduce_linear(backend, ct, k),
            ReductionStrategy::Logarithmic => self.reduce_logarithmic(backend, ct, k),
        }
    }

    fn reduce_linear<B: HomomorphicBackend>(&self, backend: &B, ct: &B::Ciphertext, k: usize) -> Result<B::Ciphertext> {
        let mut acc = ct.clone();
        let mut rotated = ct.clone();
        for i in 1..k {
            rotated = backend.rotate(&rotated, self.step)?;
            acc = backend.add(&acc, &rotated)?;
            trace!(i, "linear reduction step");
        }
        Ok(acc)
    }

    /// `power` covers a window of `width` slots and doubles each round; the
    /// windows matching the set bits of `k` are shifted into place and added.
    fn reduce_logarithmic<B: HomomorphicBackend>(
        &self,
        backend: &B,
        ct: &B::Ciphertext,
        k: usize,
    ) -> Result<B::Ciphertext> {
        let mut acc: Option<B::Ciphertext> = None;
        let mut power = ct.clone();
        let mut offset = 0;
        let mut width = 1;
        loop {
            if k & width != 0 {
                let term = if offset == 0 {
                    power.clone()
                } else {
                    backend.rotate(&power, offset * self.step)?
                };
                acc = Some(match acc {
                    Some(acc) => backend.add(&acc, &term)?,
                    None => term,
                });
                trace!(width, offset, "window added");
                offset += width;
            }
            if 2 * width > k {
                break;
            }
            let rotated = backend.rotate(&power, width * self.step)?;
            power = backend.add(&power, &rotated)?;
            width *= 2;
        }
        acc.ok_or_else(|| Error::Shape(format!("no window covers a block of width {k}")))
    }
}
