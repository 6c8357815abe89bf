//! In-memory host that records merge requests.
//!
//! Useful for dry runs (what would be patched, at which ratio) and for
//! exercising a sculptor without a real model behind it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{keys_with_prefix, KeyPatches, PatchableModel, Result};

/// One merge request received by a [`RecordingModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPatch<P> {
    /// Patch key.
    pub key: String,
    /// Payload as handed over.
    pub payload: P,
    /// Weight applied to the existing contribution.
    pub base_strength: f64,
    /// Weight applied to the payload.
    pub ratio: f64,
}

/// Model stand-in holding a key-patches map and a log of merges.
#[derive(Debug)]
pub struct RecordingModel<P> {
    patches: KeyPatches<P>,
    applied: Vec<AppliedPatch<P>>,
    clones: Arc<AtomicUsize>,
}

impl<P: Clone> RecordingModel<P> {
    /// Create a model with the given registered patches.
    pub fn new(patches: KeyPatches<P>) -> Self {
        Self {
            patches,
            applied: Vec::new(),
            clones: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registered patches.
    pub fn patches(&self) -> &KeyPatches<P> {
        &self.patches
    }

    /// Merge requests received, in order.
    pub fn applied(&self) -> &[AppliedPatch<P>] {
        &self.applied
    }

    /// Sum of ratios merged for `key`.
    pub fn total_ratio(&self, key: &str) -> f64 {
        self.applied
            .iter()
            .filter(|a| a.key == key)
            .map(|a| a.ratio)
            .sum()
    }

    /// Number of clones taken from this model or any of its clones.
    pub fn clone_count(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }
}

impl RecordingModel<()> {
    /// Create a model from bare key names, with empty payloads.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(keys.into_iter().map(|k| (k.into(), ())).collect())
    }
}

impl<P: Clone> PatchableModel for RecordingModel<P> {
    type Patch = P;

    fn clone_model(&self) -> Result<Self> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            patches: self.patches.clone(),
            applied: self.applied.clone(),
            clones: Arc::clone(&self.clones),
        })
    }

    fn key_patches(&self, namespace: &str) -> Result<KeyPatches<P>> {
        Ok(keys_with_prefix(&self.patches, namespace)
            .map(|(k, p)| (k.clone(), p.clone()))
            .collect())
    }

    fn add_patches(
        &mut self,
        patches: KeyPatches<P>,
        base_strength: f64,
        ratio: f64,
    ) -> Result<Vec<String>> {
        let mut accepted = Vec::with_capacity(patches.len());
        for (key, payload) in patches {
            if !self.patches.contains_key(&key) {
                continue;
            }
            accepted.push(key.clone());
            self.applied.push(AppliedPatch {
                key,
                payload,
                base_strength,
                ratio,
            });
        }
        Ok(accepted)
    }
}
