//! Host model interface.
//!
//! The sculptor never touches tensors. It reads the patches a host has
//! registered against a model, clones the model, and asks the clone to merge
//! selected patches back in at a new ratio. Anything that can do those three
//! things can be sculpted.

use std::collections::BTreeMap;

use crate::Result;

/// Patches registered against a model, keyed by fully-qualified weight name.
///
/// Ordered so that every key sharing a prefix forms one contiguous range.
pub type KeyPatches<P> = BTreeMap<String, P>;

/// Ratio applied to the existing weight when merging a patch.
pub const BASE_STRENGTH: f64 = 1.0;

/// Trait for host models whose weight patches can be re-scaled.
pub trait PatchableModel {
    /// Opaque patch payload owned by the host.
    type Patch: Clone;

    /// Return an independent copy that can be patched without affecting `self`.
    fn clone_model(&self) -> Result<Self>
    where
        Self: Sized;

    /// All patches whose key starts with `namespace`.
    fn key_patches(&self, namespace: &str) -> Result<KeyPatches<Self::Patch>>;

    /// Merge `patches` into this model.
    ///
    /// Each payload contributes `payload * ratio` on top of the existing weight
    /// scaled by `base_strength`. Returns the keys the host accepted.
    fn add_patches(
        &mut self,
        patches: KeyPatches<Self::Patch>,
        base_strength: f64,
        ratio: f64,
    ) -> Result<Vec<String>>;
}

/// Keys of `patches` that start with `prefix`, in key order.
///
/// Equivalent to filtering every key with `starts_with`, but only walks the
/// contiguous range that can match.
pub fn keys_with_prefix<'a, P>(
    patches: &'a KeyPatches<P>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a P)> + 'a {
    patches
        .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
        .take_while(move |(key, _)| key.starts_with(prefix))
}
