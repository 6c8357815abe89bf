//! Positional gradient scaling of diffusion-model weight patches.
//!
//! Rather than applying fine-tune patches at one uniform strength, a sculpt
//! scales each patch by its structural position in the network: early blocks
//! and late blocks can be emphasised or muted following a curve.
//!
//! # Pieces
//!
//! - [`ArchitectureTable`]: regions of a family and the key prefix of each block
//! - [`TargetSelection`]: `all`, one region, or the synced dual-region option
//! - [`Sculptor`]: resolves a target, generates gradients, merges patches
//! - [`PatchableModel`]: what a host model must provide
//! - [`RecordingModel`]: in-memory host for dry runs
//!
//! # Example
//!
//! ```
//! use sculptor_core::{ArchitectureFamily, GradientShape};
//! use sculptor_patch::{RecordingModel, Sculptor};
//!
//! let model = RecordingModel::from_keys([
//!     "diffusion_model.double_blocks.0.img_attn.qkv.weight",
//!     "diffusion_model.double_blocks.18.img_attn.qkv.weight",
//! ]);
//!
//! let sculptor = Sculptor::for_family(ArchitectureFamily::Flux)?;
//! let outcome = sculptor.sculpt(&model, GradientShape::LinearAscending, 0.5, "double_blocks")?;
//!
//! let sculpted = outcome.model();
//! assert_eq!(sculpted.total_ratio("diffusion_model.double_blocks.18.img_attn.qkv.weight"), 0.5);
//! # Ok::<(), sculptor_patch::PatchError>(())
//! ```

#![warn(missing_docs)]

mod architecture;
mod error;
mod host;
mod recording;
mod sculpt;
mod target;

pub use architecture::*;
pub use error::*;
pub use host::*;
pub use recording::*;
pub use sculpt::*;
pub use target::*;
