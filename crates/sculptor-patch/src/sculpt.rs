//! Sculpt orchestration.
//!
//! This module provides the high-level API for sculpting a model. It resolves
//! the target against an architecture table, generates one gradient per
//! prefix group, and merges every matching patch into a clone of the model at
//! `factor * strength`.
//!
//! Two conditions are recovered locally rather than reported as errors: an
//! unrecognized target option and a target that matches no patch. In both
//! cases the caller gets its own model back untouched, along with a
//! [`Degraded`] reason.

use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use sculptor_core::{gradient, ArchitectureFamily, GradientShape, SculptConfig};

use crate::{
    keys_with_prefix, ArchitectureTable, KeyPatches, PatchError, PatchableModel, Result,
    TargetSelection, BASE_STRENGTH,
};

/// Why a sculpt returned the input model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Degraded {
    /// Target option is not known to the family's table.
    UnrecognizedTarget {
        /// Option as given.
        target: String,
    },
    /// Resolved prefixes matched no patch key.
    NoMatchingPatches {
        /// Option as given.
        target: String,
    },
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedTarget { target } => {
                write!(f, "unknown target block type '{target}'")
            }
            Self::NoMatchingPatches { target } => {
                write!(f, "found 0 patches matching target prefixes for '{target}'")
            }
        }
    }
}

/// One gradient and the prefixes it is laid across.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientGroup {
    /// Region name, or `all`.
    pub region: String,
    /// Prefixes in positional order.
    pub prefixes: Vec<String>,
    /// Factor for each prefix.
    pub factors: Vec<f64>,
}

/// A single merge request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMerge {
    /// Patch key.
    pub key: String,
    /// Prefix that selected the key.
    pub prefix: String,
    /// Gradient factor at the prefix's position.
    pub factor: f64,
    /// Ratio handed to the host: `factor * strength`.
    pub ratio: f64,
}

/// Everything a sculpt will do, computed without touching a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SculptPlan {
    /// Family tag of the table used.
    pub family: String,
    /// Target option as given.
    pub target: String,
    /// Shape used; `None` when the shape name was not recognized and a zero
    /// gradient was substituted.
    pub shape: Option<GradientShape>,
    /// Global strength.
    pub strength: f64,
    /// Gradients generated, one per group.
    pub groups: Vec<GradientGroup>,
    /// Merge requests in application order.
    pub merges: Vec<PlannedMerge>,
}

impl SculptPlan {
    /// Number of patches the plan touches.
    pub fn patch_count(&self) -> usize {
        self.merges.len()
    }
}

/// Result of a sculpt.
#[derive(Debug)]
pub enum SculptOutcome<'a, M> {
    /// Patches were re-scaled into a fresh clone.
    Sculpted {
        /// The patched clone.
        model: M,
        /// What was applied.
        plan: SculptPlan,
        /// Keys the host reported as merged.
        accepted: usize,
    },
    /// Nothing applied; the input model is handed back.
    Unchanged {
        /// The caller's own model.
        model: &'a M,
        /// Why nothing was applied.
        reason: Degraded,
    },
}

impl<'a, M> SculptOutcome<'a, M> {
    /// The model to continue with: the clone, or the original.
    pub fn model(&self) -> &M {
        match self {
            Self::Sculpted { model, .. } => model,
            Self::Unchanged { model, .. } => *model,
        }
    }

    /// Whether a clone was patched.
    pub fn is_sculpted(&self) -> bool {
        matches!(self, Self::Sculpted { .. })
    }

    /// The applied plan, if any.
    pub fn plan(&self) -> Option<&SculptPlan> {
        match self {
            Self::Sculpted { plan, .. } => Some(plan),
            Self::Unchanged { .. } => None,
        }
    }

    /// Number of keys the host accepted, if a clone was patched.
    pub fn accepted(&self) -> Option<usize> {
        match self {
            Self::Sculpted { accepted, .. } => Some(*accepted),
            Self::Unchanged { .. } => None,
        }
    }

    /// The degraded reason, if nothing was applied.
    pub fn degraded(&self) -> Option<&Degraded> {
        match self {
            Self::Sculpted { .. } => None,
            Self::Unchanged { reason, .. } => Some(reason),
        }
    }

    /// Take the patched clone, if there is one.
    pub fn into_sculpted(self) -> Option<M> {
        match self {
            Self::Sculpted { model, .. } => Some(model),
            Self::Unchanged { .. } => None,
        }
    }
}

/// Gradient sculptor for one architecture family.
///
/// Holds no per-call state; one instance can serve any number of models.
#[derive(Debug, Clone)]
pub struct Sculptor {
    table: ArchitectureTable,
    seed: Option<u64>,
}

impl Sculptor {
    /// Create a sculptor over an arbitrary table.
    pub fn new(table: ArchitectureTable) -> Self {
        Self { table, seed: None }
    }

    /// Create a sculptor for a built-in family.
    pub fn for_family(family: ArchitectureFamily) -> Result<Self> {
        Ok(Self::new(ArchitectureTable::for_family(family)?))
    }

    /// Create a sculptor from a validated configuration.
    pub fn from_config(config: &SculptConfig) -> Result<Self> {
        config.validate()?;
        let sculptor = Self::for_family(config.family)?;
        Ok(match config.seed {
            Some(seed) => sculptor.with_seed(seed),
            None => sculptor,
        })
    }

    /// Fix the seed used by random gradients.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The architecture table in use.
    pub fn table(&self) -> &ArchitectureTable {
        &self.table
    }

    /// Target options this sculptor understands.
    pub fn target_options(&self) -> Vec<&str> {
        self.table.target_options()
    }

    /// Sculpt `model` with a known shape.
    pub fn sculpt<'a, M: PatchableModel>(
        &self,
        model: &'a M,
        shape: GradientShape,
        strength: f64,
        target: &str,
    ) -> Result<SculptOutcome<'a, M>> {
        self.sculpt_inner(model, Some(shape), shape.label(), strength, target, self.seed)
    }

    /// Sculpt `model` with a shape given by label or name.
    ///
    /// An unrecognized shape name does not fail: every targeted patch is
    /// merged at ratio zero.
    pub fn sculpt_by_name<'a, M: PatchableModel>(
        &self,
        model: &'a M,
        shape: &str,
        strength: f64,
        target: &str,
    ) -> Result<SculptOutcome<'a, M>> {
        let known = GradientShape::from_name(shape);
        self.sculpt_inner(model, known, shape, strength, target, self.seed)
    }

    /// Sculpt `model` as described by a configuration.
    ///
    /// The configuration is validated and must name this sculptor's family.
    /// Its seed, when set, takes precedence over the sculptor's own.
    pub fn sculpt_config<'a, M: PatchableModel>(
        &self,
        model: &'a M,
        config: &SculptConfig,
    ) -> Result<SculptOutcome<'a, M>> {
        config.validate()?;
        if config.family.tag() != self.table.family() {
            return Err(PatchError::FamilyMismatch {
                table: self.table.family().to_string(),
                config: config.family.tag().to_string(),
            });
        }

        let shape = config.gradient_shape;
        self.sculpt_inner(
            model,
            Some(shape),
            shape.label(),
            config.strength,
            &config.target_blocks,
            config.seed.or(self.seed),
        )
    }

    /// Compute the merge plan for `key_patches` without touching a model.
    pub fn plan<P>(
        &self,
        key_patches: &KeyPatches<P>,
        shape: GradientShape,
        strength: f64,
        target: &str,
    ) -> std::result::Result<SculptPlan, Degraded> {
        let mut rng = gradient::seeded_rng(self.seed);
        self.plan_with_rng(key_patches, Some(shape), shape.label(), strength, target, &mut rng)
    }

    /// [`Sculptor::plan`] with a shape given by label or name.
    pub fn plan_by_name<P>(
        &self,
        key_patches: &KeyPatches<P>,
        shape: &str,
        strength: f64,
        target: &str,
    ) -> std::result::Result<SculptPlan, Degraded> {
        let mut rng = gradient::seeded_rng(self.seed);
        let known = GradientShape::from_name(shape);
        self.plan_with_rng(key_patches, known, shape, strength, target, &mut rng)
    }

    fn sculpt_inner<'a, M: PatchableModel>(
        &self,
        model: &'a M,
        shape: Option<GradientShape>,
        shape_label: &str,
        strength: f64,
        target: &str,
        seed: Option<u64>,
    ) -> Result<SculptOutcome<'a, M>> {
        let key_patches = model.key_patches(self.table.namespace())?;
        debug!(
            "{}: {} patches under '{}'",
            self.table.family(),
            key_patches.len(),
            self.table.namespace()
        );

        let mut rng = gradient::seeded_rng(seed);
        let plan = match self.plan_with_rng(
            &key_patches,
            shape,
            shape_label,
            strength,
            target,
            &mut rng,
        ) {
            Ok(plan) => plan,
            Err(reason) => return Ok(SculptOutcome::Unchanged { model, reason }),
        };

        // Every planned key was drawn from `key_patches`.
        let mut sculpted = model.clone_model()?;
        let mut accepted = 0;
        for merge in &plan.merges {
            let mut single = KeyPatches::new();
            single.insert(merge.key.clone(), key_patches[merge.key.as_str()].clone());
            accepted += sculpted.add_patches(single, BASE_STRENGTH, merge.ratio)?.len();
        }

        if accepted < plan.patch_count() {
            warn!(
                "{}: host accepted {} of {} planned patches",
                self.table.family(),
                accepted,
                plan.patch_count()
            );
        }
        info!(
            "{}: applied gradient patches to {} model components",
            self.table.family(),
            accepted
        );

        Ok(SculptOutcome::Sculpted {
            model: sculpted,
            plan,
            accepted,
        })
    }

    fn plan_with_rng<P, R: Rng + ?Sized>(
        &self,
        key_patches: &KeyPatches<P>,
        shape: Option<GradientShape>,
        shape_label: &str,
        strength: f64,
        target: &str,
        rng: &mut R,
    ) -> std::result::Result<SculptPlan, Degraded> {
        let family = self.table.family();

        let Some(selection) = TargetSelection::parse(target, &self.table) else {
            warn!("{}: unknown target block type '{}'", family, target);
            return Err(Degraded::UnrecognizedTarget {
                target: target.to_string(),
            });
        };

        if shape.is_none() {
            warn!(
                "{}: unknown gradient shape '{}', every factor will be zero",
                family, shape_label
            );
        }

        let groups = selection.groups(&self.table);
        if selection == TargetSelection::Synced {
            info!(
                "{}: applying synced shape '{}' with strength {}",
                family, shape_label, strength
            );
        }

        let mut gradient_groups = Vec::with_capacity(groups.len());
        let mut merges = Vec::new();

        for (region, prefixes) in groups {
            let factors = match shape {
                Some(shape) => gradient::generate(shape, prefixes.len(), rng),
                None => gradient::zeros(prefixes.len()),
            };

            if selection == TargetSelection::Synced {
                info!("{}:   sculpting {} {}", family, factors.len(), region);
            } else {
                info!(
                    "{}: sculpting with shape '{}', strength {}, on {} '{}' blocks",
                    family,
                    shape_label,
                    strength,
                    factors.len(),
                    target
                );
            }

            for (prefix, factor) in prefixes.iter().zip(&factors) {
                let ratio = factor * strength;
                for (key, _) in keys_with_prefix(key_patches, prefix) {
                    merges.push(PlannedMerge {
                        key: key.clone(),
                        prefix: prefix.to_string(),
                        factor: *factor,
                        ratio,
                    });
                }
            }

            gradient_groups.push(GradientGroup {
                region,
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                factors,
            });
        }

        if merges.is_empty() {
            error!(
                "{}: found 0 patches matching target prefixes for '{}', check model compatibility",
                family, target
            );
            return Err(Degraded::NoMatchingPatches {
                target: target.to_string(),
            });
        }

        Ok(SculptPlan {
            family: family.to_string(),
            target: selection.option(&self.table).to_string(),
            shape,
            strength,
            groups: gradient_groups,
            merges,
        })
    }
}
