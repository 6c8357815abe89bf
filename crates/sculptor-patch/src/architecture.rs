//! Architecture tables: which weight-key prefixes make up each region.
//!
//! A table lists, for one architecture family, the named regions of the
//! network and the key prefix of every block inside them, ordered by block
//! index. Gradients are applied positionally, so factor `i` of a gradient
//! always lands on prefix `i` of the region it was generated for.

use sculptor_core::{ArchitectureFamily, TARGET_ALL};

use crate::{PatchError, Result};

/// Namespace under which hosts store the diffusion network's weights.
pub const DIFFUSION_NAMESPACE: &str = "diffusion_model.";

/// A named structural subdivision of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Region name, e.g. `double_blocks`.
    pub name: String,
    /// Key prefixes of the region's blocks, in structural order.
    pub prefixes: Vec<String>,
}

impl Region {
    /// Number of blocks in the region.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether the region has no blocks.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// Two regions that share a gradient shape but are scaled independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedPair {
    /// Option label presented to users.
    pub label: String,
    /// First region name.
    pub first: String,
    /// Second region name.
    pub second: String,
}

/// Region layout of one architecture family.
#[derive(Debug, Clone)]
pub struct ArchitectureTable {
    family: String,
    namespace: String,
    regions: Vec<Region>,
    all_order: Vec<String>,
    synced: SyncedPair,
}

impl ArchitectureTable {
    /// Start building a table for a family.
    pub fn builder(family: impl Into<String>) -> ArchitectureTableBuilder {
        ArchitectureTableBuilder::new(family)
    }

    /// Table for one of the built-in families.
    pub fn for_family(family: ArchitectureFamily) -> Result<Self> {
        match family {
            ArchitectureFamily::Flux => flux(),
            ArchitectureFamily::Sdxl => sdxl(),
            ArchitectureFamily::Sd3 => sd3(),
        }
    }

    /// Family tag used in diagnostics.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Namespace every prefix is rooted under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Regions in declaration order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look up a region by name.
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Look up a region, failing if absent.
    pub fn require_region(&self, name: &str) -> Result<&Region> {
        self.region(name).ok_or_else(|| PatchError::UnknownRegion {
            family: self.family.clone(),
            region: name.to_string(),
        })
    }

    /// The synced dual-region option.
    pub fn synced(&self) -> &SyncedPair {
        &self.synced
    }

    /// Region names in the canonical order used by the `all` target.
    pub fn all_order(&self) -> &[String] {
        &self.all_order
    }

    /// Every prefix of every region, concatenated in canonical order.
    pub fn all_prefixes(&self) -> Vec<&str> {
        self.all_order
            .iter()
            .filter_map(|name| self.region(name))
            .flat_map(|r| r.prefixes.iter().map(String::as_str))
            .collect()
    }

    /// Target options as presented to a host: `all`, each region, then the
    /// synced label.
    pub fn target_options(&self) -> Vec<&str> {
        std::iter::once(TARGET_ALL)
            .chain(self.regions.iter().map(|r| r.name.as_str()))
            .chain(std::iter::once(self.synced.label.as_str()))
            .collect()
    }
}

/// Builder for [`ArchitectureTable`].
#[derive(Debug, Clone)]
pub struct ArchitectureTableBuilder {
    family: String,
    namespace: String,
    regions: Vec<Region>,
    all_order: Option<Vec<String>>,
    synced: Option<SyncedPair>,
}

impl ArchitectureTableBuilder {
    fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            namespace: DIFFUSION_NAMESPACE.to_string(),
            regions: Vec::new(),
            all_order: None,
            synced: None,
        }
    }

    /// Override the weight namespace (default `diffusion_model.`).
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Add a region of `count` numbered blocks: `<ns><name>.<i>.`
    pub fn indexed(mut self, name: &str, count: usize) -> Self {
        let prefixes = (0..count)
            .map(|i| format!("{}{}.{}.", self.namespace, name, i))
            .collect();
        self.regions.push(Region {
            name: name.to_string(),
            prefixes,
        });
        self
    }

    /// Add a region made of a single block: `<ns><name>.`
    pub fn single(mut self, name: &str) -> Self {
        let prefixes = vec![format!("{}{}.", self.namespace, name)];
        self.regions.push(Region {
            name: name.to_string(),
            prefixes,
        });
        self
    }

    /// Add a region made of named sub-modules: `<ns><part>.` for each part.
    pub fn grouped(mut self, name: &str, parts: &[&str]) -> Self {
        let prefixes = parts
            .iter()
            .map(|p| format!("{}{}.", self.namespace, p))
            .collect();
        self.regions.push(Region {
            name: name.to_string(),
            prefixes,
        });
        self
    }

    /// Set the canonical order for the `all` target.
    ///
    /// Defaults to declaration order.
    pub fn all_order(mut self, order: &[&str]) -> Self {
        self.all_order = Some(order.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Set the synced dual-region option.
    pub fn synced(mut self, label: &str, first: &str, second: &str) -> Self {
        self.synced = Some(SyncedPair {
            label: label.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        });
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<ArchitectureTable> {
        let invalid = |reason: String| PatchError::InvalidTable {
            family: self.family.clone(),
            reason,
        };

        if self.regions.is_empty() {
            return Err(invalid("no regions".to_string()));
        }

        for (i, region) in self.regions.iter().enumerate() {
            if region.is_empty() {
                return Err(invalid(format!("region '{}' has no blocks", region.name)));
            }
            if region.name == TARGET_ALL {
                return Err(invalid(format!("region name '{}' is reserved", TARGET_ALL)));
            }
            if self.regions[..i].iter().any(|r| r.name == region.name) {
                return Err(invalid(format!("duplicate region '{}'", region.name)));
            }
        }

        let known = |name: &str| self.regions.iter().any(|r| r.name == name);

        let all_order = self
            .all_order
            .clone()
            .unwrap_or_else(|| self.regions.iter().map(|r| r.name.clone()).collect());
        if let Some(missing) = all_order.iter().find(|name| !known(name.as_str())) {
            return Err(invalid(format!("'all' order names unknown region '{missing}'")));
        }
        if let Some(absent) = self.regions.iter().find(|r| !all_order.contains(&r.name)) {
            return Err(invalid(format!("'all' order omits region '{}'", absent.name)));
        }

        let synced = self
            .synced
            .clone()
            .ok_or_else(|| invalid("no synced pair".to_string()))?;
        for name in [&synced.first, &synced.second] {
            if !known(name.as_str()) {
                return Err(invalid(format!("synced pair names unknown region '{name}'")));
            }
        }
        if synced.first == synced.second {
            return Err(invalid("synced pair repeats one region".to_string()));
        }
        if synced.label == TARGET_ALL || known(synced.label.as_str()) {
            return Err(invalid(format!(
                "synced label '{}' collides with another option",
                synced.label
            )));
        }

        Ok(ArchitectureTable {
            family: self.family,
            namespace: self.namespace,
            regions: self.regions,
            all_order,
            synced,
        })
    }
}

/// Number of double-stream blocks in Flux.
pub const FLUX_DOUBLE_BLOCKS: usize = 19;
/// Number of single-stream blocks in Flux.
pub const FLUX_SINGLE_BLOCKS: usize = 38;
/// Number of input (and output) blocks in the SDXL UNet.
pub const SDXL_UNET_BLOCKS: usize = 12;
/// Number of joint blocks in SD3.
pub const SD3_JOINT_BLOCKS: usize = 24;

fn flux() -> Result<ArchitectureTable> {
    ArchitectureTable::builder(ArchitectureFamily::Flux.tag())
        .grouped(
            "in_layers",
            &["img_in", "time_in", "guidance_in", "vector_in", "txt_in"],
        )
        .indexed("double_blocks", FLUX_DOUBLE_BLOCKS)
        .indexed("single_blocks", FLUX_SINGLE_BLOCKS)
        .all_order(&["in_layers", "double_blocks", "single_blocks"])
        .synced("Double & Single (Synced Shape)", "double_blocks", "single_blocks")
        .build()
}

fn sdxl() -> Result<ArchitectureTable> {
    ArchitectureTable::builder(ArchitectureFamily::Sdxl.tag())
        .indexed("input_blocks", SDXL_UNET_BLOCKS)
        .single("middle_block")
        .indexed("output_blocks", SDXL_UNET_BLOCKS)
        .single("time_embed")
        .single("label_emb")
        .all_order(&[
            "time_embed",
            "label_emb",
            "input_blocks",
            "middle_block",
            "output_blocks",
        ])
        .synced("Input & Output (Synced Shape)", "input_blocks", "output_blocks")
        .build()
}

fn sd3() -> Result<ArchitectureTable> {
    ArchitectureTable::builder(ArchitectureFamily::Sd3.tag())
        .indexed("joint_blocks", SD3_JOINT_BLOCKS)
        .single("x_embedder")
        .single("y_embedder")
        .single("t_embedder")
        .single("pos_embed")
        .single("final_layer")
        .all_order(&[
            "x_embedder",
            "y_embedder",
            "t_embedder",
            "pos_embed",
            "joint_blocks",
            "final_layer",
        ])
        .synced("Joint & Final (Synced Shape)", "joint_blocks", "final_layer")
        .build()
}
