//! Sculptor CLI - positional gradient scaling of diffusion-model patches.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sculptor_core::{
    gradient, validate_strength, ArchitectureFamily, GradientShape, SculptConfig,
    DEFAULT_STRENGTH, TARGET_ALL,
};
use sculptor_patch::{RecordingModel, SculptOutcome, Sculptor};

#[derive(Parser)]
#[command(name = "sculptor")]
#[command(author, version, about = "Scale diffusion-model patches along a gradient", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available gradient shapes
    Shapes,

    /// List target options for an architecture family
    Targets {
        /// Architecture family (flux, sdxl, sd3)
        #[arg(short, long)]
        family: ArchitectureFamily,
    },

    /// Print the factors a shape produces over a number of blocks
    Gradient {
        /// Gradient shape (label or name, e.g. "spike_gaussian")
        #[arg(short, long)]
        shape: String,

        /// Number of blocks
        #[arg(short = 'n', long)]
        steps: usize,

        /// Seed for random shapes
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Dry-run a sculpt against a list of patch keys
    Plan {
        /// Sculpt configuration file (YAML); flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// File of patch keys: one per line, or a JSON array
        #[arg(short, long)]
        keys: PathBuf,

        /// Architecture family (flux, sdxl, sd3)
        #[arg(short, long)]
        family: Option<ArchitectureFamily>,

        /// Gradient shape (label or name)
        #[arg(short, long)]
        shape: Option<String>,

        /// Global strength
        #[arg(long, allow_hyphen_values = true)]
        strength: Option<f64>,

        /// Target option ("all", a region, or the synced label)
        #[arg(short, long)]
        target: Option<String>,

        /// Seed for random shapes
        #[arg(long)]
        seed: Option<u64>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Values given on the command line for a dry run.
#[derive(Debug, Default)]
struct PlanFlags {
    family: Option<ArchitectureFamily>,
    shape: Option<String>,
    strength: Option<f64>,
    target: Option<String>,
    seed: Option<u64>,
}

/// Settings for a dry run after merging the config file with flags.
#[derive(Debug, PartialEq)]
struct PlanSettings {
    family: ArchitectureFamily,
    shape: String,
    strength: f64,
    target: String,
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Shapes => {
            for shape in GradientShape::ALL {
                println!("{:<22} {}", shape.name(), shape.label());
            }
        }

        Commands::Targets { family } => {
            let sculptor = Sculptor::for_family(family)?;
            let table = sculptor.table();
            println!("{}", family.display_name());
            println!("{}", "=".repeat(family.display_name().len()));
            for option in table.target_options() {
                let blocks = if option == TARGET_ALL {
                    table.all_prefixes().len()
                } else if option == table.synced().label {
                    let pair = table.synced();
                    table.require_region(&pair.first)?.len()
                        + table.require_region(&pair.second)?.len()
                } else {
                    table.require_region(option)?.len()
                };
                println!("  {:<32} {:>3} blocks", option, blocks);
            }
        }

        Commands::Gradient { shape, steps, seed } => {
            let mut rng = gradient::seeded_rng(seed);
            let factors = gradient::generate_by_name(&shape, steps, &mut rng);
            for (i, factor) in factors.iter().enumerate() {
                println!("{:>4}  {:.6}", i, factor);
            }
        }

        Commands::Plan {
            config,
            keys,
            family,
            shape,
            strength,
            target,
            seed,
            json,
        } => {
            let base = config.as_deref().map(load_config).transpose()?;
            let flags = PlanFlags {
                family,
                shape,
                strength,
                target,
                seed,
            };
            let settings = plan_settings(base, flags)?;

            let keys = read_keys(&keys)?;
            print!("{}", render_plan(&settings, keys, json)?);
        }
    }

    Ok(())
}

/// Load and validate a sculpt configuration file.
fn load_config(path: &Path) -> anyhow::Result<SculptConfig> {
    let config = SculptConfig::from_yaml_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Merge command-line flags over an optional config; flags win.
fn plan_settings(base: Option<SculptConfig>, flags: PlanFlags) -> anyhow::Result<PlanSettings> {
    let settings = PlanSettings {
        family: flags
            .family
            .or(base.as_ref().map(|c| c.family))
            .context("--family is required without --config")?,
        shape: flags
            .shape
            .or_else(|| base.as_ref().map(|c| c.gradient_shape.name().to_string()))
            .unwrap_or_else(|| GradientShape::default().name().to_string()),
        strength: flags
            .strength
            .or(base.as_ref().map(|c| c.strength))
            .unwrap_or(DEFAULT_STRENGTH),
        target: flags
            .target
            .or_else(|| base.as_ref().map(|c| c.target_blocks.clone()))
            .unwrap_or_else(|| TARGET_ALL.to_string()),
        seed: flags.seed.or(base.as_ref().and_then(|c| c.seed)),
    };

    validate_strength(settings.strength)?;
    anyhow::ensure!(!settings.target.trim().is_empty(), "target must not be empty");

    Ok(settings)
}

/// Sculpt an in-memory model built from `keys` and render the result.
fn render_plan(settings: &PlanSettings, keys: Vec<String>, json: bool) -> anyhow::Result<String> {
    tracing::info!("Loaded {} patch keys", keys.len());

    let model = RecordingModel::from_keys(keys);
    let sculptor = match settings.seed {
        Some(seed) => Sculptor::for_family(settings.family)?.with_seed(seed),
        None => Sculptor::for_family(settings.family)?,
    };

    let outcome = sculptor.sculpt_by_name(
        &model,
        &settings.shape,
        settings.strength,
        &settings.target,
    )?;

    let mut out = String::new();
    match outcome {
        SculptOutcome::Sculpted { plan, .. } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&plan)?)?;
                return Ok(out);
            }

            let shape = plan.shape.map_or_else(
                || format!("{} (unknown, zero gradient)", settings.shape),
                |s| s.label().to_string(),
            );
            writeln!(
                out,
                "{} | {} | strength {}",
                sculptor.table().family(),
                shape,
                plan.strength
            )?;
            writeln!(out)?;
            for group in &plan.groups {
                writeln!(out, "[{}]", group.region)?;
                for (prefix, factor) in group.prefixes.iter().zip(&group.factors) {
                    writeln!(out, "  {:<48} {:>9.6}", prefix, factor * plan.strength)?;
                }
            }
            writeln!(out)?;
            writeln!(out, "{} patches would be re-scaled", plan.patch_count())?;
        }
        SculptOutcome::Unchanged { reason, .. } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&reason)?)?;
            } else {
                writeln!(out, "No changes: {}", reason)?;
            }
        }
    }

    Ok(out)
}

/// Read patch keys from a newline-separated list or a JSON array.
fn read_keys(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading keys from {}", path.display()))?;

    if content.trim_start().starts_with('[') {
        let keys: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("parsing JSON key list {}", path.display()))?;
        return Ok(keys);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculptor_core::SculptBuilder;
    use std::io::Write;

    #[test]
    fn test_read_keys_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# flux dump").unwrap();
        writeln!(file, "diffusion_model.img_in.weight").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  diffusion_model.double_blocks.0.img_attn.qkv.weight  ").unwrap();

        let keys = read_keys(file.path()).unwrap();
        assert_eq!(
            keys,
            vec![
                "diffusion_model.img_in.weight",
                "diffusion_model.double_blocks.0.img_attn.qkv.weight",
            ]
        );
    }

    #[test]
    fn test_read_keys_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["diffusion_model.joint_blocks.0.x_block.attn.qkv.weight"]"#).unwrap();

        let keys = read_keys(file.path()).unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_cli_parses_negative_strength() {
        let cli = Cli::try_parse_from([
            "sculptor", "plan", "--keys", "keys.txt", "--family", "sdxl", "--strength", "-0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Plan { family, strength, .. } => {
                assert_eq!(family, Some(ArchitectureFamily::Sdxl));
                assert_eq!(strength, Some(-0.5));
            }
            _ => panic!("expected plan"),
        }
    }
    fn flux_keys() -> Vec<String> {
        (0..19)
            .map(|i| format!("diffusion_model.double_blocks.{i}.img_attn.qkv.weight"))
            .collect()
    }

    fn flux_settings(target: &str) -> PlanSettings {
        PlanSettings {
            family: ArchitectureFamily::Flux,
            shape: "linear_ascending".to_string(),
            strength: 0.5,
            target: target.to_string(),
            seed: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let base = SculptBuilder::new(ArchitectureFamily::Sdxl)
            .shape(GradientShape::SpikeGaussian)
            .strength(1.5)
            .target("output_blocks")
            .seed(3)
            .build()
            .unwrap();

        let flags = PlanFlags {
            strength: Some(-0.25),
            target: Some("input_blocks".to_string()),
            ..Default::default()
        };
        let settings = plan_settings(Some(base), flags).unwrap();

        assert_eq!(
            settings,
            PlanSettings {
                family: ArchitectureFamily::Sdxl,
                shape: "spike_gaussian".to_string(),
                strength: -0.25,
                target: "input_blocks".to_string(),
                seed: Some(3),
            }
        );
    }

    #[test]
    fn test_settings_defaults_without_config() {
        let flags = PlanFlags {
            family: Some(ArchitectureFamily::Sd3),
            ..Default::default()
        };
        let settings = plan_settings(None, flags).unwrap();
        assert_eq!(settings.strength, DEFAULT_STRENGTH);
        assert_eq!(settings.target, TARGET_ALL);
        assert_eq!(settings.shape, "linear_ascending");

        assert!(plan_settings(None, PlanFlags::default()).is_err());
    }

    #[test]
    fn test_out_of_range_strength_flag_rejected() {
        let flags = PlanFlags {
            family: Some(ArchitectureFamily::Flux),
            strength: Some(9.5),
            ..Default::default()
        };
        assert!(plan_settings(None, flags).is_err());

        let flags = PlanFlags {
            family: Some(ArchitectureFamily::Flux),
            strength: Some(f64::NAN),
            ..Default::default()
        };
        assert!(plan_settings(None, flags).is_err());
    }

    #[test]
    fn test_out_of_range_config_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "family: flux").unwrap();
        writeln!(file, "strength: 9.5").unwrap();
        writeln!(file, "target_blocks: double_blocks").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_render_table() {
        let out = render_plan(&flux_settings("double_blocks"), flux_keys(), false).unwrap();
        assert!(out.starts_with("Flux | Linear (Ascending) | strength 0.5"));
        assert!(out.contains("[double_blocks]"));
        assert!(out.contains("diffusion_model.double_blocks.18."));
        assert!(out.contains("19 patches would be re-scaled"));
    }

    #[test]
    fn test_render_json_plan() {
        let out = render_plan(&flux_settings("double_blocks"), flux_keys(), true).unwrap();
        let plan: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(plan["target"], "double_blocks");
        assert_eq!(plan["merges"].as_array().unwrap().len(), 19);
        assert_eq!(plan["merges"][18]["ratio"], 0.5);
    }

    #[test]
    fn test_render_unchanged() {
        let out = render_plan(&flux_settings("middle_block"), flux_keys(), false).unwrap();
        assert_eq!(out, "No changes: unknown target block type 'middle_block'\n");

        let out = render_plan(&flux_settings("single_blocks"), flux_keys(), true).unwrap();
        let reason: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reason["reason"], "no_matching_patches");
        assert_eq!(reason["target"], "single_blocks");
    }
}

