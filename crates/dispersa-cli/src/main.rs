//! Dispersa command-line interface.
//!
//! Build distributed components from TOML configuration files:
//! ```sh
//! dispersa-cli build job.toml
//! dispersa-cli validate job.toml
//! dispersa-cli positions nanoparticles.txt --unit nm
//! dispersa-cli shapes
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dispersa_geometry::component::SUPPORTED_SHAPES;
use dispersa_geometry::parsers::positions::load_positions;
use dispersa_geometry::units::LengthUnit;

#[derive(Parser)]
#[command(name = "dispersa-cli")]
#[command(about = "Dispersa: envelopes filled with distributed spherical sub-elements")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a component from a TOML configuration file.
    Build {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and its position list without writing output.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Load a position file and report what it contains.
    Positions {
        /// Path to the position file.
        file: PathBuf,
        /// Unit of the values in the file.
        #[arg(short, long, default_value = "nm")]
        unit: LengthUnit,
    },
    /// List the supported envelope shapes.
    Shapes,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, output } => {
            println!("Dispersa Component Builder");
            println!("==========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::build_component(&job)?;

            // Determine output directory
            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_json {
                runner::write_component_json(&result.component, &out_dir.join("component.json"))?;
            }
            if job.output.save_csv {
                runner::write_placements_csv(&result.component, &out_dir.join("placements.csv"))?;
            }

            println!("Build complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let result = runner::build_component(&job)?;
            if result.diagnostics.is_empty() {
                println!("Configuration is valid: {}", config.display());
            } else {
                println!(
                    "Configuration is valid with {} position diagnostics: {}",
                    result.diagnostics.len(),
                    config.display()
                );
                for diagnostic in &result.diagnostics {
                    println!("  {}", diagnostic);
                }
            }
            Ok(())
        }
        Commands::Positions { file, unit } => {
            let load = load_positions(&file, unit.in_internal());
            let summary = runner::summarise_positions(&load);
            println!("Position file: {}", file.display());
            println!("  Records:       {}", summary.count);
            println!("  Skipped lines: {}", summary.skipped);
            if let Some((lo, hi)) = summary.extent {
                println!(
                    "  Extent (mm):   [{:.4e}, {:.4e}, {:.4e}] .. [{:.4e}, {:.4e}, {:.4e}]",
                    lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]
                );
            }
            if let Some((rmin, rmax)) = summary.radius_range {
                println!("  Radius (mm):   {:.4e} .. {:.4e}", rmin, rmax);
            }
            let mode = match summary.count {
                0 => "none",
                1 => "single placement",
                _ => "parameterised placement",
            };
            println!("  Placement:     {}", mode);
            if load.source_unavailable() {
                anyhow::bail!("Position file '{}' could not be read", file.display());
            }
            Ok(())
        }
        Commands::Shapes => {
            println!("Supported envelope shapes:");
            println!();
            for (name, alias, dimensions) in SUPPORTED_SHAPES {
                println!("  {:<12} ({:<9}) — {}", name, alias, dimensions.join(", "));
            }
            println!();
            println!("  Sub-elements are always spheres.");
            Ok(())
        }
    }
}
