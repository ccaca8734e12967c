//! TOML configuration deserialisation for component jobs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use dispersa_geometry::component::{ComponentSpec, ElementSpec, ShapeSpec};
use dispersa_geometry::transform::Transform;
use dispersa_geometry::units::LengthUnit;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub component: ComponentConfig,
    pub element: ElementConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Envelope parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub material: String,
    /// Shape type, e.g. "G4Sphere", "G4Tubs", "G4Ellipsoid", "G4Box".
    #[serde(rename = "type")]
    pub shape_type: String,
    /// Unit of every dimension in this table. Default: "mm".
    #[serde(default = "default_dimension_unit")]
    pub unit: LengthUnit,
    pub radius: Option<f64>,
    pub half_length: Option<f64>,
    pub half_x: Option<f64>,
    pub half_y: Option<f64>,
    pub half_z: Option<f64>,
    #[serde(default)]
    pub translation: [f64; 3],
    /// Rotation about x, y, z in degrees.
    #[serde(default)]
    pub rotation: [f64; 3],
}

/// Sub-element parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct ElementConfig {
    pub radius: f64,
    #[serde(default = "default_dimension_unit")]
    pub unit: LengthUnit,
    pub material: String,
    /// Position list, relative to the configuration file.
    pub positions_file: PathBuf,
    /// Unit of the values in the position list. Default: "nm".
    #[serde(default = "default_positions_unit")]
    pub positions_unit: LengthUnit,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the component descriptor as JSON (default: true).
    #[serde(default = "default_true")]
    pub save_json: bool,
    /// Whether to save per-copy placements as CSV (default: false).
    #[serde(default)]
    pub save_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: true,
            save_csv: false,
        }
    }
}

fn default_dimension_unit() -> LengthUnit {
    LengthUnit::Millimetre
}
fn default_positions_unit() -> LengthUnit {
    LengthUnit::Nanometre
}
fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Convert to a component spec in internal units.
    pub fn component_spec(&self) -> ComponentSpec {
        let c = &self.component;
        let scale = c.unit.in_internal();
        let scaled = |v: Option<f64>| v.map(|v| v * scale);

        ComponentSpec {
            name: c.name.clone(),
            parent: c.parent.clone(),
            material: c.material.clone(),
            shape: ShapeSpec {
                kind: c.shape_type.clone(),
                radius: scaled(c.radius),
                half_length: scaled(c.half_length),
                half_x: scaled(c.half_x),
                half_y: scaled(c.half_y),
                half_z: scaled(c.half_z),
            },
            transform: Transform::from_rotation_deg(c.rotation, c.translation.map(|v| v * scale)),
            element: ElementSpec {
                radius: self.element.radius * self.element.unit.in_internal(),
                material: self.element.material.clone(),
            },
        }
    }
}

/// Load and parse a TOML job configuration file.
///
/// A relative `positions_file` is resolved against the directory holding
/// the configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read configuration '{}'", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid configuration '{}'", path.display()))?;

    if config.element.positions_file.is_relative() {
        if let Some(dir) = path.parent() {
            config.element.positions_file = dir.join(&config.element.positions_file);
        }
    }
    Ok(config)
}
