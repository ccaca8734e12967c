//! Component runner: ties together configuration, position loading, and
//! construction.

use std::path::Path;

use anyhow::{Context, Result};

use dispersa_geometry::component::{construct, ComponentDescriptor};
use dispersa_geometry::parsers::positions::load_positions;
use dispersa_geometry::parsers::{LoadDiagnostic, PositionLoad};

use crate::config::JobConfig;

/// Results from a build.
pub struct BuildOutput {
    pub component: ComponentDescriptor,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Build the component described by a parsed job configuration.
///
/// An unreadable position file is not fatal: the component is built
/// without sub-elements and the diagnostic is returned alongside.
pub fn build_component(job: &JobConfig) -> Result<BuildOutput> {
    let spec = job.component_spec();
    let positions = &job.element.positions_file;

    let PositionLoad { records, diagnostics } =
        load_positions(positions, job.element.positions_unit.in_internal());
    println!(
        "  Positions '{}': {} records ({} lines skipped, unit={})",
        positions.display(),
        records.len(),
        diagnostics
            .iter()
            .filter(|d| !d.is_resource_unavailable())
            .count(),
        job.element.positions_unit
    );
    if diagnostics.iter().any(LoadDiagnostic::is_resource_unavailable) {
        eprintln!("Warning: no sub-elements will be placed in '{}'", spec.name);
    }

    let component = construct(&spec, records)
        .with_context(|| format!("Component '{}' was not constructed", spec.name))?;

    println!(
        "  Component '{}': {} envelope, material={}",
        component.name,
        component.envelope.kind(),
        component.material
    );
    match component.sub_elements.name() {
        Some(name) => println!(
            "  Sub-elements: {} x '{}' (material={}, filling fraction={:.3e})",
            component.instance_count(),
            name,
            component.element_material,
            component.filling_fraction()
        ),
        None => println!("  Sub-elements: none"),
    }

    let protruding = component.protruding_copies();
    if !protruding.is_empty() {
        log::warn!(
            "{} sub-elements extend outside the envelope of '{}' (first copy: {})",
            protruding.len(),
            component.name,
            protruding[0]
        );
    }

    Ok(BuildOutput { component, diagnostics })
}

/// Write the component descriptor as pretty-printed JSON.
pub fn write_component_json(component: &ComponentDescriptor, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(component)
        .context("Failed to serialise component descriptor")?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    println!("Descriptor written to {}", path.display());
    Ok(())
}

/// Write every sub-element's world position and radius as CSV, with a
/// metadata header.
pub fn write_placements_csv(component: &ComponentDescriptor, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?,
    );

    writeln!(file, "# Dispersa — Sub-element Placements")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# component '{}': {} envelope, material={}",
        component.name,
        component.envelope.kind(),
        component.material
    )?;
    let (lo, hi) = component.envelope.bounding_box();
    writeln!(
        file,
        "# envelope bounds (local): [{:.6e}, {:.6e}, {:.6e}] .. [{:.6e}, {:.6e}, {:.6e}]",
        lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]
    )?;
    writeln!(file, "# element material={}", component.element_material)?;
    writeln!(file, "# lengths in mm")?;
    writeln!(file, "copy,x_mm,y_mm,z_mm,radius_mm")?;

    for copy in 0..component.instance_count() {
        if let (Some([x, y, z]), Some(r)) = (
            component.world_centre(copy),
            component.sub_elements.radius(copy),
        ) {
            writeln!(file, "{},{:.9e},{:.9e},{:.9e},{:.9e}", copy, x, y, z, r)?;
        }
    }
    file.flush()?;
    println!("Placements written to {}", path.display());
    Ok(())
}

/// Summary statistics of a loaded position list.
pub struct PositionSummary {
    pub count: usize,
    pub skipped: usize,
    /// Bounding box of the sub-element spheres: (min_corner, max_corner).
    pub extent: Option<([f64; 3], [f64; 3])>,
    pub radius_range: Option<(f64, f64)>,
}

pub fn summarise_positions(load: &PositionLoad) -> PositionSummary {
    let mut extent: Option<([f64; 3], [f64; 3])> = None;
    let mut radius_range: Option<(f64, f64)> = None;

    for record in &load.records {
        let (lo, hi) = extent.get_or_insert(([f64::INFINITY; 3], [f64::NEG_INFINITY; 3]));
        for axis in 0..3 {
            lo[axis] = lo[axis].min(record.position[axis] - record.radius);
            hi[axis] = hi[axis].max(record.position[axis] + record.radius);
        }
        let (rmin, rmax) = radius_range.get_or_insert((record.radius, record.radius));
        *rmin = rmin.min(record.radius);
        *rmax = rmax.max(record.radius);
    }

    PositionSummary {
        count: load.records.len(),
        skipped: load.skipped_lines(),
        extent,
        radius_range,
    }
}
