//! Distributed component construction.
//!
//! A distributed component is an envelope solid with spherical
//! sub-elements scattered through it. [`construct`] turns an explicit
//! [`ComponentSpec`] plus an already-loaded position list into a
//! [`ComponentDescriptor`]; nothing here touches files or global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parsers::PositionList;
use crate::placement::{plan_placement, SubElementPlacement};
use crate::primitives::{Cuboid, Ellipsoid, Orb, Solid, Tubs};
use crate::transform::Transform;

/// Errors that prevent a component from being built at all.
#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("Invalid component shape '{0}'. Valid shapes: G4Sphere, G4Tubs, G4Ellipsoid, G4Box")]
    UnsupportedShape(String),

    #[error("Shape '{shape}' requires '{parameter}'")]
    MissingDimension {
        shape: String,
        parameter: &'static str,
    },

    #[error("'{parameter}' must be positive and finite, got {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },
}

/// Supported envelope shapes: (type name, alias, required dimensions).
pub const SUPPORTED_SHAPES: [(&str, &str, &[&str]); 4] = [
    ("G4Sphere", "sphere", &["radius"]),
    ("G4Tubs", "cylinder", &["radius", "half_length"]),
    ("G4Ellipsoid", "ellipsoid", &["half_x", "half_y", "half_z"]),
    ("G4Box", "box", &["half_x", "half_y", "half_z"]),
];

/// Envelope shape as configured. Only the dimensions the shape type needs
/// are read; the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub kind: String,
    pub radius: Option<f64>,
    pub half_length: Option<f64>,
    pub half_x: Option<f64>,
    pub half_y: Option<f64>,
    pub half_z: Option<f64>,
}

/// The repeated spherical sub-element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Nominal radius of the sub-element solid.
    pub radius: f64,
    pub material: String,
}

/// Everything needed to build one distributed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub parent: Option<String>,
    pub material: String,
    pub shape: ShapeSpec,
    /// Placement of the envelope in its parent.
    pub transform: Transform,
    pub element: ElementSpec,
}

impl ShapeSpec {
    /// Build the envelope solid described by this spec.
    pub fn to_solid(&self) -> Result<Solid, ConstructionError> {
        match self.kind.as_str() {
            "G4Sphere" | "sphere" => Ok(Solid::Orb(Orb {
                radius: self.require("radius", self.radius)?,
            })),
            "G4Tubs" | "cylinder" => Ok(Solid::Tubs(Tubs {
                radius: self.require("radius", self.radius)?,
                half_length: self.require("half_length", self.half_length)?,
            })),
            "G4Ellipsoid" | "ellipsoid" => Ok(Solid::Ellipsoid(Ellipsoid {
                semi_axes: self.half_extents()?,
            })),
            "G4Box" | "box" => Ok(Solid::Box(Cuboid {
                half_extents: self.half_extents()?,
            })),
            other => Err(ConstructionError::UnsupportedShape(other.to_string())),
        }
    }

    fn half_extents(&self) -> Result<[f64; 3], ConstructionError> {
        Ok([
            self.require("half_x", self.half_x)?,
            self.require("half_y", self.half_y)?,
            self.require("half_z", self.half_z)?,
        ])
    }

    fn require(&self, parameter: &'static str, value: Option<f64>) -> Result<f64, ConstructionError> {
        let value = value.ok_or_else(|| ConstructionError::MissingDimension {
            shape: self.kind.clone(),
            parameter,
        })?;
        check_dimension(parameter, value)
    }
}

fn check_dimension(parameter: &'static str, value: f64) -> Result<f64, ConstructionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConstructionError::InvalidDimension { parameter, value })
    }
}

/// A built component: envelope plus sub-element placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    pub parent: Option<String>,
    pub material: String,
    pub envelope: Solid,
    pub transform: Transform,
    pub element_material: String,
    /// Nominal sub-element radius; each copy carries its own radius too.
    pub element_radius: f64,
    pub sub_elements: SubElementPlacement,
}

impl ComponentDescriptor {
    pub fn instance_count(&self) -> usize {
        self.sub_elements.instance_count()
    }

    /// Placement of sub-element `copy` in the parent's frame.
    pub fn world_transform(&self, copy: usize) -> Option<Transform> {
        self.sub_elements
            .transform(copy)
            .map(|local| local.then(&self.transform))
    }

    /// Centre of sub-element `copy` in the parent's frame.
    pub fn world_centre(&self, copy: usize) -> Option<[f64; 3]> {
        self.world_transform(copy).map(|t| t.apply(&[0.0, 0.0, 0.0]))
    }

    /// Copy numbers whose sphere is not wholly inside the envelope.
    pub fn protruding_copies(&self) -> Vec<usize> {
        (0..self.instance_count())
            .filter(|&copy| {
                match (self.sub_elements.transform(copy), self.sub_elements.radius(copy)) {
                    (Some(t), Some(r)) => !self.envelope.encloses_sphere(&t.offset(), r),
                    _ => false,
                }
            })
            .collect()
    }

    /// Summed sub-element volume over envelope volume. Overlaps between
    /// sub-elements are counted twice.
    pub fn filling_fraction(&self) -> f64 {
        let filled: f64 = (0..self.instance_count())
            .filter_map(|copy| self.sub_elements.radius(copy))
            .map(|r| 4.0 / 3.0 * std::f64::consts::PI * r.powi(3))
            .sum();
        filled / self.envelope.volume()
    }
}

/// Build a component from its spec and position list.
///
/// An unsupported or under-specified envelope is fatal: no descriptor is
/// returned. An empty position list is not an error; the envelope is
/// simply left without sub-elements.
pub fn construct(
    spec: &ComponentSpec,
    records: PositionList,
) -> Result<ComponentDescriptor, ConstructionError> {
    let envelope = spec.shape.to_solid()?;
    let element_radius = check_dimension("element radius", spec.element.radius)?;

    let sub_elements = plan_placement(records);
    log::debug!(
        "Component '{}': {} envelope, {} sub-elements ({})",
        spec.name,
        envelope.kind(),
        sub_elements.instance_count(),
        sub_elements.name().unwrap_or("none")
    );

    Ok(ComponentDescriptor {
        name: spec.name.clone(),
        parent: spec.parent.clone(),
        material: spec.material.clone(),
        envelope,
        transform: spec.transform.clone(),
        element_material: spec.element.material.clone(),
        element_radius,
        sub_elements,
    })
}
