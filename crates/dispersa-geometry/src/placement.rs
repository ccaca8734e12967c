//! Placement of sub-elements inside an envelope.
//!
//! The number of records decides the mechanism:
//!
//! | Records | Placement |
//! |---------|-----------|
//! | 0 | none |
//! | 1 | one direct placement with its own transform |
//! | > 1 | one parameterised placement covering every copy |
//!
//! A parameterised placement stores the position list once and answers
//! per-copy queries, so thousands of sub-elements cost one record each
//! rather than one volume object each.

use serde::{Deserialize, Serialize};

use crate::parsers::{PlacementRecord, PositionList};
use crate::transform::Transform;

/// Volume name for a lone sub-element.
pub const SINGLE_PLACEMENT_NAME: &str = "Subcomponent";
/// Volume name for the parameterised set of sub-elements.
pub const PARAMETERISED_PLACEMENT_NAME: &str = "Subcomponents";

/// Per-copy transform and size source for a replicated volume.
pub trait Parameterisation {
    /// Number of copies described.
    fn copies(&self) -> usize;

    /// Placement of copy `copy` in the mother frame, `None` if out of range.
    fn transform(&self, copy: usize) -> Option<Transform>;

    /// Sphere radius of copy `copy`, `None` if out of range.
    fn radius(&self, copy: usize) -> Option<f64>;
}

/// Parameterisation backed by a position list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedParameterisation {
    records: PositionList,
}

impl DistributedParameterisation {
    pub fn new(records: PositionList) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }
}

impl Parameterisation for DistributedParameterisation {
    fn copies(&self) -> usize {
        self.records.len()
    }

    fn transform(&self, copy: usize) -> Option<Transform> {
        self.records.get(copy).map(|r| {
            let [x, y, z] = r.position;
            Transform::translation(x, y, z)
        })
    }

    fn radius(&self, copy: usize) -> Option<f64> {
        self.records.get(copy).map(|r| r.radius)
    }
}

/// How the sub-elements of a component are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubElementPlacement {
    /// No records: the envelope is empty.
    None,
    /// Exactly one record, placed directly.
    Single {
        name: String,
        transform: Transform,
        radius: f64,
    },
    /// Several records behind one parameterised placement.
    Parameterised {
        name: String,
        copies: usize,
        parameterisation: DistributedParameterisation,
    },
}

impl SubElementPlacement {
    /// Number of sub-element instances this placement stands for.
    pub fn instance_count(&self) -> usize {
        match self {
            SubElementPlacement::None => 0,
            SubElementPlacement::Single { .. } => 1,
            SubElementPlacement::Parameterised { copies, .. } => *copies,
        }
    }

    /// Placement of instance `copy` in the envelope frame.
    pub fn transform(&self, copy: usize) -> Option<Transform> {
        match self {
            SubElementPlacement::None => None,
            SubElementPlacement::Single { transform, .. } => {
                (copy == 0).then(|| transform.clone())
            }
            SubElementPlacement::Parameterised { parameterisation, .. } => {
                parameterisation.transform(copy)
            }
        }
    }

    /// Radius of instance `copy`.
    pub fn radius(&self, copy: usize) -> Option<f64> {
        match self {
            SubElementPlacement::None => None,
            SubElementPlacement::Single { radius, .. } => (copy == 0).then_some(*radius),
            SubElementPlacement::Parameterised { parameterisation, .. } => {
                parameterisation.radius(copy)
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SubElementPlacement::None => None,
            SubElementPlacement::Single { name, .. }
            | SubElementPlacement::Parameterised { name, .. } => Some(name.as_str()),
        }
    }
}

/// Choose the placement mechanism for a position list.
///
/// The count and the parameterisation both come from `records`, so the
/// position source is only ever read once.
pub fn plan_placement(records: PositionList) -> SubElementPlacement {
    match records.len() {
        0 => SubElementPlacement::None,
        1 => {
            let only = records[0];
            let [x, y, z] = only.position;
            SubElementPlacement::Single {
                name: SINGLE_PLACEMENT_NAME.to_string(),
                transform: Transform::translation(x, y, z),
                radius: only.radius,
            }
        }
        copies => SubElementPlacement::Parameterised {
            name: PARAMETERISED_PLACEMENT_NAME.to_string(),
            copies,
            parameterisation: DistributedParameterisation::new(records),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: [f64; 3], radius: f64) -> PlacementRecord {
        PlacementRecord { position, radius }
    }

    #[test]
    fn test_empty_list_places_nothing() {
        let placement = plan_placement(Vec::new());
        assert_eq!(placement, SubElementPlacement::None);
        assert_eq!(placement.instance_count(), 0);
        assert!(placement.transform(0).is_none());
        assert!(placement.name().is_none());
    }

    #[test]
    fn test_single_record_is_direct() {
        let placement = plan_placement(vec![record([1.0, 2.0, 3.0], 0.5)]);
        match &placement {
            SubElementPlacement::Single { name, transform, radius } => {
                assert_eq!(name, SINGLE_PLACEMENT_NAME);
                assert_eq!(transform.offset(), [1.0, 2.0, 3.0]);
                assert!(transform.is_rotation_free());
                assert_eq!(*radius, 0.5);
            }
            other => panic!("expected single placement, got {other:?}"),
        }
        assert!(placement.transform(1).is_none());
    }

    #[test]
    fn test_many_records_are_parameterised() {
        let records: Vec<_> = (0..1000)
            .map(|i| record([i as f64, 0.0, -(i as f64)], 0.1 + i as f64 * 1e-3))
            .collect();
        let placement = plan_placement(records.clone());
        match &placement {
            SubElementPlacement::Parameterised { name, copies, parameterisation } => {
                assert_eq!(name, PARAMETERISED_PLACEMENT_NAME);
                assert_eq!(*copies, 1000);
                assert_eq!(parameterisation.copies(), 1000);
                assert_eq!(parameterisation.records(), records.as_slice());
            }
            other => panic!("expected parameterised placement, got {other:?}"),
        }
        assert_eq!(placement.transform(999).unwrap().offset(), [999.0, 0.0, -999.0]);
        assert_eq!(placement.radius(10), Some(records[10].radius));
        assert!(placement.radius(1000).is_none());
    }
}
