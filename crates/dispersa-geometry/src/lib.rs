//! # Dispersa Geometry
//!
//! Geometry for distributed components: an envelope solid filled with
//! spherical sub-elements read from a position list. This crate provides:
//!
//! - **Position lists** ([`parsers`]) — Load `x y z radius` text files,
//!   skipping and reporting bad lines instead of failing.
//! - **Envelope solids** ([`primitives`]) — Spheres, cylinders, ellipsoids,
//!   and boxes with containment tests.
//! - **Placement** ([`placement`]) — Direct placement for a single
//!   sub-element, parameterised placement for many.
//! - **Components** ([`component`]) — Build a component descriptor from an
//!   explicit spec.
//! - **Transformations** ([`transform`]) and **units** ([`units`]).

pub mod component;
pub mod parsers;
pub mod placement;
pub mod primitives;
pub mod transform;
pub mod units;
