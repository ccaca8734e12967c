//! Envelope solids.
//!
//! Each solid is centred on its own local origin; where it sits in the
//! parent is decided by the component's [`Transform`](crate::transform::Transform).
//! Dimensions are in internal length units (mm).

use serde::{Deserialize, Serialize};

/// A closed envelope volume that sub-elements are placed inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Solid {
    Orb(Orb),
    Tubs(Tubs),
    Ellipsoid(Ellipsoid),
    Box(Cuboid),
}

/// A full sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub radius: f64,
}

/// A solid cylinder along the local z axis, full 360° and no inner bore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tubs {
    pub radius: f64,
    /// Half of the length along z.
    pub half_length: f64,
}

/// An axis-aligned ellipsoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-axis lengths along x, y, z.
    pub semi_axes: [f64; 3],
}

/// An axis-aligned box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Half-extents along x, y, z.
    pub half_extents: [f64; 3],
}

impl Solid {
    /// Short name used in logs and exports.
    pub fn kind(&self) -> &'static str {
        match self {
            Solid::Orb(_) => "sphere",
            Solid::Tubs(_) => "cylinder",
            Solid::Ellipsoid(_) => "ellipsoid",
            Solid::Box(_) => "box",
        }
    }

    /// Check whether a point (local coordinates) lies inside this solid.
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        let [x, y, z] = *point;
        match self {
            Solid::Orb(o) => x * x + y * y + z * z <= o.radius * o.radius,
            Solid::Tubs(t) => x * x + y * y <= t.radius * t.radius && z.abs() <= t.half_length,
            Solid::Ellipsoid(e) => {
                let dx = x / e.semi_axes[0];
                let dy = y / e.semi_axes[1];
                let dz = z / e.semi_axes[2];
                dx * dx + dy * dy + dz * dz <= 1.0
            }
            Solid::Box(b) => {
                x.abs() <= b.half_extents[0]
                    && y.abs() <= b.half_extents[1]
                    && z.abs() <= b.half_extents[2]
            }
        }
    }

    /// Whether a sphere of `radius` centred at `centre` lies wholly inside.
    ///
    /// For ellipsoids the distance from `centre` to the surface is found by
    /// bisection, so the answer is exact to within floating-point precision.
    pub fn encloses_sphere(&self, centre: &[f64; 3], radius: f64) -> bool {
        let [x, y, z] = *centre;
        match self {
            Solid::Orb(o) => (x * x + y * y + z * z).sqrt() + radius <= o.radius,
            Solid::Tubs(t) => {
                (x * x + y * y).sqrt() + radius <= t.radius && z.abs() + radius <= t.half_length
            }
            Solid::Ellipsoid(e) => {
                self.contains(centre)
                    && distance_to_ellipsoid_surface(e.semi_axes, *centre) >= radius
            }
            Solid::Box(b) => centre
                .iter()
                .zip(b.half_extents)
                .all(|(&c, h)| c.abs() + radius <= h),
        }
    }

    /// Axis-aligned bounding box: returns (min_corner, max_corner).
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let half = match self {
            Solid::Orb(o) => [o.radius; 3],
            Solid::Tubs(t) => [t.radius, t.radius, t.half_length],
            Solid::Ellipsoid(e) => e.semi_axes,
            Solid::Box(b) => b.half_extents,
        };
        (half.map(|h| -h), half)
    }

    /// Enclosed volume in cubic internal units.
    pub fn volume(&self) -> f64 {
        use std::f64::consts::PI;
        match self {
            Solid::Orb(o) => 4.0 / 3.0 * PI * o.radius.powi(3),
            Solid::Tubs(t) => PI * t.radius * t.radius * 2.0 * t.half_length,
            Solid::Ellipsoid(e) => 4.0 / 3.0 * PI * e.semi_axes.iter().product::<f64>(),
            Solid::Box(b) => 8.0 * b.half_extents.iter().product::<f64>(),
        }
    }
}

// Closest-point distance from an interior point to an ellipsoid surface,
// after D. Eberly, "Distance from a Point to an Ellipse, an Ellipsoid, or a
// Hyperellipsoid". Works in the first octant with axes sorted descending.
fn distance_to_ellipsoid_surface(semi_axes: [f64; 3], point: [f64; 3]) -> f64 {
    let mut axes = [
        (semi_axes[0], point[0].abs()),
        (semi_axes[1], point[1].abs()),
        (semi_axes[2], point[2].abs()),
    ];
    axes.sort_by(|a, b| b.0.total_cmp(&a.0));
    let [(e0, y0), (e1, y1), (e2, y2)] = axes;

    if y2 > 0.0 {
        if y1 > 0.0 {
            if y0 > 0.0 {
                let (z0, z1, z2) = (y0 / e0, y1 / e1, y2 / e2);
                let g = z0 * z0 + z1 * z1 + z2 * z2 - 1.0;
                if g == 0.0 {
                    return 0.0;
                }
                let r0 = (e0 / e2).powi(2);
                let r1 = (e1 / e2).powi(2);
                let n0 = r0 * z0;
                let n1 = r1 * z1;
                let upper = if g < 0.0 { 0.0 } else { robust_length(&[n0, n1, z2]) - 1.0 };
                let s = bisect(z2 - 1.0, upper, |s| {
                    (n0 / (s + r0)).powi(2) + (n1 / (s + r1)).powi(2) + (z2 / (s + 1.0)).powi(2)
                        - 1.0
                });
                let x0 = r0 * y0 / (s + r0);
                let x1 = r1 * y1 / (s + r1);
                let x2 = y2 / (s + 1.0);
                ((x0 - y0).powi(2) + (x1 - y1).powi(2) + (x2 - y2).powi(2)).sqrt()
            } else {
                distance_to_ellipse(e1, e2, y1, y2)
            }
        } else if y0 > 0.0 {
            distance_to_ellipse(e0, e2, y0, y2)
        } else {
            (y2 - e2).abs()
        }
    } else {
        let (denom0, denom1) = (e0 * e0 - e2 * e2, e1 * e1 - e2 * e2);
        let (numer0, numer1) = (e0 * y0, e1 * y1);
        if numer0 < denom0 && numer1 < denom1 {
            let xde0 = numer0 / denom0;
            let xde1 = numer1 / denom1;
            let discr = 1.0 - xde0 * xde0 - xde1 * xde1;
            if discr > 0.0 {
                let x0 = e0 * xde0;
                let x1 = e1 * xde1;
                let x2 = e2 * discr.sqrt();
                return ((x0 - y0).powi(2) + (x1 - y1).powi(2) + x2 * x2).sqrt();
            }
        }
        distance_to_ellipse(e0, e1, y0, y1)
    }
}

// 2D case of the above; requires e0 >= e1 and y0, y1 >= 0.
fn distance_to_ellipse(e0: f64, e1: f64, y0: f64, y1: f64) -> f64 {
    if y1 > 0.0 {
        if y0 > 0.0 {
            let (z0, z1) = (y0 / e0, y1 / e1);
            let g = z0 * z0 + z1 * z1 - 1.0;
            if g == 0.0 {
                return 0.0;
            }
            let r0 = (e0 / e1).powi(2);
            let n0 = r0 * z0;
            let upper = if g < 0.0 { 0.0 } else { robust_length(&[n0, z1]) - 1.0 };
            let s = bisect(z1 - 1.0, upper, |s| {
                (n0 / (s + r0)).powi(2) + (z1 / (s + 1.0)).powi(2) - 1.0
            });
            let x0 = r0 * y0 / (s + r0);
            let x1 = y1 / (s + 1.0);
            ((x0 - y0).powi(2) + (x1 - y1).powi(2)).sqrt()
        } else {
            (y1 - e1).abs()
        }
    } else {
        let numer0 = e0 * y0;
        let denom0 = e0 * e0 - e1 * e1;
        if numer0 < denom0 {
            let xde0 = numer0 / denom0;
            let x0 = e0 * xde0;
            let x1 = e1 * (1.0 - xde0 * xde0).sqrt();
            ((x0 - y0).powi(2) + x1 * x1).sqrt()
        } else {
            (y0 - e0).abs()
        }
    }
}

// Root of a function that is positive at `lo` and negative at `hi`.
fn bisect(mut lo: f64, mut hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    let mut s = lo;
    for _ in 0..1100 {
        s = 0.5 * (lo + hi);
        if s == lo || s == hi {
            break;
        }
        let g = f(s);
        if g > 0.0 {
            lo = s;
        } else if g < 0.0 {
            hi = s;
        } else {
            break;
        }
    }
    s
}

fn robust_length(v: &[f64]) -> f64 {
    let max = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if max == 0.0 {
        return 0.0;
    }
    max * v.iter().map(|x| (x / max).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orb_contains_and_encloses() {
        let orb = Solid::Orb(Orb { radius: 10.0 });
        assert!(orb.contains(&[0.0, 0.0, 10.0]));
        assert!(!orb.contains(&[0.0, 7.5, 7.5]));
        assert!(orb.encloses_sphere(&[0.0, 0.0, 5.0], 5.0));
        assert!(!orb.encloses_sphere(&[0.0, 0.0, 5.0], 5.1));
    }

    #[test]
    fn test_tubs_is_along_z() {
        let tubs = Solid::Tubs(Tubs { radius: 2.0, half_length: 10.0 });
        assert!(tubs.contains(&[0.0, 0.0, 9.0]));
        assert!(!tubs.contains(&[9.0, 0.0, 0.0]));
        assert!(tubs.encloses_sphere(&[1.0, 0.0, 8.0], 1.0));
        assert!(!tubs.encloses_sphere(&[1.0, 0.0, 9.5], 1.0));
        assert_eq!(tubs.bounding_box(), ([-2.0, -2.0, -10.0], [2.0, 2.0, 10.0]));
    }

    #[test]
    fn test_ellipsoid_enclosure() {
        let e = Solid::Ellipsoid(Ellipsoid { semi_axes: [10.0, 5.0, 2.0] });
        assert!(e.encloses_sphere(&[0.0, 0.0, 0.0], 1.0));
        assert!(e.encloses_sphere(&[0.0, 0.0, 0.0], 2.0));
        assert!(e.encloses_sphere(&[5.0, 0.0, 0.0], 1.0));
        assert!(!e.encloses_sphere(&[0.0, 0.0, 1.5], 1.0));
        assert!(!e.encloses_sphere(&[0.0, 0.0, 0.0], 3.0));
        assert!(!e.encloses_sphere(&[0.0, 0.0, 0.1], 2.0));
        assert!(!e.encloses_sphere(&[11.0, 0.0, 0.0], 0.5));
    }

    #[test]
    fn test_ellipsoid_rejects_sphere_at_curved_end() {
        let e = Solid::Ellipsoid(Ellipsoid { semi_axes: [10.0, 5.0, 2.0] });
        // Each sphere has a surface point outside the ellipsoid.
        assert!(!e.encloses_sphere(&[1.0, 0.0, 0.0], 2.0));
        assert!(!e.contains(&[1.0, 0.0, 2.0]));
        assert!(!e.encloses_sphere(&[9.0, 0.0, 0.0], 1.0));
        let surface = [9.375, 0.0, 0.927];
        let d = ((surface[0] - 9.0_f64).powi(2) + surface[2] * surface[2]).sqrt();
        assert!(d < 1.0 + 1e-3 && !e.contains(&surface));
    }

    #[test]
    fn test_ellipsoid_distance_matches_sphere() {
        // Equal semi-axes: distance to the surface is R - |p|.
        let d = distance_to_ellipsoid_surface([3.0; 3], [1.0, 0.5, -0.25]);
        let expected = 3.0 - (1.0_f64 + 0.25 + 0.0625).sqrt();
        assert_relative_eq!(d, expected, epsilon = 1e-9);
        let d = distance_to_ellipsoid_surface([10.0, 5.0, 2.0], [0.0, 0.0, 0.0]);
        assert_relative_eq!(d, 2.0);
    }

    #[test]
    fn test_box_enclosure() {
        let b = Solid::Box(Cuboid { half_extents: [1.0, 2.0, 3.0] });
        assert!(b.encloses_sphere(&[0.0, 1.0, -2.0], 1.0));
        assert!(!b.encloses_sphere(&[0.5, 0.0, 0.0], 1.0));
    }

    #[test]
    fn test_volumes() {
        assert_relative_eq!(
            Solid::Orb(Orb { radius: 1.0 }).volume(),
            4.0 / 3.0 * std::f64::consts::PI
        );
        assert_relative_eq!(
            Solid::Box(Cuboid { half_extents: [1.0, 2.0, 3.0] }).volume(),
            48.0
        );
        let sphere_like = Solid::Ellipsoid(Ellipsoid { semi_axes: [2.0; 3] });
        assert_relative_eq!(sphere_like.volume(), Solid::Orb(Orb { radius: 2.0 }).volume());
    }
}
