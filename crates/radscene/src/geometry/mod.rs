//! Typed geometry primitives.
//!
//! Bubble, cup and tube share the parameters of sphere, cone and cylinder and
//! differ only in the direction of their surface normal. Instances and meshes
//! are carried as generic primitives.

mod cone;
mod cylinder;
mod polygon;
mod ring;
mod source;
mod sphere;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use polygon::Polygon;
pub(crate) use polygon::face_record;
pub use ring::Ring;
pub use source::Source;
pub use sphere::Sphere;

use crate::value::Value;

/// Flatten points and scalars into one value line.
pub(crate) fn real_line<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>, scalars: &[f64]) -> Vec<Value> {
    points
        .into_iter()
        .flat_map(|p| p.iter().copied())
        .chain(scalars.iter().copied())
        .map(Value::Number)
        .collect()
}

/// Split a slice of reals into a point at `start`.
pub(crate) fn point_at(v: &[f64], start: usize) -> [f64; 3] {
    [v[start], v[start + 1], v[start + 2]]
}
