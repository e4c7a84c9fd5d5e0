//! Finite-difference fields on regular rectangular meshes.
//!
//! The building blocks, from the ground up:
//! - a [`Region`] is an axis-aligned box between two corner points,
//! - a [`Mesh`] divides a region into equally sized rectangular cells,
//! - a [`Field`] assigns a scalar or vector value to every cell of a mesh.
//!
//! Fields support elementwise arithmetic, finite-difference derivatives
//! ([`grad`][Field::grad], [`div`][Field::div], [`curl`][Field::curl]),
//! integrals and averages, sampling along lines and planes,
//! and reading/writing the OOMMF vector field format ([`ovf`]).
//!
//! # Example
//!
//! ```
//! use fdfield::{Field, Mesh, Vec3};
//!
//! let mesh = Mesh::with_cell(
//!     Vec3::new(0., 0., 0.),
//!     Vec3::new(10., 10., 10.),
//!     Vec3::new(2., 2., 2.),
//! )?;
//! let f = Field::from_fn(mesh, 3, |p| vec![p.x, p.y, p.z])?;
//! assert_eq!(f.div()?.average().as_slice(), &[3.]);
//! assert_eq!(f.curl()?.average().as_slice(), &[0., 0., 0.]);
//! # Ok::<(), fdfield::Error>(())
//! ```
//!
//! # Cell ordering
//!
//! Cells are always enumerated with the x index varying fastest,
//! then y, then z.
//! The same order is used by [`Mesh::indices`], [`Mesh::coordinates`],
//! the rows of [`Field::values`] and the data section of OVF files.

#![warn(missing_docs)]

pub mod error;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};

pub mod region;
#[doc(inline)]
pub use region::Region;

pub mod mesh;
#[doc(inline)]
pub use mesh::{Axis, BoundaryCondition, CellSubset, Mesh, MeshBuilder, PlaneInfo, PlaneSpec};

pub mod field;
#[doc(inline)]
pub use field::{Field, Measure, Value};

pub mod operator;
#[doc(inline)]
pub use operator::{cross, dot, stack, DerivativeOperator};

pub mod topology;

pub mod ovf;
#[doc(inline)]
pub use ovf::Representation;

pub mod vtk;

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 3D `nalgebra` vector, used for points and cell sizes.
pub type Vec3 = na::Vector3<f64>;

/// Absolute tolerance (in the region's length units)
/// for all geometric comparisons in the crate.
pub const TOLERANCE: f64 = 1e-12;

/// Compare two lengths with the crate-wide [`TOLERANCE`].
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// Check whether `length` is an integer multiple of `step`
/// up to the crate-wide [`TOLERANCE`].
#[inline]
pub(crate) fn is_multiple_of(length: f64, step: f64) -> bool {
    let rem = length.abs() % step;
    rem <= TOLERANCE || rem >= step - TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiples_within_tolerance() {
        assert!(is_multiple_of(10., 2.));
        assert!(is_multiple_of(1e-8, 1e-9));
        assert!(is_multiple_of(0.3, 0.1));
        assert!(is_multiple_of(-4., 2.));
        assert!(!is_multiple_of(1., 0.4));
        assert!(!is_multiple_of(5., 3.));
    }
}
