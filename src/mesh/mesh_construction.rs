use crate::{is_multiple_of, BoundaryCondition, Error, Region, Result, Vec3};

use super::{Axis, Mesh, PlaneInfo};

/// Configuration for a [`Mesh`].
///
/// The region is given either directly with [`region`][Self::region]
/// or as two corner points with [`points`][Self::points]
/// (or [`p1`][Self::p1] and [`p2`][Self::p2] separately), but not both.
/// The discretisation is given either as a cell size with [`cell`][Self::cell]
/// or as a number of cells per axis with [`n`][Self::n], but not both;
/// the other one is derived from the region edges.
///
/// ```
/// # use fdfield::{Mesh, Region, Vec3};
/// let mesh = Mesh::builder()
///     .points(Vec3::new(0., 0., 0.), Vec3::new(100e-9, 50e-9, 10e-9))
///     .cell(Vec3::new(5e-9, 5e-9, 5e-9))
///     .bc("xy".parse()?)
///     .subregion(
///         "left",
///         Region::new(Vec3::new(0., 0., 0.), Vec3::new(50e-9, 50e-9, 10e-9))?,
///     )
///     .build()?;
/// assert_eq!(mesh.n(), [20, 10, 2]);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MeshBuilder {
    region: Option<Region>,
    p1: Option<Vec3>,
    p2: Option<Vec3>,
    cell: Option<Vec3>,
    n: Option<[usize; 3]>,
    bc: BoundaryCondition,
    subregions: Vec<(String, Region)>,
}

impl MeshBuilder {
    /// Discretise an existing region.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Discretise the region between two corner points.
    pub fn points(self, p1: Vec3, p2: Vec3) -> Self {
        self.p1(p1).p2(p2)
    }

    /// Set the first corner point.
    pub fn p1(mut self, p1: Vec3) -> Self {
        self.p1 = Some(p1);
        self
    }

    /// Set the second corner point.
    pub fn p2(mut self, p2: Vec3) -> Self {
        self.p2 = Some(p2);
        self
    }

    /// Set the cell size.
    pub fn cell(mut self, cell: Vec3) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Set the number of cells along each axis.
    pub fn n(mut self, n: [usize; 3]) -> Self {
        self.n = Some(n);
        self
    }

    /// Set the boundary conditions. Open by default.
    pub fn bc(mut self, bc: BoundaryCondition) -> Self {
        self.bc = bc;
        self
    }

    /// Add a named subregion.
    ///
    /// Subregions are not required to lie inside the mesh region.
    pub fn subregion(mut self, name: impl Into<String>, region: Region) -> Self {
        self.subregions.push((name.into(), region));
        self
    }

    /// Add several named subregions at once, keeping their order.
    pub fn subregions(
        mut self,
        subregions: impl IntoIterator<Item = (impl Into<String>, Region)>,
    ) -> Self {
        self.subregions
            .extend(subregions.into_iter().map(|(name, r)| (name.into(), r)));
        self
    }

    /// Validate the configuration and construct the mesh.
    pub fn build(self) -> Result<Mesh> {
        let region = match (self.region, self.p1, self.p2) {
            (Some(region), None, None) => region,
            (None, Some(p1), Some(p2)) => Region::new(p1, p2)?,
            _ => {
                return Err(Error::ConflictingArguments(
                    "either region or both p1 and p2 can be passed, not both",
                ))
            }
        };
        let edges = region.edges();

        let (cell, n) = match (self.cell, self.n) {
            (Some(cell), None) => {
                if cell.iter().any(|c| !(c.is_finite() && *c > 0.)) {
                    return Err(Error::InvalidDiscretisation(format!(
                        "cell size {cell:?} must be strictly positive"
                    )));
                }
                let n = std::array::from_fn(|axis| (edges[axis] / cell[axis]).round() as usize);
                (cell, n)
            }
            (None, Some(n)) => {
                if n.contains(&0) {
                    return Err(Error::InvalidDiscretisation(format!(
                        "cell count {n:?} must be positive on every axis"
                    )));
                }
                (Vec3::from_fn(|axis, _| edges[axis] / n[axis] as f64), n)
            }
            _ => {
                return Err(Error::ConflictingArguments(
                    "either n or cell can be passed, not both",
                ))
            }
        };

        // the region must be an aggregate of whole cells
        if n.contains(&0) || (0..3).any(|axis| !is_multiple_of(edges[axis], cell[axis])) {
            return Err(Error::NotAggregate { edges, cell });
        }

        for (i, (name, _)) in self.subregions.iter().enumerate() {
            if self.subregions[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::ConflictingArguments(
                    "subregion names must be unique",
                ));
            }
        }

        log::trace!("built mesh with n={n:?}, cell={cell:?}, bc='{}'", self.bc);

        Ok(Mesh {
            region,
            cell,
            n,
            bc: self.bc,
            subregions: self.subregions,
            plane: None,
        })
    }
}

/// A 10 x 10 x 10 cube from the origin with 2 x 2 x 2 cells.
///
/// This is public for visibility in doctests, which frequently need an instance of a mesh.
/// It is not meant to be used by users and thus hidden from docs.
#[doc(hidden)]
pub fn tiny_mesh() -> Mesh {
    Mesh {
        region: Region::from_sorted(Vec3::zeros(), Vec3::new(10., 10., 10.)),
        cell: Vec3::new(2., 2., 2.),
        n: [5, 5, 5],
        bc: BoundaryCondition::Open,
        subregions: Vec::new(),
        plane: None,
    }
}

/// The z-plane through the centre of [`tiny_mesh`].
#[doc(hidden)]
pub fn tiny_plane_mesh() -> Mesh {
    Mesh {
        region: Region::from_sorted(Vec3::new(0., 0., 4.), Vec3::new(10., 10., 6.)),
        cell: Vec3::new(2., 2., 2.),
        n: [5, 5, 1],
        bc: BoundaryCondition::Open,
        subregions: Vec::new(),
        plane: Some(PlaneInfo {
            plane_axis: Axis::Z,
            axis1: Axis::X,
            axis2: Axis::Y,
            point: 5.,
        }),
    }
}
