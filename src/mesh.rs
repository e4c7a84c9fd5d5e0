//! The discretisation structure: a regular rectangular mesh of cells.

/// Mesh configuration and validation, plus small meshes for tests.
mod mesh_construction;
pub use mesh_construction::MeshBuilder;
/// re-export the testing meshes for use in other modules' tests and doctests
#[doc(hidden)]
pub use mesh_construction::{tiny_mesh, tiny_plane_mesh};

mod iter;
pub use iter::{AxisPoints, Coordinates, Indices, LinePoints};

mod subset;
pub use subset::CellSubset;

//

use itertools::Itertools;
use std::str::FromStr;

use crate::{approx_eq, is_multiple_of, Error, Region, Result, Vec3, TOLERANCE};

/// One of the three coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The first axis.
    X,
    /// The second axis.
    Y,
    /// The third axis.
    Z,
}

impl Axis {
    /// All axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in a coordinate vector.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The axis at a position in a coordinate vector, if there is one.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The two other axes in ascending order,
    /// i.e. the in-plane axes of a plane perpendicular to this one.
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Lowercase name of the axis.
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(Error::UnknownAxis(other.to_string())),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Boundary conditions of a mesh.
///
/// Periodicity decides how neighbours are found at the mesh edges
/// and how derivatives are taken there.
/// Neumann and Dirichlet conditions are recorded for consumers of the mesh
/// but otherwise behave like open boundaries.
///
/// The string form used by OOMMF-style tools can be parsed:
/// ```
/// # use fdfield::{Axis, BoundaryCondition};
/// let bc: BoundaryCondition = "xz".parse()?;
/// assert!(bc.is_periodic(Axis::X) && !bc.is_periodic(Axis::Y));
/// assert_eq!("".parse::<BoundaryCondition>()?, BoundaryCondition::Open);
/// assert_eq!("Neumann".parse::<BoundaryCondition>()?, BoundaryCondition::Neumann);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// No special treatment, cells at the edge simply have fewer neighbours.
    #[default]
    Open,
    /// Periodic along the axes marked true, open along the rest.
    Periodic {
        /// Periodic along x.
        x: bool,
        /// Periodic along y.
        y: bool,
        /// Periodic along z.
        z: bool,
    },
    /// Neumann boundary conditions.
    Neumann,
    /// Dirichlet boundary conditions.
    Dirichlet,
}

impl BoundaryCondition {
    /// Periodic boundary conditions along the given axes.
    ///
    /// An empty list gives [`Open`][Self::Open].
    pub fn periodic(axes: &[Axis]) -> Self {
        if axes.is_empty() {
            return Self::Open;
        }
        Self::Periodic {
            x: axes.contains(&Axis::X),
            y: axes.contains(&Axis::Y),
            z: axes.contains(&Axis::Z),
        }
    }

    /// Whether the mesh wraps around along `axis`.
    pub fn is_periodic(&self, axis: Axis) -> bool {
        match (self, axis) {
            (Self::Periodic { x, .. }, Axis::X) => *x,
            (Self::Periodic { y, .. }, Axis::Y) => *y,
            (Self::Periodic { z, .. }, Axis::Z) => *z,
            _ => false,
        }
    }
}

impl FromStr for BoundaryCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "neumann" => return Ok(Self::Neumann),
            "dirichlet" => return Ok(Self::Dirichlet),
            _ => {}
        }
        let axes: Vec<Axis> = lower
            .chars()
            .map(|c| c.to_string().parse::<Axis>())
            .collect::<Result<_>>()
            .map_err(|_| Error::InvalidBoundaryCondition(s.to_string()))?;
        Ok(Self::periodic(&axes))
    }
}

impl std::fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => Ok(()),
            Self::Neumann => f.write_str("neumann"),
            Self::Dirichlet => f.write_str("dirichlet"),
            Self::Periodic { .. } => {
                for axis in Axis::ALL.into_iter().filter(|a| self.is_periodic(*a)) {
                    f.write_str(axis.name())?;
                }
                Ok(())
            }
        }
    }
}

/// Where to slice a mesh with [`Mesh::plane`].
///
/// Parses from `"z"` (slice through the centre) or `"z=2.5"`:
/// ```
/// # use fdfield::{Axis, PlaneSpec};
/// assert_eq!("y".parse::<PlaneSpec>()?, PlaneSpec::Centre(Axis::Y));
/// assert_eq!("x = -1e-9".parse::<PlaneSpec>()?, PlaneSpec::At(Axis::X, -1e-9));
/// assert!("x=1,y=2".parse::<PlaneSpec>().is_err());
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaneSpec {
    /// Perpendicular to the axis, through the centre of the region.
    Centre(Axis),
    /// Perpendicular to the axis, at the given coordinate along it.
    At(Axis, f64),
}

impl PlaneSpec {
    /// The axis the plane is perpendicular to.
    pub fn axis(&self) -> Axis {
        match self {
            Self::Centre(axis) | Self::At(axis, _) => *axis,
        }
    }
}

impl From<Axis> for PlaneSpec {
    fn from(axis: Axis) -> Self {
        Self::Centre(axis)
    }
}

impl FromStr for PlaneSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPlaneSpec(s.to_string());
        match s.split('=').collect_tuple::<(&str, &str)>() {
            Some((axis, value)) => {
                let axis = axis.parse::<Axis>().map_err(|_| invalid())?;
                let value = value.trim().parse::<f64>().map_err(|_| invalid())?;
                Ok(Self::At(axis, value))
            }
            None if !s.contains('=') => Ok(Self::Centre(s.parse().map_err(|_| invalid())?)),
            None => Err(invalid()),
        }
    }
}

/// Metadata attached to meshes created with [`Mesh::plane`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneInfo {
    /// The axis perpendicular to the plane.
    pub plane_axis: Axis,
    /// The first in-plane axis.
    pub axis1: Axis,
    /// The second in-plane axis.
    pub axis2: Axis,
    /// Coordinate of the plane along `plane_axis`.
    pub point: f64,
}

/// A regular finite-difference mesh.
///
/// The mesh divides a [`Region`] into equally sized rectangular cells.
/// Cells are identified by an index `[ix, iy, iz]`
/// and represented by their centre point.
///
/// Meshes are immutable; operations like [`plane`][Self::plane]
/// and [`pad`][Self::pad] create new meshes.
/// Create one with [`MeshBuilder`] or the shorthands
/// [`with_cell`][Self::with_cell] and [`with_n`][Self::with_n].
#[derive(Clone, Debug)]
pub struct Mesh {
    region: Region,
    cell: Vec3,
    n: [usize; 3],
    bc: BoundaryCondition,
    /// named regions in insertion order, names are unique
    subregions: Vec<(String, Region)>,
    plane: Option<PlaneInfo>,
}

impl Mesh {
    /// Start configuring a mesh.
    #[inline]
    pub fn builder() -> MeshBuilder {
        MeshBuilder::default()
    }

    /// Mesh between two corner points with the given cell size.
    pub fn with_cell(p1: Vec3, p2: Vec3, cell: Vec3) -> Result<Self> {
        Self::builder().points(p1, p2).cell(cell).build()
    }

    /// Mesh between two corner points with the given number of cells per axis.
    pub fn with_n(p1: Vec3, p2: Vec3, n: [usize; 3]) -> Result<Self> {
        Self::builder().points(p1, p2).n(n).build()
    }

    /// The region covered by the mesh.
    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Size of a single cell.
    #[inline]
    pub fn cell(&self) -> Vec3 {
        self.cell
    }

    /// Number of cells along each axis.
    #[inline]
    pub fn n(&self) -> [usize; 3] {
        self.n
    }

    /// Boundary conditions of the mesh.
    #[inline]
    pub fn bc(&self) -> BoundaryCondition {
        self.bc
    }

    /// Named subregions in the order they were given.
    #[inline]
    pub fn subregions(&self) -> &[(String, Region)] {
        &self.subregions
    }

    /// Look up a subregion by name.
    pub fn subregion(&self, name: &str) -> Result<&Region> {
        self.subregions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
            .ok_or_else(|| Error::UnknownSubregion(name.to_string()))
    }

    /// Plane metadata if this mesh was created with [`plane`][Self::plane].
    #[inline]
    pub fn plane_info(&self) -> Option<&PlaneInfo> {
        self.plane.as_ref()
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.n.iter().product()
    }

    /// Always false since meshes have at least one cell;
    /// provided for consistency with [`len`][Self::len].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Volume of a single cell.
    #[inline]
    pub fn dv(&self) -> f64 {
        self.cell.product()
    }

    #[inline]
    fn check_index(&self, index: [usize; 3]) -> Result<()> {
        if (0..3).any(|axis| index[axis] >= self.n[axis]) {
            return Err(Error::IndexOutOfRange { index, n: self.n });
        }
        Ok(())
    }

    /// Position of a cell in the enumeration order
    /// (x fastest, then y, then z).
    ///
    /// The index is assumed to be in range.
    #[inline]
    pub(crate) fn linear_index(&self, index: [usize; 3]) -> usize {
        debug_assert!(self.check_index(index).is_ok());
        index[0] + self.n[0] * (index[1] + self.n[1] * index[2])
    }

    /// Inverse of [`linear_index`][Self::linear_index].
    #[inline]
    pub(crate) fn cell_index(&self, linear: usize) -> [usize; 3] {
        let [nx, ny, _] = self.n;
        [linear % nx, (linear / nx) % ny, linear / (nx * ny)]
    }

    /// The centre point of the cell with the given index.
    pub fn index_to_point(&self, index: [usize; 3]) -> Result<Vec3> {
        self.check_index(index)?;
        Ok(self.centre_of(index))
    }

    /// Centre point without the range check.
    #[inline]
    pub(crate) fn centre_of(&self, index: [usize; 3]) -> Vec3 {
        let pmin = self.region.pmin();
        Vec3::from_fn(|axis, _| pmin[axis] + (index[axis] as f64 + 0.5) * self.cell[axis])
    }

    /// The index of the cell containing a point.
    ///
    /// Points on the boundary between two cells may round either way;
    /// points on the region boundary are snapped into the outermost cell.
    pub fn point_to_index(&self, point: &Vec3) -> Result<[usize; 3]> {
        if !self.region.contains(point) {
            return Err(Error::PointOutsideRegion(*point));
        }
        Ok(self.nearest_index(point))
    }

    /// The index of the cell nearest to a point, without the region check.
    pub(crate) fn nearest_index(&self, point: &Vec3) -> [usize; 3] {
        let pmin = self.region.pmin();
        std::array::from_fn(|axis| {
            let i = ((point[axis] - pmin[axis]) / self.cell[axis] - 0.5).round();
            (i.max(0.) as usize).min(self.n[axis] - 1)
        })
    }

    /// Iterate over all cell indices
    /// with x varying fastest, then y, then z.
    #[inline]
    pub fn indices(&self) -> Indices {
        Indices::new(self.n)
    }

    /// Iterate over all cell centres in the same order as [`indices`][Self::indices].
    #[inline]
    pub fn coordinates(&self) -> Coordinates<'_> {
        Coordinates::new(self)
    }

    /// Iterate over cell-centre coordinates along one axis.
    #[inline]
    pub fn axis_points(&self, axis: Axis) -> AxisPoints {
        AxisPoints::new(self, axis)
    }

    /// Evenly spaced points on the line from `p1` to `p2`, both included.
    ///
    /// Fails if either end point is outside the mesh region.
    pub fn line(&self, p1: Vec3, p2: Vec3, n: usize) -> Result<LinePoints> {
        for p in [p1, p2] {
            if !self.region.contains(&p) {
                return Err(Error::PointOutsideRegion(p));
            }
        }
        Ok(LinePoints::new(p1, p2, n))
    }

    /// Indices of the neighbouring cells of a cell.
    ///
    /// Neighbours are listed per axis, first the one below and then the one above.
    /// On periodic axes with more than one cell,
    /// cells at the edge have the cell at the opposite edge as a neighbour.
    /// Each neighbour appears only once.
    ///
    /// ```
    /// # use fdfield::{BoundaryCondition, Axis, Mesh, Vec3};
    /// let mesh = Mesh::builder()
    ///     .points(Vec3::zeros(), Vec3::new(2., 2., 1.))
    ///     .n([2, 2, 1])
    ///     .bc(BoundaryCondition::periodic(&[Axis::X]))
    ///     .build()?;
    /// assert_eq!(mesh.neighbours([0, 0, 0])?, vec![[1, 0, 0], [0, 1, 0]]);
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn neighbours(&self, index: [usize; 3]) -> Result<Vec<[usize; 3]>> {
        self.check_index(index)?;
        let neighbours = Axis::ALL
            .into_iter()
            .flat_map(|axis| {
                let a = axis.index();
                [self.step_below(index[a], axis), self.step_above(index[a], axis)]
                    .into_iter()
                    .flatten()
                    .map(move |i| {
                        let mut neighbour = index;
                        neighbour[a] = i;
                        neighbour
                    })
            })
            .filter(|neighbour| *neighbour != index)
            .unique()
            .collect();
        Ok(neighbours)
    }

    /// The index one step below `i` along `axis`, wrapping if periodic.
    pub(crate) fn step_below(&self, i: usize, axis: Axis) -> Option<usize> {
        let n = self.n[axis.index()];
        if i > 0 {
            Some(i - 1)
        } else if n > 1 && self.bc.is_periodic(axis) {
            Some(n - 1)
        } else {
            None
        }
    }

    /// The index one step above `i` along `axis`, wrapping if periodic.
    pub(crate) fn step_above(&self, i: usize, axis: Axis) -> Option<usize> {
        let n = self.n[axis.index()];
        if i + 1 < n {
            Some(i + 1)
        } else if n > 1 && self.bc.is_periodic(axis) {
            Some(0)
        } else {
            None
        }
    }

    /// Create a mesh one cell thick, perpendicular to an axis.
    ///
    /// The plane spans the whole region along the other two axes
    /// with `n` cells (by default the same as this mesh has along those axes).
    /// The result carries [`PlaneInfo`] describing the slice.
    ///
    /// ```
    /// # use fdfield::{Axis, Mesh, Vec3};
    /// # let mesh = fdfield::mesh::tiny_mesh();
    /// let plane = mesh.plane("z=3".parse::<fdfield::PlaneSpec>()?, Some([10, 4]))?;
    /// assert_eq!(plane.n(), [10, 4, 1]);
    /// assert_eq!(plane.plane_info().unwrap().plane_axis, Axis::Z);
    /// assert_eq!(plane.region().centre().z, 3.);
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn plane(&self, spec: impl Into<PlaneSpec>, n: Option<[usize; 2]>) -> Result<Self> {
        let spec = spec.into();
        let plane_axis = spec.axis();
        let pa = plane_axis.index();
        let point = match spec {
            PlaneSpec::Centre(_) => self.region.centre()[pa],
            PlaneSpec::At(_, value) => {
                let mut test_point = self.region.centre();
                test_point[pa] = value;
                if !self.region.contains(&test_point) {
                    return Err(Error::PointOutsideRegion(test_point));
                }
                value
            }
        };

        let (axis1, axis2) = plane_axis.others();
        let (a1, a2) = (axis1.index(), axis2.index());
        let [n1, n2] = n.unwrap_or([self.n[a1], self.n[a2]]);

        let mut p1 = self.region.pmin();
        let mut p2 = self.region.pmax();
        p1[pa] = point - self.cell[pa] / 2.;
        p2[pa] = point + self.cell[pa] / 2.;
        let mut plane_n = [1; 3];
        plane_n[a1] = n1;
        plane_n[a2] = n2;

        let mut mesh = Self::builder()
            .points(p1, p2)
            .n(plane_n)
            .bc(self.bc)
            .build()?;
        mesh.plane = Some(PlaneInfo {
            plane_axis,
            axis1,
            axis2,
            point,
        });
        Ok(mesh)
    }

    /// Create a mesh over a named subregion with the same cell size.
    pub fn subregion_mesh(&self, name: &str) -> Result<Self> {
        Self::builder()
            .region(*self.subregion(name)?)
            .cell(self.cell)
            .build()
    }

    /// The smallest mesh aligned with this one that covers `region`.
    ///
    /// The corners of `region` are snapped outwards to whole cells.
    /// Fails if `region` is not inside this mesh's region.
    pub fn covering_mesh(&self, region: &Region) -> Result<Self> {
        if !self.region.contains_region(region) {
            return Err(Error::RegionOutsideMesh);
        }
        let origin = self.region.pmin();
        let (rmin, rmax) = (region.pmin(), region.pmax());
        let mut pmin = origin;
        let mut pmax = origin;
        for a in 0..3 {
            let last = (self.n[a] - 1) as f64;
            // faces within tolerance of a cell boundary stay on it
            let lower = ((rmin[a] - origin[a] + TOLERANCE) / self.cell[a]).floor();
            let upper = ((rmax[a] - origin[a] - TOLERANCE) / self.cell[a]).ceil() - 1.;
            pmin[a] += lower.clamp(0., last) * self.cell[a];
            pmax[a] += (upper.clamp(0., last) + 1.) * self.cell[a];
        }
        Self::builder()
            .points(pmin, pmax)
            .cell(self.cell)
            .build()
    }

    /// Extend the mesh by whole cells.
    ///
    /// Each entry gives an axis and the number of cells to add
    /// below and above the region along it.
    /// The result keeps the cell size and boundary conditions.
    pub fn pad(&self, pad_width: &[(Axis, (usize, usize))]) -> Result<Self> {
        let mut pmin = self.region.pmin();
        let mut pmax = self.region.pmax();
        for (axis, (below, above)) in pad_width {
            let a = axis.index();
            pmin[a] -= *below as f64 * self.cell[a];
            pmax[a] += *above as f64 * self.cell[a];
        }
        Self::builder()
            .points(pmin, pmax)
            .cell(self.cell)
            .bc(self.bc)
            .build()
    }

    /// Check whether the cell lattices of two meshes line up,
    /// i.e. they have the same cell size
    /// and their corners are a whole number of cells apart.
    pub fn is_aligned(&self, other: &Mesh) -> bool {
        if !(0..3).all(|a| approx_eq(self.cell[a], other.cell[a])) {
            return false;
        }
        [
            self.region.pmin() - other.region.pmin(),
            self.region.pmax() - other.region.pmax(),
        ]
        .iter()
        .all(|diff| (0..3).all(|a| is_multiple_of(diff[a], self.cell[a])))
    }

    /// Build the finite-difference derivative operator along an axis.
    ///
    /// See [`DerivativeOperator`][crate::DerivativeOperator] for the stencil.
    pub fn derivative_operator(&self, axis: Axis) -> crate::DerivativeOperator {
        crate::DerivativeOperator::new(self, axis)
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.region == other.region && self.n == other.n
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh(region={}, n=({}, {}, {}), bc='{}', subregions=[{}])",
            self.region,
            self.n[0],
            self.n[1],
            self.n[2],
            self.bc,
            self.subregions.iter().map(|(name, _)| name).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn index_point_round_trip() {
        let mesh = Mesh::with_cell(
            Vec3::new(-5e-9, 0., 2e-9),
            Vec3::new(5e-9, 4e-9, -2e-9),
            Vec3::new(1e-9, 2e-9, 0.5e-9),
        )
        .unwrap();
        assert_eq!(mesh.n(), [10, 2, 8]);
        for index in mesh.indices() {
            let point = mesh.index_to_point(index).unwrap();
            assert_eq!(mesh.point_to_index(&point).unwrap(), index);
        }
        approx::assert_relative_eq!(
            mesh.index_to_point([0, 0, 0]).unwrap(),
            Vec3::new(-4.5e-9, 1e-9, -1.75e-9),
            max_relative = 1e-12,
        );
    }

    #[test]
    fn out_of_range_lookups() {
        let mesh = tiny_mesh();
        let err = mesh.index_to_point([5, 0, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = mesh.point_to_index(&Vec3::new(11., 0., 0.)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = mesh.neighbours([0, 0, 7]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn boundary_points_snap_into_mesh() {
        let mesh = tiny_mesh();
        assert_eq!(mesh.point_to_index(&Vec3::zeros()).unwrap(), [0, 0, 0]);
        assert_eq!(
            mesh.point_to_index(&Vec3::new(10., 10., 10.)).unwrap(),
            [4, 4, 4]
        );
    }

    #[test]
    fn linear_indices_follow_enumeration() {
        let mesh = Mesh::with_n(Vec3::zeros(), Vec3::new(3., 2., 2.), [3, 2, 2]).unwrap();
        for (linear, index) in mesh.indices().enumerate() {
            assert_eq!(mesh.linear_index(index), linear);
            assert_eq!(mesh.cell_index(linear), index);
        }
        let first: Vec<_> = mesh.indices().take(4).collect();
        assert_eq!(first, vec![[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0]]);
        // out of range cells are only reachable through checked accessors
        assert_eq!(mesh.index_to_point([3, 0, 0]).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(mesh.indices().count(), mesh.len());
    }

    #[test]
    fn neighbours_open() {
        let mesh = Mesh::with_n(Vec3::zeros(), Vec3::new(3., 3., 1.), [3, 3, 1]).unwrap();
        assert_eq!(
            mesh.neighbours([1, 1, 0]).unwrap(),
            vec![[0, 1, 0], [2, 1, 0], [1, 0, 0], [1, 2, 0]]
        );
        assert_eq!(
            mesh.neighbours([0, 0, 0]).unwrap(),
            vec![[1, 0, 0], [0, 1, 0]]
        );
    }

    #[test]
    fn neighbours_periodic() {
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(4., 3., 1.))
            .n([4, 3, 1])
            .bc("xyz".parse().unwrap())
            .build()
            .unwrap();
        // wraps to n - 1 on every periodic axis with more than one cell,
        // but never along the single-cell z axis
        assert_eq!(
            mesh.neighbours([0, 0, 0]).unwrap(),
            vec![[3, 0, 0], [1, 0, 0], [0, 2, 0], [0, 1, 0]]
        );
        assert_eq!(
            mesh.neighbours([3, 2, 0]).unwrap(),
            vec![[2, 2, 0], [0, 2, 0], [3, 1, 0], [3, 0, 0]]
        );

        // with two cells both directions give the same neighbour
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(2., 2., 1.))
            .n([2, 2, 1])
            .bc(BoundaryCondition::periodic(&[Axis::X]))
            .build()
            .unwrap();
        assert_eq!(
            mesh.neighbours([0, 0, 0]).unwrap(),
            vec![[1, 0, 0], [0, 1, 0]]
        );
    }

    #[test]
    fn boundary_condition_strings() {
        for s in ["", "x", "yz", "XYZ", "neumann", "dirichlet"] {
            let bc: BoundaryCondition = s.parse().unwrap();
            assert_eq!(bc.to_string(), s.to_lowercase());
        }
        let err = "xw".parse::<BoundaryCondition>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn plane_through_centre() {
        let mesh = tiny_mesh();
        let plane = mesh.plane(Axis::X, None).unwrap();
        assert_eq!(plane.n(), [1, 5, 5]);
        assert_eq!(plane.cell(), mesh.cell());
        let info = plane.plane_info().unwrap();
        assert_eq!(info.plane_axis, Axis::X);
        assert_eq!((info.axis1, info.axis2), (Axis::Y, Axis::Z));
        assert_eq!(info.point, 5.);
        assert_eq!(plane.region().pmin(), Vec3::new(4., 0., 0.));
        assert_eq!(plane.region().pmax(), Vec3::new(6., 10., 10.));

        let resampled = mesh.plane(Axis::Y, Some([2, 10])).unwrap();
        assert_eq!(resampled.n(), [2, 1, 10]);
        assert_eq!(resampled.cell(), Vec3::new(5., 2., 1.));
    }

    #[test]
    fn plane_outside_region_fails() {
        let mesh = tiny_mesh();
        let err = mesh.plane(PlaneSpec::At(Axis::Z, 11.), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = "z=1=2".parse::<PlaneSpec>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = "w".parse::<PlaneSpec>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn subregion_meshes() {
        let sub = Region::new(Vec3::zeros(), Vec3::new(4., 10., 10.)).unwrap();
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
            .cell(Vec3::new(2., 2., 2.))
            .subregion("left", sub)
            .build()
            .unwrap();
        let sub_mesh = mesh.subregion_mesh("left").unwrap();
        assert_eq!(sub_mesh.n(), [2, 5, 5]);
        assert_eq!(sub_mesh.cell(), mesh.cell());
        assert_eq!(
            mesh.subregion_mesh("right").unwrap_err().kind(),
            ErrorKind::Range
        );
    }

    #[test]
    fn covering_mesh_snaps_to_cells() {
        let mesh = tiny_mesh();
        let region = Region::new(Vec3::new(1.5, 0.2, 3.), Vec3::new(6.5, 1., 9.9)).unwrap();
        let covering = mesh.covering_mesh(&region).unwrap();
        assert_eq!(covering.region().pmin(), Vec3::new(0., 0., 2.));
        assert_eq!(covering.region().pmax(), Vec3::new(8., 2., 10.));
        assert_eq!(covering.n(), [4, 1, 4]);
        assert!(covering.is_aligned(&mesh));

        // faces on cell boundaries add no extra cells
        let aligned = Region::new(Vec3::new(2., 2., 2.), Vec3::new(6., 6., 6.)).unwrap();
        let covering = mesh.covering_mesh(&aligned).unwrap();
        assert_eq!(covering.n(), [2, 2, 2]);
        assert_eq!(covering.region(), &aligned);
        let nearly = Region::new(Vec3::new(2. + 1e-14, 0., 0.), Vec3::new(6. - 1e-14, 10., 4.)).unwrap();
        assert_eq!(mesh.covering_mesh(&nearly).unwrap().n(), [2, 5, 2]);
        assert_eq!(mesh.covering_mesh(mesh.region()).unwrap(), mesh);

        let outside = Region::new(Vec3::new(1., 1., 1.), Vec3::new(11., 2., 2.)).unwrap();
        assert_eq!(
            mesh.covering_mesh(&outside).unwrap_err().kind(),
            ErrorKind::Range
        );
    }

    #[test]
    fn padding() {
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
            .cell(Vec3::new(1., 1., 1.))
            .bc("x".parse().unwrap())
            .build()
            .unwrap();
        let padded = mesh.pad(&[(Axis::X, (1, 1)), (Axis::Z, (0, 2))]).unwrap();
        assert_eq!(padded.region().pmin(), Vec3::new(-1., 0., 0.));
        assert_eq!(padded.region().pmax(), Vec3::new(11., 10., 12.));
        assert_eq!(padded.n(), [12, 10, 12]);
        assert_eq!(padded.bc(), mesh.bc());
    }

    #[test]
    fn equality_and_alignment() {
        let m1 = tiny_mesh();
        let m2 = Mesh::with_n(Vec3::zeros(), Vec3::new(10., 10., 10.), [5, 5, 5]).unwrap();
        let periodic = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
            .n([5, 5, 5])
            .bc("xy".parse().unwrap())
            .build()
            .unwrap();
        assert_eq!(m1, m2);
        // boundary conditions don't count
        assert_eq!(m1, periodic);
        let finer = Mesh::with_n(Vec3::zeros(), Vec3::new(10., 10., 10.), [10, 5, 5]).unwrap();
        assert_ne!(m1, finer);
        assert!(!m1.is_aligned(&finer));

        let shifted = Mesh::with_cell(
            Vec3::new(-4., 2., 0.),
            Vec3::new(6., 6., 12.),
            Vec3::new(2., 2., 2.),
        )
        .unwrap();
        assert!(m1.is_aligned(&shifted));
        let off_lattice = Mesh::with_cell(
            Vec3::new(-3., 2., 0.),
            Vec3::new(7., 6., 12.),
            Vec3::new(2., 2., 2.),
        )
        .unwrap();
        assert!(!m1.is_aligned(&off_lattice));
    }

    #[test]
    fn enumeration_helpers() {
        let mesh = tiny_mesh();
        assert_eq!(mesh.len(), 125);
        assert_eq!(mesh.dv(), 8.);
        let xs: Vec<f64> = mesh.axis_points(Axis::X).collect();
        assert_eq!(xs, vec![1., 3., 5., 7., 9.]);
        let coords: Vec<Vec3> = mesh.coordinates().take(2).collect();
        assert_eq!(coords, vec![Vec3::new(1., 1., 1.), Vec3::new(3., 1., 1.)]);

        let line: Vec<Vec3> = mesh
            .line(Vec3::zeros(), Vec3::new(5., 5., 5.), 6)
            .unwrap()
            .collect();
        assert_eq!(line.len(), 6);
        assert_eq!(line[0], Vec3::zeros());
        assert_eq!(line[5], Vec3::new(5., 5., 5.));
        assert_eq!(line[2], Vec3::new(2., 2., 2.));
        assert!(mesh.line(Vec3::zeros(), Vec3::new(11., 0., 0.), 3).is_err());
    }

    #[test]
    fn display() {
        let mesh = tiny_mesh();
        let s = mesh.to_string();
        assert!(s.starts_with("Mesh(region=Region(p1=(0, 0, 0)"), "{s}");
        assert!(s.contains("n=(5, 5, 5)"), "{s}");
    }
}
