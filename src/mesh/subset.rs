use fixedbitset as fb;

use super::Mesh;
use crate::{Region, Result, Vec3};

/// A subset of cells in a mesh, stored as a bit per cell
/// in the mesh's enumeration order.
///
/// Used to assign values to parts of a field,
/// e.g. with [`Value::Subregions`][crate::Value::Subregions].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSubset {
    /// A bitset containing the linear indices of cells present in the subset.
    ///
    /// Iterate over the indices with `indices.ones()`.
    pub indices: fb::FixedBitSet,
}

impl CellSubset {
    /// Create a subset of the cells whose centres satisfy a predicate.
    pub fn from_predicate(mesh: &Mesh, pred: impl Fn(Vec3) -> bool) -> Self {
        let mut indices = fb::FixedBitSet::with_capacity(mesh.len());
        for (linear, point) in mesh.coordinates().enumerate() {
            if pred(point) {
                indices.insert(linear);
            }
        }
        Self { indices }
    }

    /// Create a subset of the cells whose centres lie inside a region.
    pub fn in_region(mesh: &Mesh, region: &Region) -> Self {
        Self::from_predicate(mesh, |p| region.contains(&p))
    }

    /// Take the complement of a subset, i.e. the cells not in that subset.
    pub fn complement(&self) -> Self {
        let mut indices = self.indices.clone();
        indices.toggle_range(..);
        Self { indices }
    }

    /// Take the union (i.e. set of cells that are in one or the other)
    /// of this subset with another.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        let mut indices = self.indices.clone();
        indices.union_with(&other.indices);
        Self { indices }
    }

    /// Take the difference (i.e. set of cells that are in `self` but not in `other`)
    /// of this subset with another.
    #[inline]
    pub fn difference(&self, other: &Self) -> Self {
        let mut indices = self.indices.clone();
        indices.difference_with(&other.indices);
        Self { indices }
    }

    /// Get the number of cells in this subset.
    #[inline]
    pub fn count(&self) -> usize {
        self.indices.count_ones(..)
    }

    /// Check whether the cell with the given linear index is in this subset.
    #[inline]
    pub fn contains(&self, linear: usize) -> bool {
        self.indices.contains(linear)
    }
}

impl Mesh {
    /// The cells whose centres lie inside the named subregion.
    ///
    /// ```
    /// # use fdfield::{Mesh, Region, Vec3};
    /// let mesh = Mesh::builder()
    ///     .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
    ///     .n([5, 5, 5])
    ///     .subregion("bottom", Region::new(Vec3::zeros(), Vec3::new(10., 10., 2.))?)
    ///     .build()?;
    /// assert_eq!(mesh.subregion_cells("bottom")?.count(), 25);
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn subregion_cells(&self, name: &str) -> Result<CellSubset> {
        Ok(CellSubset::in_region(self, self.subregion(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mesh::tiny_mesh, ErrorKind};

    #[test]
    fn subregion_masks() {
        let left = Region::new(Vec3::zeros(), Vec3::new(4., 10., 10.)).unwrap();
        // extends past the mesh, which is allowed
        let top = Region::new(Vec3::new(-5., -5., 8.), Vec3::new(15., 15., 20.)).unwrap();
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
            .cell(Vec3::new(2., 2., 2.))
            .subregion("left", left)
            .subregion("top", top)
            .build()
            .unwrap();

        let left = mesh.subregion_cells("left").unwrap();
        assert_eq!(left.count(), 50);
        for (linear, index) in mesh.indices().enumerate() {
            assert_eq!(left.contains(linear), index[0] < 2);
        }

        let top = mesh.subregion_cells("top").unwrap();
        assert_eq!(top.count(), 25);
        assert_eq!(left.union(&top).count(), 65);
        assert_eq!(left.difference(&top).count(), 40);
        assert_eq!(left.complement().count(), 75);

        let err = mesh.subregion_cells("right").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn predicate_subsets() {
        let mesh = tiny_mesh();
        let all = CellSubset::from_predicate(&mesh, |_| true);
        assert_eq!(all.count(), mesh.len());
        assert_eq!(all.complement().count(), 0);
        let diagonal = CellSubset::from_predicate(&mesh, |p| p.x == p.y && p.y == p.z);
        itertools::assert_equal(diagonal.indices.ones(), [0, 31, 62, 93, 124]);
    }
}
