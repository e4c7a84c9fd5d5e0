use crate::{Axis, Mesh};

/// The cell element an integral is taken over.
///
/// [`Field::integral`][crate::Field::integral] uses [`Measure::Volume`].
/// The other measures turn the same sum into a line or surface integral,
/// e.g. the flux of a vector field through a plane mesh:
/// ```
/// # use fdfield::{Axis, Field, Measure, mesh::tiny_mesh};
/// let f = Field::new(tiny_mesh(), 3, [0., 0., 2.])?.plane(Axis::Z, None)?;
/// // 10 x 10 plane
/// assert_eq!(f.integral_with(Measure::Face(Axis::Z))[2], 200.);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    /// `dV`, the volume of a cell.
    Volume,
    /// `dx`, `dy` or `dz`, the edge length of a cell along an axis.
    Edge(Axis),
    /// The area of the cell face normal to an axis,
    /// e.g. `dx dy` for [`Axis::Z`].
    Face(Axis),
}

impl Measure {
    /// Size of the element in one cell of `mesh`.
    pub fn element(self, mesh: &Mesh) -> f64 {
        let cell = mesh.cell();
        match self {
            Measure::Volume => mesh.dv(),
            Measure::Edge(axis) => cell[axis.index()],
            Measure::Face(normal) => {
                let (a1, a2) = normal.others();
                cell[a1.index()] * cell[a2.index()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn elements_follow_cell_size() {
        let mesh = Mesh::with_cell(Vec3::zeros(), Vec3::new(4., 6., 10.), Vec3::new(1., 2., 5.)).unwrap();
        assert_eq!(Measure::Volume.element(&mesh), 10.);
        assert_eq!(Measure::Edge(Axis::X).element(&mesh), 1.);
        assert_eq!(Measure::Edge(Axis::Z).element(&mesh), 5.);
        assert_eq!(Measure::Face(Axis::X).element(&mesh), 10.);
        assert_eq!(Measure::Face(Axis::Z).element(&mesh), 2.);
    }
}
