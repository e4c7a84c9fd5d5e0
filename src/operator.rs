//! Finite-difference operators and componentwise products of [`Field`]s.

use nalgebra as na;
use nalgebra_sparse as nas;
use std::rc::Rc;

use crate::{Axis, Error, Field, Mesh, Result};

/// The finite-difference derivative along one axis of a mesh,
/// stored as a sparse matrix acting on every component column of a field.
///
/// Along the axis, with cell size `h`:
/// - cells with a neighbour on both sides use the central difference
///   `(f[i+1] - f[i-1]) / 2h`,
/// - cells at an open edge use the one-sided difference
///   with the neighbour they have, divided by `h`,
/// - periodic axes wrap around, so every cell has both neighbours,
/// - a single cell along the axis gives a derivative of zero.
///
/// Neumann and Dirichlet boundaries are treated like open ones.
///
/// This operator is constructed from a mesh with [`Mesh::derivative_operator`].
/// ```
/// # use fdfield::{Axis, Field, mesh::tiny_mesh};
/// let mesh = tiny_mesh();
/// let d = mesh.derivative_operator(Axis::X);
/// let f = Field::from_fn(mesh, 1, |p| vec![p.x * p.x])?;
/// // exact for quadratics away from the edges
/// assert_eq!(d.apply(&f)?.value_at([2, 0, 0])?[0], 10.);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct DerivativeOperator {
    axis: Axis,
    mat: nas::CsrMatrix<f64>,
}

impl DerivativeOperator {
    /// Constructor exposed to crate only, used in `Mesh::derivative_operator`.
    pub(crate) fn new(mesh: &Mesh, axis: Axis) -> Self {
        let len = mesh.len();
        let a = axis.index();
        let h = mesh.cell()[a];
        let mut coo = nas::CooMatrix::new(len, len);

        // a lone cell along the axis has no neighbours even with periodic wrapping,
        // leaving the matrix empty
        if mesh.n()[a] > 1 {
            for linear in 0..len {
                let index = mesh.cell_index(linear);
                let neighbour = |i: usize| {
                    let mut index = index;
                    index[a] = i;
                    mesh.linear_index(index)
                };
                match (
                    mesh.step_below(index[a], axis),
                    mesh.step_above(index[a], axis),
                ) {
                    (Some(below), Some(above)) => {
                        // with two periodic cells these coincide and cancel out
                        coo.push(linear, neighbour(above), 0.5 / h);
                        coo.push(linear, neighbour(below), -0.5 / h);
                    }
                    (None, Some(above)) => {
                        coo.push(linear, neighbour(above), 1. / h);
                        coo.push(linear, linear, -1. / h);
                    }
                    (Some(below), None) => {
                        coo.push(linear, linear, 1. / h);
                        coo.push(linear, neighbour(below), -1. / h);
                    }
                    (None, None) => {}
                }
            }
        }

        log::trace!("built derivative operator along {axis} for {len} cells");
        Self {
            axis,
            mat: nas::CsrMatrix::from(&coo),
        }
    }

    /// The axis this operator differentiates along.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The underlying matrix, mapping a column of cell values
    /// to a column of derivatives.
    #[inline]
    pub fn matrix(&self) -> &nas::CsrMatrix<f64> {
        &self.mat
    }

    /// Convert this operator into its CSR matrix,
    /// e.g. for composing it with others.
    pub fn into_csr(self) -> nas::CsrMatrix<f64> {
        self.mat
    }

    /// Differentiate every component of a field.
    ///
    /// Fails if the field's mesh has a different number of cells
    /// than the mesh this operator was built for.
    pub fn apply(&self, field: &Field) -> Result<Field> {
        if self.mat.ncols() != field.values().nrows() {
            return Err(Error::IncompatibleMeshes);
        }
        Ok(field.with_values(&self.mat * field.values()))
    }
}

impl PartialEq for DerivativeOperator {
    fn eq(&self, other: &Self) -> bool {
        self.axis == other.axis && self.mat == other.mat
    }
}

//
// products
//

fn check_vector_pair(operation: &'static str, f1: &Field, f2: &Field) -> Result<()> {
    f1.require_dim(operation, 3, "dim=3")?;
    f2.require_dim(operation, 3, "dim=3")?;
    f1.check_compatible(f2)
}

/// The dot product of two three-dimensional vector fields, a scalar field.
///
/// ```
/// # use fdfield::{dot, Field, mesh::tiny_mesh};
/// # let mesh = std::rc::Rc::new(tiny_mesh());
/// let f1 = Field::new(mesh.clone(), 3, [1., 3., 6.])?;
/// let f2 = Field::new(mesh, 3, [-1., -2., 2.])?;
/// assert_eq!(dot(&f1, &f2)?.average().as_slice(), &[5.]);
/// # Ok::<(), fdfield::Error>(())
/// ```
pub fn dot(f1: &Field, f2: &Field) -> Result<Field> {
    check_vector_pair("dot product", f1, f2)?;
    let values = na::DMatrix::from_iterator(
        f1.values().nrows(),
        1,
        f1.values()
            .row_iter()
            .zip(f2.values().row_iter())
            .map(|(a, b)| a.dot(&b)),
    );
    Ok(f1.with_values(values))
}

/// The cross product of two three-dimensional vector fields.
pub fn cross(f1: &Field, f2: &Field) -> Result<Field> {
    check_vector_pair("cross product", f1, f2)?;
    let mut values = na::DMatrix::zeros(f1.values().nrows(), 3);
    for (mut row, a, b) in itertools::izip!(
        values.row_iter_mut(),
        f1.values().row_iter(),
        f2.values().row_iter()
    ) {
        row[0] = a[1] * b[2] - a[2] * b[1];
        row[1] = a[2] * b[0] - a[0] * b[2];
        row[2] = a[0] * b[1] - a[1] * b[0];
    }
    Ok(f1.with_values(values))
}

/// Combine scalar fields into one vector field,
/// the `i`th field becoming the `i`th component.
///
/// Every field must be scalar and defined on the same mesh as the first.
/// ```
/// # use fdfield::{stack, Field, mesh::tiny_mesh};
/// # let mesh = std::rc::Rc::new(tiny_mesh());
/// let parts = [1., 5., -3.].map(|v| Field::new(mesh.clone(), 1, v).unwrap());
/// let f = stack(&parts)?;
/// assert_eq!(f.dim(), 3);
/// assert_eq!(f.y()?, parts[1]);
/// # Ok::<(), fdfield::Error>(())
/// ```
pub fn stack(fields: &[Field]) -> Result<Field> {
    let Some(first) = fields.first() else {
        return Err(Error::UnsupportedValue(
            "cannot stack an empty list of fields".to_string(),
        ));
    };
    for f in fields {
        f.require_dim("stack", 1, "dim=1")?;
        first.check_compatible(f)?;
    }
    let values = na::DMatrix::from_fn(first.values().nrows(), fields.len(), |i, j| {
        fields[j].values()[(i, 0)]
    });
    Ok(Field::from_parts(
        Rc::clone(first.mesh()),
        values,
        first.name().to_string(),
    ))
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mesh::tiny_mesh, BoundaryCondition, ErrorKind, Vec3};

    fn line_mesh(n: usize, bc: BoundaryCondition) -> Mesh {
        Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(n as f64, 1., 1.))
            .n([n, 1, 1])
            .bc(bc)
            .build()
            .unwrap()
    }

    #[test]
    fn stencil_on_open_and_periodic_lines() {
        let values = [1., 4., 9., 16.];
        let column = |mesh: &Mesh| {
            let f = Field::new(
                mesh.clone(),
                1,
                na::DMatrix::from_column_slice(4, 1, &values),
            )
            .unwrap();
            f.derivative(Axis::X).unwrap().values().as_slice().to_vec()
        };

        let open = line_mesh(4, BoundaryCondition::Open);
        assert_eq!(column(&open), vec![3., 4., 6., 7.]);
        // Neumann and Dirichlet are treated as open
        let neumann = line_mesh(4, BoundaryCondition::Neumann);
        assert_eq!(column(&neumann), vec![3., 4., 6., 7.]);

        let periodic = line_mesh(4, BoundaryCondition::periodic(&[Axis::X]));
        assert_eq!(column(&periodic), vec![-6., 4., 6., -4.]);
    }

    #[test]
    fn matrix_structure() {
        let d = line_mesh(3, BoundaryCondition::Open).derivative_operator(Axis::X);
        assert_eq!(d.axis(), Axis::X);
        #[rustfmt::skip]
        let expected = na::DMatrix::from_row_slice(3, 3, &[
            -1.0, 1.0, 0.0,
            -0.5, 0.0, 0.5,
            0.0, -1.0, 1.0,
        ]);
        assert_eq!(na::DMatrix::from(d.matrix()), expected);

        // nothing to differentiate along the other axes
        let d = line_mesh(3, BoundaryCondition::Open).derivative_operator(Axis::Y);
        assert_eq!(d.into_csr().nnz(), 0);
    }

    #[test]
    fn two_periodic_cells_cancel() {
        let mesh = line_mesh(2, BoundaryCondition::periodic(&[Axis::X]));
        let f = Field::from_fn(mesh, 1, |p| vec![p.x * 3.]).unwrap();
        let d = f.derivative(Axis::X).unwrap();
        assert!(d.values().iter().all(|v| *v == 0.));
    }

    #[test]
    fn derivative_of_constant_vanishes() {
        let mesh = Mesh::builder()
            .points(Vec3::zeros(), Vec3::new(10., 10., 10.))
            .cell(Vec3::new(2., 2., 2.))
            .bc("xy".parse().unwrap())
            .build()
            .unwrap();
        let f = Field::new(mesh, 3, [1., -2., 5.]).unwrap();
        for axis in Axis::ALL {
            let d = f.derivative(axis).unwrap();
            assert_eq!(d.dim(), 3);
            assert!(d.values().iter().all(|v| *v == 0.));
        }
    }

    #[test]
    fn apply_checks_mesh_size() {
        let d = line_mesh(3, BoundaryCondition::Open).derivative_operator(Axis::X);
        let f = Field::new(tiny_mesh(), 1, 1.).unwrap();
        assert_eq!(d.apply(&f).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(
            tiny_mesh().derivative_operator(Axis::Z),
            tiny_mesh().derivative_operator(Axis::Z)
        );
    }

    #[test]
    fn dot_and_cross() {
        let mesh = Rc::new(tiny_mesh());
        let f1 = Field::new(mesh.clone(), 3, [1., 0., 0.]).unwrap();
        let f2 = Field::new(mesh.clone(), 3, [0., 1., 0.]).unwrap();
        assert_eq!(cross(&f1, &f2).unwrap().average().as_slice(), &[0., 0., 1.]);
        assert_eq!(cross(&f2, &f1).unwrap().average().as_slice(), &[0., 0., -1.]);
        assert_eq!(dot(&f1, &f2).unwrap().average().as_slice(), &[0.]);

        let f = Field::from_fn(mesh.clone(), 3, |p| vec![p.x, p.y, p.z]).unwrap();
        let self_dot = dot(&f, &f).unwrap();
        for (point, value) in self_dot.iter() {
            assert_eq!(value[0], point.norm_squared());
        }
        assert!(cross(&f, &f).unwrap().values().iter().all(|v| *v == 0.));

        let scalar = Field::new(mesh, 1, 1.).unwrap();
        assert_eq!(dot(&f, &scalar).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(cross(&scalar, &f).unwrap_err().kind(), ErrorKind::Domain);
        let elsewhere = Field::new(line_mesh(3, BoundaryCondition::Open), 3, [1., 0., 0.]).unwrap();
        assert_eq!(dot(&f, &elsewhere).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn stacking() {
        let mesh = Rc::new(tiny_mesh());
        let parts: Vec<Field> = [1., 5., -3.]
            .into_iter()
            .map(|v| Field::new(mesh.clone(), 1, v).unwrap())
            .collect();
        let f = stack(&parts).unwrap();
        assert_eq!(f.dim(), 3);
        assert_eq!(f.x().unwrap(), parts[0]);
        assert_eq!(f.z().unwrap(), parts[2]);
        assert!(Rc::ptr_eq(f.mesh(), &mesh));

        let two = stack(&parts[..2]).unwrap();
        assert_eq!(two.average().as_slice(), &[1., 5.]);

        assert_eq!(stack(&[]).unwrap_err().kind(), ErrorKind::Type);
        let with_vector = [parts[0].clone(), f];
        assert_eq!(stack(&with_vector).unwrap_err().kind(), ErrorKind::Domain);
    }
}
