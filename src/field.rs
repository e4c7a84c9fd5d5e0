//! Fields, i.e. scalar or vector values assigned to every cell of a mesh.

mod value;
pub use value::Value;

mod measure;
pub use measure::Measure;

mod ops;

//

use itertools::Itertools;
use nalgebra as na;
use std::{path::Path, rc::Rc};

use crate::{ovf, vtk, Axis, Error, Mesh, PlaneSpec, Representation, Result, Vec3};

/// A finite-difference field: a `dim`-component value in every cell of a [`Mesh`].
///
/// Values are stored as a dense matrix with one row per cell
/// (in the mesh's enumeration order, x fastest)
/// and one column per component.
/// The shape of this matrix never changes after construction.
///
/// Fields share their mesh through an [`Rc`];
/// every field derived from this one refers to the same mesh.
///
/// ```
/// # use fdfield::{Field, mesh::tiny_mesh};
/// let f = Field::new(tiny_mesh(), 3, [1., 2., 2.])?;
/// assert_eq!(f.norm().average().as_slice(), &[3.]);
/// let f = f.with_norm(1.)?;
/// approx::assert_relative_eq!(f.x()?.average()[0], 1. / 3., epsilon = 1e-12);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Field {
    mesh: Rc<Mesh>,
    values: na::DMatrix<f64>,
    name: String,
}

impl Field {
    /// Create a field with `dim` components per cell.
    ///
    /// Fails with a type error if `dim` is zero
    /// or the value doesn't have the shape of the field.
    pub fn new<'a>(
        mesh: impl Into<Rc<Mesh>>,
        dim: usize,
        value: impl Into<Value<'a>>,
    ) -> Result<Self> {
        if dim == 0 {
            return Err(Error::UnsupportedValue(
                "fields must have at least one component".to_string(),
            ));
        }
        let mesh = mesh.into();
        let values = value.into().resolve(&mesh, dim, None)?;
        Ok(Self::from_parts(mesh, values, "field".to_string()))
    }

    /// Create a field filled with zeros.
    pub fn zeros(mesh: impl Into<Rc<Mesh>>, dim: usize) -> Result<Self> {
        Self::new(mesh, dim, 0.)
    }

    /// Create a field from a function of the cell centre.
    pub fn from_fn(
        mesh: impl Into<Rc<Mesh>>,
        dim: usize,
        f: impl Fn(Vec3) -> Vec<f64>,
    ) -> Result<Self> {
        Self::new(mesh, dim, Value::function(f))
    }

    #[inline]
    pub(crate) fn from_parts(mesh: Rc<Mesh>, values: na::DMatrix<f64>, name: String) -> Self {
        debug_assert_eq!(values.nrows(), mesh.len());
        Self { mesh, values, name }
    }

    /// A field on the same mesh with the given values, named like this one.
    #[inline]
    pub(crate) fn with_values(&self, values: na::DMatrix<f64>) -> Self {
        Self::from_parts(self.mesh.clone(), values, self.name.clone())
    }

    /// Set the name of the field, used as a label in output files.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rescale the field to the given norm. See [`set_norm`][Self::set_norm].
    pub fn with_norm<'a>(mut self, norm: impl Into<Value<'a>>) -> Result<Self> {
        self.set_norm(norm)?;
        Ok(self)
    }

    /// The mesh this field is defined on.
    #[inline]
    pub fn mesh(&self) -> &Rc<Mesh> {
        &self.mesh
    }

    /// Number of components per cell.
    #[inline]
    pub fn dim(&self) -> usize {
        self.values.ncols()
    }

    /// Name of the field.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying values, one row per cell and one column per component.
    #[inline]
    pub fn values(&self) -> &na::DMatrix<f64> {
        &self.values
    }

    /// Mutable access to the values.
    ///
    /// The view has a fixed shape, so the field stays consistent with its mesh.
    #[inline]
    pub fn values_mut(&mut self) -> na::DMatrixViewMut<'_, f64> {
        let shape = self.values.shape();
        self.values.view_mut((0, 0), shape)
    }

    /// Replace the values of the field.
    ///
    /// With [`Value::Subregions`], cells outside every subregion
    /// keep their current value.
    pub fn set_value<'a>(&mut self, value: impl Into<Value<'a>>) -> Result<()> {
        let dim = self.dim();
        self.values = value
            .into()
            .resolve(&self.mesh, dim, Some(self.values.clone()))?;
        Ok(())
    }

    /// The value in the cell with the given index.
    pub fn value_at(&self, index: [usize; 3]) -> Result<na::DVector<f64>> {
        self.mesh.index_to_point(index)?;
        Ok(self.row(self.mesh.linear_index(index)))
    }

    #[inline]
    fn row(&self, linear: usize) -> na::DVector<f64> {
        self.values.row(linear).transpose()
    }

    /// The value in the cell containing a point.
    pub fn eval(&self, point: &Vec3) -> Result<na::DVector<f64>> {
        let index = self.mesh.point_to_index(point)?;
        Ok(self.row(self.mesh.linear_index(index)))
    }

    //
    // norm and components
    //

    /// A scalar field of the Euclidean norm of every cell's value.
    ///
    /// This is computed anew on every call.
    pub fn norm(&self) -> Field {
        let norms = na::DMatrix::from_iterator(
            self.values.nrows(),
            1,
            self.values.row_iter().map(|row| row.norm()),
        );
        self.with_values(norms)
    }

    /// Rescale every non-zero cell to the given norm.
    ///
    /// The norm may be any value that resolves to a scalar field,
    /// e.g. a constant or a scalar function.
    /// Cells with zero value stay zero.
    /// Fails for scalar fields and for fields that are zero everywhere.
    pub fn set_norm<'a>(&mut self, norm: impl Into<Value<'a>>) -> Result<()> {
        if self.dim() == 1 {
            return Err(Error::DimensionMismatch {
                operation: "set_norm",
                expected: "dim > 1",
                found: 1,
            });
        }
        let target = norm.into().resolve(&self.mesh, 1, None)?;
        let current = self.norm().values;
        if current.iter().all(|n| *n == 0.) {
            return Err(Error::ZeroNorm);
        }
        for (mut row, current, target) in itertools::izip!(
            self.values.row_iter_mut(),
            current.iter(),
            target.iter()
        ) {
            if *current != 0. {
                row *= *target / *current;
            }
        }
        Ok(())
    }

    /// One component of the field as a scalar field.
    ///
    /// Fails with a type error for scalar fields
    /// and for components beyond the field dimension.
    pub fn component(&self, component: usize) -> Result<Field> {
        let dim = self.dim();
        if dim == 1 || component >= dim {
            return Err(Error::NoComponent { component, dim });
        }
        let column = na::DMatrix::from_iterator(
            self.values.nrows(),
            1,
            self.values.column(component).iter().copied(),
        );
        let mut ret = self.with_values(column);
        if let Some(axis) = Axis::from_index(component) {
            ret.name = format!("{}-{axis}", self.name);
        }
        Ok(ret)
    }

    /// The x component. See [`component`][Self::component].
    #[inline]
    pub fn x(&self) -> Result<Field> {
        self.component(0)
    }

    /// The y component. See [`component`][Self::component].
    #[inline]
    pub fn y(&self) -> Result<Field> {
        self.component(1)
    }

    /// The z component. See [`component`][Self::component].
    #[inline]
    pub fn z(&self) -> Result<Field> {
        self.component(2)
    }

    //
    // reductions
    //

    /// The mean value of each component over all cells.
    pub fn average(&self) -> na::DVector<f64> {
        let len = self.values.nrows() as f64;
        self.column_sums() / len
    }

    /// The volume integral of each component, i.e. `sum(value * dV)`.
    pub fn integral(&self) -> na::DVector<f64> {
        self.integral_with(Measure::Volume)
    }

    /// The integral of each component over the given [`Measure`].
    pub fn integral_with(&self, measure: Measure) -> na::DVector<f64> {
        self.column_sums() * measure.element(&self.mesh)
    }

    fn column_sums(&self) -> na::DVector<f64> {
        na::DVector::from_iterator(
            self.dim(),
            self.values.column_iter().map(|col| col.iter().sum::<f64>()),
        )
    }

    //
    // sampling
    //

    /// Iterate over `(cell centre, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec3, na::DVector<f64>)> + '_ {
        self.mesh
            .coordinates()
            .zip(self.values.row_iter())
            .map(|(point, row)| (point, row.transpose()))
    }

    /// Sample the field at `n` evenly spaced points from `p1` to `p2`.
    ///
    /// Yields `(point, value)` pairs, the value being that of the cell
    /// containing the point.
    /// Fails if either end point is outside the mesh region.
    pub fn line(
        &self,
        p1: Vec3,
        p2: Vec3,
        n: usize,
    ) -> Result<impl Iterator<Item = (Vec3, na::DVector<f64>)> + '_> {
        let points = self.mesh.line(p1, p2, n)?;
        Ok(points.map(|p| {
            let index = self.mesh.nearest_index(&p);
            (p, self.row(self.mesh.linear_index(index)))
        }))
    }

    /// Sample the field on a plane.
    ///
    /// The result is defined on [`Mesh::plane`] with the same arguments,
    /// each cell taking the value of the cell of this field containing its centre.
    ///
    /// ```
    /// # use fdfield::{Axis, Field, mesh::tiny_mesh};
    /// let f = Field::from_fn(tiny_mesh(), 1, |p| vec![p.x + p.y])?;
    /// let plane = f.plane(Axis::Z, Some([2, 2]))?;
    /// assert_eq!(plane.mesh().n(), [2, 2, 1]);
    /// // sampled from the cells with centres x, y in {3, 7}
    /// assert_eq!(plane.values().as_slice(), &[6., 10., 10., 14.]);
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn plane(&self, spec: impl Into<PlaneSpec>, n: Option<[usize; 2]>) -> Result<Field> {
        let plane_mesh = self.mesh.plane(spec, n)?;
        let mut values = na::DMatrix::zeros(plane_mesh.len(), self.dim());
        for (mut row, point) in values.row_iter_mut().zip(plane_mesh.coordinates()) {
            let index = self.mesh.nearest_index(&point);
            row.copy_from(&self.values.row(self.mesh.linear_index(index)));
        }
        Ok(Self::from_parts(
            Rc::new(plane_mesh),
            values,
            self.name.clone(),
        ))
    }

    //
    // arithmetic
    //

    /// Check that two fields are defined on the same mesh.
    pub(crate) fn check_compatible(&self, other: &Field) -> Result<()> {
        if Rc::ptr_eq(&self.mesh, &other.mesh) || *self.mesh == *other.mesh {
            Ok(())
        } else {
            Err(Error::IncompatibleMeshes)
        }
    }

    fn zip_same_dim(
        &self,
        rhs: &Field,
        operation: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Field> {
        self.check_compatible(rhs)?;
        if self.dim() != rhs.dim() {
            return Err(Error::DimensionMismatch {
                operation,
                expected: "equal dimension",
                found: rhs.dim(),
            });
        }
        Ok(self.with_values(self.values.zip_map(&rhs.values, f)))
    }

    /// Like `zip_same_dim`, but a scalar operand is applied to every component of the other.
    fn zip_broadcast(
        &self,
        rhs: &Field,
        operation: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Field> {
        self.check_compatible(rhs)?;
        let (ldim, rdim) = (self.dim(), rhs.dim());
        let dim = match (ldim, rdim) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            (_, r) => {
                return Err(Error::DimensionMismatch {
                    operation,
                    expected: "equal dimension or a scalar",
                    found: r,
                })
            }
        };
        let values = na::DMatrix::from_fn(self.values.nrows(), dim, |i, j| {
            f(
                self.values[(i, j.min(ldim - 1))],
                rhs.values[(i, j.min(rdim - 1))],
            )
        });
        Ok(self.with_values(values))
    }

    /// Componentwise sum. Both fields must have the same dimension.
    pub fn checked_add(&self, rhs: &Field) -> Result<Field> {
        self.zip_same_dim(rhs, "addition", |a, b| a + b)
    }

    /// Componentwise difference. Both fields must have the same dimension.
    pub fn checked_sub(&self, rhs: &Field) -> Result<Field> {
        self.zip_same_dim(rhs, "subtraction", |a, b| a - b)
    }

    /// Componentwise product.
    /// A scalar field multiplies every component of the other.
    pub fn checked_mul(&self, rhs: &Field) -> Result<Field> {
        self.zip_broadcast(rhs, "multiplication", |a, b| a * b)
    }

    /// Componentwise quotient.
    /// A scalar field divides (or is divided by) every component of the other.
    pub fn checked_div(&self, rhs: &Field) -> Result<Field> {
        self.zip_broadcast(rhs, "division", |a, b| a / b)
    }

    /// Raise every component to a power.
    pub fn powf(&self, exponent: f64) -> Field {
        self.with_values(self.values.map(|v| v.powf(exponent)))
    }

    //
    // derivatives
    //

    /// The finite-difference derivative along an axis.
    ///
    /// See [`DerivativeOperator`][crate::DerivativeOperator] for the stencil.
    pub fn derivative(&self, axis: Axis) -> Result<Field> {
        self.mesh.derivative_operator(axis).apply(self)
    }

    /// The gradient of a scalar field, a three-dimensional vector field.
    pub fn grad(&self) -> Result<Field> {
        self.require_dim("grad", 1, "dim=1")?;
        let parts = Axis::ALL
            .iter()
            .map(|axis| self.derivative(*axis))
            .collect::<Result<Vec<_>>>()?;
        crate::stack(&parts)
    }

    /// The divergence of a three-dimensional vector field.
    ///
    /// ```
    /// # use fdfield::{Field, mesh::tiny_mesh};
    /// let f = Field::from_fn(tiny_mesh(), 3, |p| vec![p.x * p.y, p.y * p.z, p.x * p.y * p.z])?;
    /// // div = y + z + x*y
    /// assert_eq!(f.div()?.eval(&[3., 1., 3.].into())?[0], 7.);
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn div(&self) -> Result<Field> {
        self.require_dim("div", 3, "dim=3")?;
        let [dx, dy, dz] = self.axis_derivatives()?;
        let values = na::DMatrix::from_fn(self.values.nrows(), 1, |i, _| {
            dx[(i, 0)] + dy[(i, 1)] + dz[(i, 2)]
        });
        Ok(self.with_values(values))
    }

    /// The curl of a three-dimensional vector field.
    pub fn curl(&self) -> Result<Field> {
        self.require_dim("curl", 3, "dim=3")?;
        let [dx, dy, dz] = self.axis_derivatives()?;
        let values = na::DMatrix::from_fn(self.values.nrows(), 3, |i, j| match j {
            0 => dy[(i, 2)] - dz[(i, 1)],
            1 => dz[(i, 0)] - dx[(i, 2)],
            _ => dx[(i, 1)] - dy[(i, 0)],
        });
        Ok(self.with_values(values))
    }

    /// Derivatives of every component along x, y and z.
    fn axis_derivatives(&self) -> Result<[na::DMatrix<f64>; 3]> {
        let [dx, dy, dz] = Axis::ALL;
        Ok([
            self.derivative(dx)?.values,
            self.derivative(dy)?.values,
            self.derivative(dz)?.values,
        ])
    }

    pub(crate) fn require_dim(
        &self,
        operation: &'static str,
        dim: usize,
        expected: &'static str,
    ) -> Result<()> {
        if self.dim() != dim {
            return Err(Error::DimensionMismatch {
                operation,
                expected,
                found: self.dim(),
            });
        }
        Ok(())
    }

    //
    // files
    //

    /// Write the field to a file, choosing the format by extension:
    /// `.ovf`, `.omf`, `.ohf` and `.oef` are written as OVF 2.0
    /// and `.vtk` as a legacy VTK file.
    ///
    /// `representation` and `extend_scalar` only apply to OVF files.
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        representation: Representation,
        extend_scalar: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "ovf" | "omf" | "ohf" | "oef" => {
                let mut bytes = Vec::new();
                ovf::write(self, &mut bytes, representation, extend_scalar)?;
                std::fs::write(path, bytes)?;
            }
            "vtk" => {
                let mut bytes = Vec::new();
                vtk::write(self, &mut bytes)?;
                std::fs::write(path, bytes)?;
            }
            _ => {
                return Err(Error::UnsupportedExtension {
                    extension,
                    allowed: ".ovf, .omf, .ohf, .oef, .vtk",
                })
            }
        }
        log::debug!("wrote field '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Read a field from an OVF file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Field> {
        let bytes = std::fs::read(path.as_ref())?;
        ovf::read(&bytes)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.check_compatible(other).is_ok() && self.values == other.values
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field(mesh={}, dim={}, name='{}', average=({}))",
            self.mesh,
            self.dim(),
            self.name,
            self.average().iter().join(", ")
        )
    }
}
