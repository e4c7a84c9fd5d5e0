//! Topological charge of magnetisation-like vector fields on plane meshes.
//!
//! All of these work on a three-dimensional field defined on a mesh
//! created with [`Mesh::plane`][crate::Mesh::plane],
//! using the unit vectors of the field
//! and the two in-plane axes of the plane.

use nalgebra as na;
use std::f64::consts::PI;

use crate::{Axis, Error, Field, Result, Vec3};

impl Field {
    /// The in-plane axes, failing if this isn't a vector field on a plane.
    fn plane_axes(&self, operation: &'static str) -> Result<(Axis, Axis)> {
        self.require_dim(operation, 3, "dim=3")?;
        let info = self
            .mesh()
            .plane_info()
            .ok_or(Error::NotAPlane(operation))?;
        Ok((info.axis1, info.axis2))
    }

    /// The field rescaled to unit length, with zero cells left at zero.
    fn unit_field(&self) -> Field {
        let mut values = self.values().clone();
        for mut row in values.row_iter_mut() {
            let norm = row.norm();
            if norm != 0. {
                row /= norm;
            }
        }
        self.with_values(values)
    }

    #[inline]
    fn row_vec(values: &na::DMatrix<f64>, linear: usize) -> Vec3 {
        Vec3::new(values[(linear, 0)], values[(linear, 1)], values[(linear, 2)])
    }

    /// The topological charge density
    /// `q = m · (∂m/∂a1 × ∂m/∂a2) / 4π`,
    /// where `m` is the unit field and `a1`, `a2` are the in-plane axes.
    ///
    /// The derivatives follow [`derivative`][Self::derivative],
    /// including its treatment of boundaries.
    pub fn topological_charge_density(&self) -> Result<Field> {
        let (axis1, axis2) = self.plane_axes("topological charge density")?;
        let unit = self.unit_field();
        let d1 = unit.derivative(axis1)?;
        let d2 = unit.derivative(axis2)?;

        let (m, d1, d2) = (unit.values(), d1.values(), d2.values());
        let density = na::DMatrix::from_fn(m.nrows(), 1, |i, _| {
            let m = Self::row_vec(m, i);
            m.dot(&Self::row_vec(d1, i).cross(&Self::row_vec(d2, i))) / (4. * PI)
        });
        Ok(self.with_values(density))
    }

    /// The topological charge, i.e. the integral of the
    /// [density][Self::topological_charge_density] over the plane.
    ///
    /// ```
    /// # use fdfield::{Axis, Field, Value, Vec3, mesh::tiny_mesh};
    /// let f = Field::new(tiny_mesh(), 3, Value::vector_function(|p| p - Vec3::new(5., 5., -1.)))?;
    /// let plane = f.plane(Axis::Z, None)?;
    /// assert!(plane.topological_charge()? > 0.);
    /// // a three-dimensional mesh has no plane to integrate over
    /// assert!(f.topological_charge().is_err());
    /// # Ok::<(), fdfield::Error>(())
    /// ```
    pub fn topological_charge(&self) -> Result<f64> {
        let (axis1, axis2) = self.plane_axes("topological charge")?;
        let density = self.topological_charge_density()?;
        let cell = self.mesh().cell();
        let sum: f64 = density.values().iter().sum();
        Ok(sum * cell[axis1.index()] * cell[axis2.index()])
    }

    /// The topological charge computed with the lattice method of Berg and Lüscher.
    ///
    /// Every plaquette of four neighbouring cells in the plane
    /// is split into two triangles, and the signed solid angles
    /// spanned by the unit vectors at the corners of each triangle are summed.
    /// Plaquettes wrapping around periodic in-plane axes are included.
    pub fn bergluescher(&self) -> Result<f64> {
        let (axis1, axis2) = self.plane_axes("Berg-Lüscher charge")?;
        let mesh = self.mesh();
        let unit = self.unit_field();
        let (a1, a2) = (axis1.index(), axis2.index());
        let n = mesh.n();

        let m = |i: usize, j: usize| {
            let mut index = [0; 3];
            index[a1] = i;
            index[a2] = j;
            Self::row_vec(unit.values(), mesh.linear_index(index))
        };

        let mut total = 0.;
        for j in 0..n[a2] {
            let Some(j_next) = mesh.step_above(j, axis2) else {
                continue;
            };
            for i in 0..n[a1] {
                let Some(i_next) = mesh.step_above(i, axis1) else {
                    continue;
                };
                let corner = m(i, j);
                let diagonal = m(i_next, j_next);
                total += solid_angle(&corner, &m(i_next, j), &diagonal);
                total += solid_angle(&corner, &diagonal, &m(i, j_next));
            }
        }
        Ok(total / (4. * PI))
    }
}

/// Signed solid angle of the spherical triangle spanned by three unit vectors.
fn solid_angle(m1: &Vec3, m2: &Vec3, m3: &Vec3) -> f64 {
    let numerator = m1.dot(&m2.cross(m3));
    let denominator = 1. + m1.dot(m2) + m2.dot(m3) + m3.dot(m1);
    2. * numerator.atan2(denominator)
}
