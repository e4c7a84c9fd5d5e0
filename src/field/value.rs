use fixedbitset as fb;
use nalgebra as na;

use crate::{Error, Mesh, Result, Vec3};

/// A description of the values of a [`Field`][crate::Field].
///
/// Values are resolved into dense storage once,
/// when the field is created or [set][crate::Field::set_value].
/// Most variants can be created with `into()` from plain values:
/// ```
/// # use fdfield::{Field, Value, Vec3, mesh::tiny_mesh};
/// # let mesh = std::rc::Rc::new(tiny_mesh());
/// let scalar = Field::new(mesh.clone(), 1, 2.5)?;
/// let vector = Field::new(mesh.clone(), 3, [0., 0., 1.])?;
/// let position = Field::new(mesh.clone(), 3, Value::vector_function(|p| p))?;
/// assert_eq!(position.eval(&Vec3::new(3., 3., 3.))?.as_slice(), &[3., 3., 3.]);
/// # Ok::<(), fdfield::Error>(())
/// ```
pub enum Value<'a> {
    /// The same number in every component of every cell.
    ///
    /// Only allowed for scalar fields, or when the number is zero.
    Constant(f64),
    /// The same vector in every cell.
    Uniform(Vec<f64>),
    /// Explicit values with one row per cell in enumeration order
    /// and one column per component.
    Array(na::DMatrix<f64>),
    /// A function evaluated once at the centre of every cell.
    Function(Box<dyn Fn(Vec3) -> Vec<f64> + 'a>),
    /// Uniform vectors per named mesh subregion.
    ///
    /// Each cell takes the value of the first subregion that contains its centre.
    /// Cells outside every subregion keep their previous value.
    Subregions(Vec<(String, Vec<f64>)>),
}

impl<'a> Value<'a> {
    /// A function returning every component of a cell's value.
    pub fn function(f: impl Fn(Vec3) -> Vec<f64> + 'a) -> Self {
        Self::Function(Box::new(f))
    }

    /// A function for scalar fields.
    pub fn scalar_function(f: impl Fn(Vec3) -> f64 + 'a) -> Self {
        Self::Function(Box::new(move |p| vec![f(p)]))
    }

    /// A function for three-dimensional vector fields.
    pub fn vector_function(f: impl Fn(Vec3) -> Vec3 + 'a) -> Self {
        Self::Function(Box::new(move |p| {
            let v = f(p);
            vec![v.x, v.y, v.z]
        }))
    }

    /// Uniform values per named subregion.
    pub fn subregions(
        values: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<f64>>)>,
    ) -> Self {
        Self::Subregions(
            values
                .into_iter()
                .map(|(name, v)| (name.into(), v.into()))
                .collect(),
        )
    }

    /// Turn this description into a `len(mesh) x dim` matrix.
    ///
    /// `previous` gives the values that cells not covered by
    /// [`Subregions`][Self::Subregions] keep; zero if not given.
    pub(crate) fn resolve(
        self,
        mesh: &Mesh,
        dim: usize,
        previous: Option<na::DMatrix<f64>>,
    ) -> Result<na::DMatrix<f64>> {
        let len = mesh.len();
        match self {
            Value::Constant(c) => {
                if dim != 1 && c != 0. {
                    return Err(Error::UnsupportedValue(format!(
                        "constant {c} for a field with dim={dim}, use a vector instead"
                    )));
                }
                Ok(na::DMatrix::from_element(len, dim, c))
            }
            Value::Uniform(v) => {
                check_len(&v, dim)?;
                Ok(na::DMatrix::from_fn(len, dim, |_, j| v[j]))
            }
            Value::Array(m) => {
                if m.shape() != (len, dim) {
                    return Err(Error::UnsupportedValue(format!(
                        "array of shape {:?} where ({len}, {dim}) was expected",
                        m.shape()
                    )));
                }
                Ok(m)
            }
            Value::Function(f) => {
                let mut values = na::DMatrix::zeros(len, dim);
                for (mut row, point) in values.row_iter_mut().zip(mesh.coordinates()) {
                    let v = f(point);
                    check_len(&v, dim)?;
                    row.copy_from_slice(&v);
                }
                Ok(values)
            }
            Value::Subregions(entries) => {
                let mut values = match previous {
                    Some(prev) if prev.shape() == (len, dim) => prev,
                    _ => na::DMatrix::zeros(len, dim),
                };
                let mut assigned = fb::FixedBitSet::with_capacity(len);
                for (name, v) in entries {
                    check_len(&v, dim)?;
                    let mut cells = mesh.subregion_cells(&name)?.indices;
                    // first match wins
                    cells.difference_with(&assigned);
                    for linear in cells.ones() {
                        values.row_mut(linear).copy_from_slice(&v);
                    }
                    assigned.union_with(&cells);
                }
                Ok(values)
            }
        }
    }
}

fn check_len(v: &[f64], dim: usize) -> Result<()> {
    if v.len() != dim {
        return Err(Error::UnsupportedValue(format!(
            "value with {} components for a field with dim={dim}",
            v.len()
        )));
    }
    Ok(())
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            Self::Uniform(v) => f.debug_tuple("Uniform").field(v).finish(),
            Self::Array(m) => f.debug_tuple("Array").field(&m.shape()).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Subregions(s) => f.debug_tuple("Subregions").field(s).finish(),
        }
    }
}

// conversions from plain values

impl From<f64> for Value<'_> {
    fn from(c: f64) -> Self {
        Self::Constant(c)
    }
}

impl<const N: usize> From<[f64; N]> for Value<'_> {
    fn from(v: [f64; N]) -> Self {
        Self::Uniform(v.to_vec())
    }
}

impl From<&[f64]> for Value<'_> {
    fn from(v: &[f64]) -> Self {
        Self::Uniform(v.to_vec())
    }
}

impl From<Vec<f64>> for Value<'_> {
    fn from(v: Vec<f64>) -> Self {
        Self::Uniform(v)
    }
}

impl From<Vec3> for Value<'_> {
    fn from(v: Vec3) -> Self {
        Self::Uniform(vec![v.x, v.y, v.z])
    }
}

impl From<na::DMatrix<f64>> for Value<'_> {
    fn from(m: na::DMatrix<f64>) -> Self {
        Self::Array(m)
    }
}
