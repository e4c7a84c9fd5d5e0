//! `std::ops` implementations for fields.
//!
//! Operations between two fields go through the checked methods
//! ([`checked_add`][Field::checked_add] etc.)
//! and **panic** if those return an error,
//! i.e. when the meshes differ or the dimensions can't be combined.
//! Use the checked methods directly when that isn't known in advance.
//!
//! Operations with an `f64` apply to every component of every cell.

use super::Field;

// field with field, all owned/borrowed permutations

macro_rules! impl_field_op {
    ($Trait:ident, $method:ident, $checked:ident) => {
        impl std::ops::$Trait<&Field> for &Field {
            type Output = Field;

            fn $method(self, rhs: &Field) -> Field {
                match self.$checked(rhs) {
                    Ok(res) => res,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl std::ops::$Trait<Field> for &Field {
            type Output = Field;

            fn $method(self, rhs: Field) -> Field {
                <&Field as std::ops::$Trait<&Field>>::$method(self, &rhs)
            }
        }

        impl std::ops::$Trait<&Field> for Field {
            type Output = Field;

            fn $method(self, rhs: &Field) -> Field {
                <&Field as std::ops::$Trait<&Field>>::$method(&self, rhs)
            }
        }

        impl std::ops::$Trait<Field> for Field {
            type Output = Field;

            fn $method(self, rhs: Field) -> Field {
                <&Field as std::ops::$Trait<&Field>>::$method(&self, &rhs)
            }
        }
    };
}

impl_field_op!(Add, add, checked_add);
impl_field_op!(Sub, sub, checked_sub);
impl_field_op!(Mul, mul, checked_mul);
impl_field_op!(Div, div, checked_div);

// field with scalar, on either side

macro_rules! impl_scalar_op {
    ($Trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$Trait<f64> for &Field {
            type Output = Field;

            fn $method(self, rhs: f64) -> Field {
                self.with_values(self.values.map(|v| v $op rhs))
            }
        }

        impl std::ops::$Trait<f64> for Field {
            type Output = Field;

            fn $method(mut self, rhs: f64) -> Field {
                self.values.apply(|v| *v = *v $op rhs);
                self
            }
        }

        impl std::ops::$Trait<&Field> for f64 {
            type Output = Field;

            fn $method(self, rhs: &Field) -> Field {
                rhs.with_values(rhs.values.map(|v| self $op v))
            }
        }

        impl std::ops::$Trait<Field> for f64 {
            type Output = Field;

            fn $method(self, mut rhs: Field) -> Field {
                rhs.values.apply(|v| *v = self $op *v);
                rhs
            }
        }
    };
}

impl_scalar_op!(Add, add, +);
impl_scalar_op!(Sub, sub, -);
impl_scalar_op!(Mul, mul, *);
impl_scalar_op!(Div, div, /);

// Neg

impl std::ops::Neg for Field {
    type Output = Field;

    fn neg(mut self) -> Field {
        self.values.neg_mut();
        self
    }
}

impl std::ops::Neg for &Field {
    type Output = Field;

    fn neg(self) -> Field {
        self.with_values(-&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mesh, Vec3};
    use std::rc::Rc;

    fn assert_average(f: &Field, expected: &[f64]) {
        let average = f.average();
        assert_eq!(average.len(), expected.len());
        for (a, e) in average.iter().zip(expected) {
            approx::assert_relative_eq!(a, e, max_relative = 1e-12);
        }
    }

    fn mesh(p2: Vec3, n: [usize; 3]) -> Rc<Mesh> {
        Rc::new(Mesh::with_n(Vec3::zeros(), p2, n).unwrap())
    }

    #[test]
    fn neg_and_pow() {
        let mesh = mesh(Vec3::new(10e-9, 10e-9, 10e-9), [10, 10, 10]);
        let f = Field::new(mesh.clone(), 1, 3.).unwrap();
        assert_average(&(-&f), &[-3.]);
        let f = Field::new(mesh.clone(), 3, [1., 2., -3.]).unwrap();
        assert_average(&(-f), &[-1., -2., 3.]);

        let f = Field::new(mesh.clone(), 1, 2.).unwrap();
        assert_eq!(f.powf(2.).average().as_slice(), &[4.]);
        assert_eq!(f.powf(-1.).average().as_slice(), &[0.5]);
        let f = Field::new(mesh, 3, [1., 2., -2.]).unwrap();
        assert_eq!(f.powf(2.).average().as_slice(), &[1., 4., 4.]);
        assert_eq!(f.powf(-1.).average().as_slice(), &[1., 0.5, -0.5]);
    }

    #[test]
    fn add_sub() {
        let mesh = mesh(Vec3::new(5e-9, 10e-9, -5e-9), [2, 2, 1]);
        let f1 = Field::new(mesh.clone(), 1, 1.2).unwrap();
        let f2 = Field::new(mesh.clone(), 1, -0.2).unwrap();
        assert_average(&(&f1 + &f2), &[1.]);
        assert_average(&(&f1 - &f2), &[1.4]);

        let f1 = Field::new(mesh.clone(), 3, [1., 2., 3.]).unwrap();
        let f2 = Field::new(mesh, 3, [-1., -3., -5.]).unwrap();
        assert_average(&(&f1 + &f2), &[0., -1., -2.]);
        assert_average(&(&f1 - &f2), &[2., 5., 8.]);
        assert_eq!(&f1 + &f2, &f2 + &f1);
        assert_eq!(&f1 - &f2, -(&f2 - &f1));
    }

    #[test]
    fn mul() {
        let mesh = mesh(Vec3::new(5e-9, 5e-9, 5e-9), [5, 1, 5]);
        let f1 = Field::new(mesh.clone(), 1, 1.2).unwrap();
        let f2 = Field::new(mesh.clone(), 1, -2.).unwrap();
        assert_average(&(&f1 * &f2), &[-2.4]);

        let f = Field::new(mesh.clone(), 1, 5.).unwrap();
        assert_average(&(&f * 2.), &[10.]);
        assert_average(&(3. * &f), &[15.]);

        let f1 = Field::new(mesh.clone(), 3, [1., 2., -3.]).unwrap();
        let f2 = Field::new(mesh.clone(), 3, [-1., -3., -5.]).unwrap();
        assert_average(&(&f1 * &f2), &[-1., -6., 15.]);
        assert_eq!(&f1 * &f2, &f2 * &f1);
        assert_eq!(-5. * &f2, &f2 * -5.);

        let f = Field::new(mesh, 3, [1., 2e6, 0.]).unwrap();
        assert_average(&(&f * 2.), &[2., 4e6, 0.]);
        assert_average(&(5. * f), &[5., 10e6, 0.]);
    }

    #[test]
    fn div() {
        let mesh = mesh(Vec3::new(5e-9, 5e-9, 10e-9), [5, 1, 5]);
        let f1 = Field::new(mesh.clone(), 1, 2.).unwrap();
        let f2 = Field::new(mesh.clone(), 1, -2.).unwrap();
        assert_average(&(&f1 / &f2), &[-1.]);

        let f = Field::new(mesh.clone(), 1, 5.).unwrap();
        assert_average(&(&f / 2.), &[2.5]);
        assert_average(&(10. / &f), &[2.]);

        let f1 = Field::new(mesh.clone(), 3, [1., 4., 10.]).unwrap();
        let f2 = Field::new(mesh.clone(), 3, [-1., 2., -5.]).unwrap();
        assert_average(&(&f1 / &f2), &[-1., 2., -2.]);
        assert_ne!(&f1 / &f2, &f2 / &f1);
        assert_eq!(&f1 / &f2, (&f2 / &f1).powf(-1.));

        let f = Field::new(mesh, 3, [2., 2e6, -4.]).unwrap();
        assert_average(&(&f / 2.), &[1., 1e6, -2.]);
        assert_average(&(4e6 / f), &[2e6, 2., -1e6]);
    }

    #[test]
    fn composite_expression() {
        let mesh = mesh(Vec3::new(5e-9, 5e-9, 10e-9), [2, 2, 1]);
        let f1 = Field::new(mesh.clone(), 1, 2.).unwrap();
        let f2 = Field::new(mesh, 3, [-4., 0., 1.]).unwrap();
        let (x, y, z) = (f2.x().unwrap(), f2.y().unwrap(), f2.z().unwrap());
        let res = ((&f1 / 2. + &x).powf(2.) - 2. * &f1 * 3.) / -&z - 2. * &y + 1. / z.powf(2.);
        assert!(res.values().iter().all(|v| *v == 4.));
    }

    #[test]
    #[should_panic(expected = "addition requires equal dimension")]
    fn mismatched_dimensions_panic() {
        let mesh = mesh(Vec3::new(1., 1., 1.), [1, 1, 1]);
        let f1 = Field::new(mesh.clone(), 1, 1.).unwrap();
        let f2 = Field::new(mesh, 3, [1., 1., 1.]).unwrap();
        let _ = f1 + f2;
    }
}
