//! Iterators over cells and points of a mesh.
//!
//! All of these are cheap to clone
//! and a clone restarts from the current position.

use super::{Axis, Mesh};
use crate::Vec3;

/// Iterator over all cell indices of a mesh,
/// with x varying fastest, then y, then z.
#[derive(Clone, Debug)]
pub struct Indices {
    n: [usize; 3],
    position: usize,
    len: usize,
}

impl Indices {
    pub(super) fn new(n: [usize; 3]) -> Self {
        Self {
            n,
            position: 0,
            len: n.iter().product(),
        }
    }
}

impl Iterator for Indices {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.len {
            return None;
        }
        let [nx, ny, _] = self.n;
        let p = self.position;
        self.position += 1;
        Some([p % nx, (p / nx) % ny, p / (nx * ny)])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Indices {}

/// Iterator over the centre points of all cells of a mesh,
/// in the same order as [`Indices`].
#[derive(Clone, Debug)]
pub struct Coordinates<'a> {
    mesh: &'a Mesh,
    indices: Indices,
}

impl<'a> Coordinates<'a> {
    pub(super) fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            indices: mesh.indices(),
        }
    }
}

impl<'a> Iterator for Coordinates<'a> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|index| self.mesh.centre_of(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a> ExactSizeIterator for Coordinates<'a> {}

/// Iterator over cell-centre coordinates along one axis of a mesh.
#[derive(Clone, Debug)]
pub struct AxisPoints {
    start: f64,
    step: f64,
    position: usize,
    len: usize,
}

impl AxisPoints {
    pub(super) fn new(mesh: &Mesh, axis: Axis) -> Self {
        let a = axis.index();
        Self {
            start: mesh.region().pmin()[a] + mesh.cell()[a] / 2.,
            step: mesh.cell()[a],
            position: 0,
            len: mesh.n()[a],
        }
    }
}

impl Iterator for AxisPoints {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.len {
            return None;
        }
        let ret = self.start + self.position as f64 * self.step;
        self.position += 1;
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AxisPoints {}

/// Iterator over evenly spaced points on a line segment, both ends included.
///
/// A single-point line yields only the start point.
#[derive(Clone, Debug)]
pub struct LinePoints {
    p1: Vec3,
    p2: Vec3,
    step: Vec3,
    position: usize,
    len: usize,
}

impl LinePoints {
    pub(crate) fn new(p1: Vec3, p2: Vec3, n: usize) -> Self {
        let step = if n > 1 {
            (p2 - p1) / (n - 1) as f64
        } else {
            Vec3::zeros()
        };
        Self {
            p1,
            p2,
            step,
            position: 0,
            len: n,
        }
    }
}

impl Iterator for LinePoints {
    type Item = Vec3;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.len {
            return None;
        }
        let ret = if self.position > 0 && self.position + 1 == self.len {
            // exactly the end point, free of accumulated rounding
            self.p2
        } else {
            self.p1 + self.position as f64 * self.step
        };
        self.position += 1;
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LinePoints {}
