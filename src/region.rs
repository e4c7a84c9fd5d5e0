//! Axis-aligned boxes in 3D space.

use crate::{approx_eq, Error, Result, Vec3};

/// An axis-aligned box spanning between two corner points.
///
/// The corners are kept as given,
/// but most operations work with the sorted corners
/// [`pmin`][Self::pmin] and [`pmax`][Self::pmax].
///
/// ```
/// # use fdfield::{Region, Vec3};
/// let region = Region::new(Vec3::new(0., 10., 0.), Vec3::new(5., 0., 2.))?;
/// assert_eq!(region.pmin(), Vec3::new(0., 0., 0.));
/// assert_eq!(region.edges(), Vec3::new(5., 10., 2.));
/// assert_eq!(region.volume(), 100.);
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Region {
    p1: Vec3,
    p2: Vec3,
    pmin: Vec3,
    pmax: Vec3,
}

impl Region {
    /// Create a region between two opposite corners.
    ///
    /// Fails if the corners share a coordinate on any axis
    /// (the region would have zero volume)
    /// or if any coordinate is not finite.
    pub fn new(p1: Vec3, p2: Vec3) -> Result<Self> {
        let pmin = p1.inf(&p2);
        let pmax = p1.sup(&p2);
        let degenerate = p1.iter().chain(p2.iter()).any(|c| !c.is_finite())
            || (pmax - pmin).iter().any(|edge| *edge == 0.);
        if degenerate {
            return Err(Error::DegenerateRegion { p1, p2 });
        }
        Ok(Self { p1, p2, pmin, pmax })
    }

    /// Region from corners already known to be sorted and distinct.
    pub(crate) fn from_sorted(pmin: Vec3, pmax: Vec3) -> Self {
        debug_assert!((0..3).all(|axis| pmin[axis] < pmax[axis]));
        Self {
            p1: pmin,
            p2: pmax,
            pmin,
            pmax,
        }
    }

    /// The first corner point as given at construction.
    #[inline]
    pub fn p1(&self) -> Vec3 {
        self.p1
    }

    /// The second corner point as given at construction.
    #[inline]
    pub fn p2(&self) -> Vec3 {
        self.p2
    }

    /// The corner with the smallest coordinates.
    #[inline]
    pub fn pmin(&self) -> Vec3 {
        self.pmin
    }

    /// The corner with the largest coordinates.
    #[inline]
    pub fn pmax(&self) -> Vec3 {
        self.pmax
    }

    /// Edge lengths along each axis.
    #[inline]
    pub fn edges(&self) -> Vec3 {
        self.pmax - self.pmin
    }

    /// The centre point of the box.
    #[inline]
    pub fn centre(&self) -> Vec3 {
        0.5 * (self.pmin + self.pmax)
    }

    /// The volume of the box.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.edges().product()
    }

    /// Check whether a point lies inside the region or on its boundary.
    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|axis| self.pmin[axis] <= point[axis] && point[axis] <= self.pmax[axis])
    }

    /// Check whether another region lies entirely inside this one.
    pub fn contains_region(&self, other: &Region) -> bool {
        self.contains(&other.pmin) && self.contains(&other.pmax)
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        (0..3).all(|axis| {
            approx_eq(self.pmin[axis], other.pmin[axis])
                && approx_eq(self.pmax[axis], other.pmax[axis])
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Region(p1=({}, {}, {}), p2=({}, {}, {}))",
            self.p1.x, self.p1.y, self.p1.z, self.p2.x, self.p2.y, self.p2.z
        )
    }
}
