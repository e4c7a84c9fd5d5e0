//! The error type shared by every fallible operation in the crate.

use crate::Vec3;

/// Convenience alias for results with the crate [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad category of an [`Error`].
///
/// Useful when the caller only cares about what went wrong in general terms,
/// e.g. to tell invalid input geometry apart from malformed files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Mutually exclusive or jointly required arguments were violated.
    Configuration,
    /// A geometric or mathematical invariant does not hold.
    Domain,
    /// An index or point lies outside the mesh.
    Range,
    /// A value has the wrong shape for where it was used.
    Type,
    /// External file content could not be understood.
    Parse,
    /// Reading or writing a file failed.
    Io,
}

/// Error produced by mesh and field operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Two arguments that exclude each other were both given, or neither was.
    #[error("Invalid arguments: {0}")]
    ConflictingArguments(&'static str),
    /// A boundary condition string contained something other than
    /// periodic axes, `neumann` or `dirichlet`.
    #[error("Invalid boundary condition {0:?}")]
    InvalidBoundaryCondition(String),
    /// An axis name other than `x`, `y` or `z`.
    #[error("Unknown axis {0:?}, expected one of x, y, z")]
    UnknownAxis(String),
    /// A plane specification that isn't `axis` or `axis=value`.
    #[error("Invalid plane specification {0:?}")]
    InvalidPlaneSpec(String),
    /// An OVF data representation other than `txt`, `bin4` or `bin8`.
    #[error("Unknown representation {0:?}, expected one of txt, bin4, bin8")]
    UnknownRepresentation(String),
    /// A file extension that no writer handles.
    #[error("Unsupported file extension {extension:?}. Allowed extensions are {allowed}")]
    UnsupportedExtension {
        /// The extension that was given.
        extension: String,
        /// Human readable list of supported extensions.
        allowed: &'static str,
    },

    /// A region with at least one zero-length (or non-finite) edge.
    #[error("Region between {p1:?} and {p2:?} is degenerate")]
    DegenerateRegion {
        /// First corner point.
        p1: Vec3,
        /// Second corner point.
        p2: Vec3,
    },
    /// Cell size or cell count that isn't strictly positive.
    #[error("Invalid discretisation: {0}")]
    InvalidDiscretisation(String),
    /// The region edges are not an integer multiple of the cell size.
    #[error("Region with edges {edges:?} cannot be divided into discretisation cells of size {cell:?}")]
    NotAggregate {
        /// Edge lengths of the region.
        edges: Vec3,
        /// The offending cell size.
        cell: Vec3,
    },
    /// An operation received a field of the wrong dimension.
    #[error("{operation} requires {expected} field(s), got dim={found}")]
    DimensionMismatch {
        /// Name of the operation.
        operation: &'static str,
        /// Description of the accepted dimensions.
        expected: &'static str,
        /// The dimension that was actually given.
        found: usize,
    },
    /// Two fields are not defined on the same mesh.
    #[error("Fields are defined on incompatible meshes")]
    IncompatibleMeshes,
    /// Rescaling was requested on a field whose every value is zero.
    #[error("Cannot normalise a field with zero values everywhere")]
    ZeroNorm,
    /// An operation that needs a plane mesh got a full 3D mesh.
    #[error("{0} is only defined on fields sliced with plane()")]
    NotAPlane(&'static str),

    /// A cell index outside `0..n` on some axis.
    #[error("Index {index:?} out of range for mesh with n={n:?}")]
    IndexOutOfRange {
        /// The requested index.
        index: [usize; 3],
        /// Cell counts of the mesh.
        n: [usize; 3],
    },
    /// A point outside the mesh region.
    #[error("Point {0:?} is outside the mesh region")]
    PointOutsideRegion(Vec3),
    /// A region that does not fit inside the mesh region.
    #[error("Region is outside the mesh region")]
    RegionOutsideMesh,
    /// A subregion name that the mesh doesn't know about.
    #[error("No subregion named {0:?}")]
    UnknownSubregion(String),

    /// A value specification whose shape does not match the field.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),
    /// Component access beyond the field dimension.
    #[error("Field with dim={dim} has no component {component}")]
    NoComponent {
        /// The requested component.
        component: usize,
        /// Dimension of the field.
        dim: usize,
    },
    /// Writing a field whose dimension the file format can't represent.
    #[error("Cannot write dim={0} field")]
    UnsupportedDimension(usize),

    /// Malformed file content.
    #[error("Parsing failed: {0}")]
    Parse(String),
    /// A metadata key required to rebuild the mesh is missing.
    #[error("Missing metadata key {0:?}")]
    MissingMetadata(&'static str),
    /// The first value of a binary data block wasn't the expected check value.
    #[error("Binary data check value mismatch: expected {expected}, found {found}")]
    SentinelMismatch {
        /// The check value mandated by the format.
        expected: f64,
        /// The value that was read.
        found: f64,
    },

    /// Underlying I/O failure.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    /// The VTK writer rejected the data.
    #[error("VTK export failed")]
    Vtk(#[from] vtkio::Error),
}

impl Error {
    /// Get the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            ConflictingArguments(_)
            | InvalidBoundaryCondition(_)
            | UnknownAxis(_)
            | InvalidPlaneSpec(_)
            | UnknownRepresentation(_)
            | UnsupportedExtension { .. } => ErrorKind::Configuration,
            DegenerateRegion { .. }
            | InvalidDiscretisation(_)
            | NotAggregate { .. }
            | DimensionMismatch { .. }
            | IncompatibleMeshes
            | ZeroNorm
            | NotAPlane(_) => ErrorKind::Domain,
            IndexOutOfRange { .. }
            | PointOutsideRegion(_)
            | RegionOutsideMesh
            | UnknownSubregion(_) => ErrorKind::Range,
            UnsupportedValue(_) | NoComponent { .. } | UnsupportedDimension(_) => ErrorKind::Type,
            Parse(_) | MissingMetadata(_) | SentinelMismatch { .. } => ErrorKind::Parse,
            Io(_) | Vtk(_) => ErrorKind::Io,
        }
    }
}
