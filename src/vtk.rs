//! Export of fields as legacy ASCII VTK files,
//! readable by ParaView and other VTK-based tools.
//!
//! The mesh is written as a rectilinear grid of cell corners
//! with the field as cell data named after the field.

use std::io::Write;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, Coordinates, DataArray, DataSet, ElementType, Extent,
    IOBuffer, Piece, RectilinearGridPiece, Version, Vtk,
};

use crate::{Error, Field, Result};

/// Write a scalar or three-dimensional field as a legacy VTK file.
///
/// ```
/// # use fdfield::{Field, vtk, mesh::tiny_mesh};
/// let f = Field::new(tiny_mesh(), 1, 2.)?.with_name("energy");
/// let mut bytes = Vec::new();
/// vtk::write(&f, &mut bytes)?;
/// let text = String::from_utf8(bytes).unwrap();
/// assert!(text.contains("DIMENSIONS 6 6 6"));
/// assert!(text.contains("SCALARS energy double 1"));
/// # Ok::<(), fdfield::Error>(())
/// ```
pub fn write(field: &Field, writer: &mut impl Write) -> Result<()> {
    let elem = match field.dim() {
        1 => ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        3 => ElementType::Vectors,
        dim => return Err(Error::UnsupportedDimension(dim)),
    };
    let mesh = field.mesh();
    log::debug!(
        "writing field '{}' with {} cells as VTK",
        field.name(),
        mesh.len()
    );

    let pmin = mesh.region().pmin();
    let cell = mesh.cell();
    let n = mesh.n();
    let corners = |axis: usize| {
        IOBuffer::F64(
            (0..=n[axis])
                .map(|i| pmin[axis] + i as f64 * cell[axis])
                .collect(),
        )
    };
    let extent = || Extent::Dims([n[0] as u32 + 1, n[1] as u32 + 1, n[2] as u32 + 1]);

    // one row per cell in enumeration order
    let values = field.values().transpose().as_slice().to_vec();
    let cell_data = Attribute::DataArray(DataArray {
        name: field.name().to_string(),
        elem,
        data: IOBuffer::F64(values),
    });

    let vtk = Vtk {
        version: Version { major: 3, minor: 0 },
        title: field.name().to_string(),
        byte_order: ByteOrder::BigEndian,
        file_path: None,
        data: DataSet::RectilinearGrid {
            extent: extent(),
            meta: None,
            pieces: vec![Piece::Inline(Box::new(RectilinearGridPiece {
                extent: extent(),
                coords: Coordinates {
                    x: corners(0),
                    y: corners(1),
                    z: corners(2),
                },
                data: Attributes {
                    point: Vec::new(),
                    cell: vec![cell_data],
                },
            }))],
        },
    };

    let mut text = String::new();
    vtk.write_legacy_ascii(&mut text)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}
