//! Reading and writing fields in the [OOMMF vector field format](https://math.nist.gov/oommf/doc/userguide20a3/userguide/Data_block.html)
//! (OVF 2.0, rectangular meshes only).
//!
//! The data block lists one value per cell in the mesh's enumeration order,
//! x varying fastest. Binary data is written in native byte order
//! and starts with the check value mandated by the format.
//!
//! [`Field::write`] and [`Field::from_file`] wrap these for use with paths.

use itertools::Itertools;
use nalgebra as na;
use std::{collections::HashMap, io::Write, rc::Rc, str::FromStr};

use crate::{Error, Field, Mesh, Result, Vec3};

/// Check value at the start of `Binary 4` data.
const SENTINEL_4: f32 = 1234567.0;
/// Check value at the start of `Binary 8` data.
const SENTINEL_8: f64 = 123456789012345.0;

/// How the data block of an OVF file is encoded.
///
/// ```
/// # use fdfield::Representation;
/// assert_eq!("bin4".parse::<Representation>()?, Representation::Bin4);
/// assert!("bin2".parse::<Representation>().is_err());
/// # Ok::<(), fdfield::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Representation {
    /// Human readable text, one cell per line.
    #[default]
    Text,
    /// 4-byte floats.
    Bin4,
    /// 8-byte floats.
    Bin8,
}

impl Representation {
    fn data_label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Bin4 => "Binary 4",
            Self::Bin8 => "Binary 8",
        }
    }
}

impl FromStr for Representation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "bin4" => Ok(Self::Bin4),
            "bin8" => Ok(Self::Bin8),
            _ => Err(Error::UnknownRepresentation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "txt",
            Self::Bin4 => "bin4",
            Self::Bin8 => "bin8",
        })
    }
}

//
// writing
//

/// Write a field as an OVF 2.0 file.
///
/// Scalar and three-dimensional fields are supported.
/// With `extend_scalar`, a scalar field is written as a vector field
/// with the value in the x component and zeros elsewhere.
pub fn write(
    field: &Field,
    writer: &mut impl Write,
    representation: Representation,
    extend_scalar: bool,
) -> Result<()> {
    let dim = field.dim();
    if dim != 1 && dim != 3 {
        return Err(Error::UnsupportedDimension(dim));
    }
    let write_dim = if extend_scalar { 3 } else { dim };
    let values = field.values();
    // component j of cell i as written, zero for padding
    let value = |i: usize, j: usize| if j < dim { values[(i, j)] } else { 0. };

    log::debug!(
        "writing {dim}-component field '{}' with {} cells as OVF {representation}",
        field.name(),
        values.nrows(),
    );

    write_header(field, writer, write_dim)?;

    let label = representation.data_label();
    writeln!(writer, "# Begin: Data {label}")?;
    match representation {
        Representation::Text => {
            for i in 0..values.nrows() {
                let line = (0..write_dim).map(|j| format!("{:e}", value(i, j))).join(" ");
                writeln!(writer, "{line}")?;
            }
        }
        Representation::Bin4 => {
            let mut data = Vec::with_capacity(values.nrows() * write_dim + 1);
            data.push(SENTINEL_4);
            for i in 0..values.nrows() {
                data.extend((0..write_dim).map(|j| value(i, j) as f32));
            }
            writer.write_all(bytemuck::cast_slice(&data))?;
            writeln!(writer)?;
        }
        Representation::Bin8 => {
            let mut data = Vec::with_capacity(values.nrows() * write_dim + 1);
            data.push(SENTINEL_8);
            for i in 0..values.nrows() {
                data.extend((0..write_dim).map(|j| value(i, j)));
            }
            writer.write_all(bytemuck::cast_slice(&data))?;
            writeln!(writer)?;
        }
    }
    writeln!(writer, "# End: Data {label}")?;
    writeln!(writer, "# End: Segment")?;
    Ok(())
}

fn write_header(field: &Field, writer: &mut impl Write, write_dim: usize) -> Result<()> {
    let mesh = field.mesh();
    let (pmin, pmax) = (mesh.region().pmin(), mesh.region().pmax());
    let cell = mesh.cell();
    let n = mesh.n();

    writeln!(writer, "# OOMMF OVF 2.0")?;
    writeln!(writer, "#")?;
    writeln!(writer, "# Segment count: 1")?;
    writeln!(writer, "#")?;
    writeln!(writer, "# Begin: Segment")?;
    writeln!(writer, "# Begin: Header")?;
    writeln!(writer, "#")?;
    writeln!(writer, "# Title: {}", field.name())?;
    writeln!(writer, "# meshtype: rectangular")?;
    writeln!(writer, "# meshunit: m")?;
    writeln!(writer, "#")?;
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        writeln!(writer, "# {name}min: {:e}", pmin[axis])?;
    }
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        writeln!(writer, "# {name}max: {:e}", pmax[axis])?;
    }
    writeln!(writer, "#")?;
    writeln!(writer, "# valuedim: {write_dim}")?;
    if write_dim == 3 {
        writeln!(writer, "# valuelabels: {0}_x {0}_y {0}_z", field.name())?;
        writeln!(writer, "# valueunits: 1 1 1")?;
    } else {
        writeln!(writer, "# valuelabels: {}", field.name())?;
        writeln!(writer, "# valueunits: 1")?;
    }
    writeln!(writer, "#")?;
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        writeln!(writer, "# {name}base: {:e}", pmin[axis] + cell[axis] / 2.)?;
    }
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        writeln!(writer, "# {name}nodes: {}", n[axis])?;
    }
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        writeln!(writer, "# {name}stepsize: {:e}", cell[axis])?;
    }
    writeln!(writer, "#")?;
    writeln!(writer, "# End: Header")?;
    writeln!(writer, "#")?;
    Ok(())
}

//
// reading
//

/// Read a field from the contents of an OVF file.
///
/// The mesh is rebuilt from the `min`, `max` and `stepsize` header entries
/// and the field dimension from `valuedim`.
/// The field is named after the `Title` entry if there is one.
///
/// ```
/// # use fdfield::{Field, Representation, ovf, mesh::tiny_mesh};
/// let f = Field::new(tiny_mesh(), 3, [0., 0., 1.])?.with_name("m");
/// let mut bytes = Vec::new();
/// ovf::write(&f, &mut bytes, Representation::Bin8, false)?;
/// let read = ovf::read(&bytes)?;
/// assert_eq!(read, f);
/// assert_eq!(read.name(), "m");
/// # Ok::<(), fdfield::Error>(())
/// ```
pub fn read(bytes: &[u8]) -> Result<Field> {
    let lowercase = bytes.to_ascii_lowercase();
    let data_marker = b"# begin: data";
    let marker_start = lowercase
        .windows(data_marker.len())
        .position(|w| w == data_marker)
        .ok_or_else(|| Error::Parse("no data block found".to_string()))?;

    let header = std::str::from_utf8(&bytes[..marker_start])
        .map_err(|_| Error::Parse("header is not valid UTF-8".to_string()))?;
    let metadata = parse_header(header);

    let number = |key: &'static str| -> Result<f64> {
        let value = metadata.get(key).ok_or(Error::MissingMetadata(key))?;
        value
            .parse::<f64>()
            .map_err(|_| Error::Parse(format!("invalid value {value:?} for {key}")))
    };
    let point = |suffix: [&'static str; 3]| -> Result<Vec3> {
        Ok(Vec3::new(number(suffix[0])?, number(suffix[1])?, number(suffix[2])?))
    };
    let pmin = point(["xmin", "ymin", "zmin"])?;
    let pmax = point(["xmax", "ymax", "zmax"])?;
    let cell = point(["xstepsize", "ystepsize", "zstepsize"])?;
    let dim = {
        let value = metadata
            .get("valuedim")
            .ok_or(Error::MissingMetadata("valuedim"))?;
        value
            .parse::<usize>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| Error::Parse(format!("invalid value {value:?} for valuedim")))?
    };
    let name = metadata
        .get("title")
        .cloned()
        .unwrap_or_else(|| "field".to_string());

    let mesh = Mesh::with_cell(pmin, pmax, cell)?;
    let expected = mesh.len() * dim;

    // the rest of the marker line tells the representation
    let line_end = lowercase[marker_start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |p| marker_start + p);
    let marker_line = std::str::from_utf8(&lowercase[marker_start..line_end])
        .map_err(|_| Error::Parse("invalid data block marker".to_string()))?
        .trim()
        .to_string();
    let data = &bytes[(line_end + 1).min(bytes.len())..];

    let values: Vec<f64> = if marker_line.ends_with("text") {
        read_text(data, expected)?
    } else if marker_line.ends_with("binary 4") {
        let raw = binary_values::<f32>(data, expected)?;
        check_sentinel(f64::from(raw[0]), f64::from(SENTINEL_4))?;
        raw[1..].iter().map(|v| f64::from(*v)).collect()
    } else if marker_line.ends_with("binary 8") {
        let raw = binary_values::<f64>(data, expected)?;
        check_sentinel(raw[0], SENTINEL_8)?;
        raw[1..].to_vec()
    } else {
        return Err(Error::Parse(format!(
            "unsupported data representation {marker_line:?}"
        )));
    };

    log::debug!(
        "read {dim}-component field '{name}' with {} cells from OVF ({marker_line})",
        mesh.len()
    );
    let values = na::DMatrix::from_row_slice(mesh.len(), dim, &values);
    Ok(Field::from_parts(Rc::new(mesh), values, name))
}

/// Collect `# key: value` lines, keys lowercased.
fn parse_header(header: &str) -> HashMap<String, String> {
    header
        .lines()
        .filter_map(|line| line.trim().strip_prefix('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect()
}

fn read_text(data: &[u8], expected: usize) -> Result<Vec<f64>> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::Parse("text data is not valid UTF-8".to_string()))?;
    let values = text
        .lines()
        .map(str::trim)
        .take_while(|line| !line.to_lowercase().starts_with("# end: data"))
        .filter(|line| !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| Error::Parse(format!("invalid number {v:?} in data")))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() != expected {
        return Err(Error::Parse(format!(
            "expected {expected} values in data, found {}",
            values.len()
        )));
    }
    Ok(values)
}

/// The check value followed by `expected` values.
fn binary_values<T: bytemuck::Pod>(data: &[u8], expected: usize) -> Result<Vec<T>> {
    let size = std::mem::size_of::<T>();
    let needed = (expected + 1) * size;
    if data.len() < needed {
        return Err(Error::Parse(format!(
            "expected {needed} bytes of binary data, found {}",
            data.len()
        )));
    }
    Ok(data[..needed]
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned::<T>)
        .collect())
}

fn check_sentinel(found: f64, expected: f64) -> Result<()> {
    if found != expected {
        return Err(Error::SentinelMismatch { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mesh::tiny_mesh, ErrorKind, Value};
    use approx::assert_relative_eq;

    fn to_bytes(f: &Field, representation: Representation, extend_scalar: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        write(f, &mut bytes, representation, extend_scalar).unwrap();
        bytes
    }

    fn sample_field() -> Field {
        let mesh = Mesh::with_cell(
            Vec3::new(-5e-9, 0., 1e-9),
            Vec3::new(5e-9, 6e-9, 4e-9),
            Vec3::new(1e-9, 2e-9, 1e-9),
        )
        .unwrap();
        Field::new(
            mesh,
            3,
            Value::vector_function(|p| Vec3::new(p.x * 1e9, -p.y * 3e8, 1. / 3.)),
        )
        .unwrap()
        .with_name("m")
    }

    #[test]
    fn text_round_trip_is_exact() {
        let f = sample_field();
        let bytes = to_bytes(&f, Representation::Text, false);
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("# OOMMF OVF 2.0"));
        assert!(text.contains("# valuedim: 3"));
        assert!(text.contains("# xnodes: 10"));
        assert!(text.contains("# Begin: Data Text"));

        let read = read(&bytes).unwrap();
        assert_eq!(read, f);
        assert_eq!(read.name(), "m");
        assert_eq!(read.mesh().n(), [10, 3, 3]);
    }

    #[test]
    fn binary_round_trips() {
        let f = sample_field();

        let read8 = read(&to_bytes(&f, Representation::Bin8, false)).unwrap();
        assert_eq!(read8.dim(), 3);
        for (a, b) in read8.values().iter().zip(f.values().iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }

        let read4 = read(&to_bytes(&f, Representation::Bin4, false)).unwrap();
        assert_eq!(*read4.mesh(), *f.mesh());
        for (a, b) in read4.values().iter().zip(f.values().iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-6);
        }
    }

    #[test]
    fn scalar_fields_and_extension() {
        let f = Field::from_fn(tiny_mesh(), 1, |p| vec![p.x - p.z]).unwrap();
        for representation in [Representation::Text, Representation::Bin4, Representation::Bin8] {
            let read = read(&to_bytes(&f, representation, false)).unwrap();
            assert_eq!(read.dim(), 1);
            assert_eq!(read, f);
        }

        let extended = read(&to_bytes(&f, Representation::Text, true)).unwrap();
        assert_eq!(extended.dim(), 3);
        assert_eq!(extended.x().unwrap(), f);
        assert!(extended.y().unwrap().values().iter().all(|v| *v == 0.));
    }

    #[test]
    fn norm_survives_writing() {
        let f = sample_field().with_norm(1e6).unwrap();
        let read = read(&to_bytes(&f, Representation::Bin8, false)).unwrap();
        for n in read.norm().values().iter() {
            assert_relative_eq!(*n, 1e6, max_relative = 1e-12);
        }
    }

    #[test]
    fn unsupported_dimensions() {
        let f = Field::new(tiny_mesh(), 2, [1., 2.]).unwrap();
        let mut bytes = Vec::new();
        let err = write(&f, &mut bytes, Representation::Text, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(err.to_string().contains("Cannot write"));
    }

    #[test]
    fn malformed_files() {
        let f = Field::new(tiny_mesh(), 3, [1., 2., 3.]).unwrap();
        let text = String::from_utf8(to_bytes(&f, Representation::Text, false)).unwrap();

        let without_key = text.replace("# ymax: 1e1\n", "");
        let err = read(without_key.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingMetadata("ymax")), "{err}");

        let bad_number = text.replace("# zmin: 0e0", "# zmin: zero");
        assert_eq!(read(bad_number.as_bytes()).unwrap_err().kind(), ErrorKind::Parse);

        let truncated = &text[..text.len() - 200];
        assert_eq!(read(truncated.as_bytes()).unwrap_err().kind(), ErrorKind::Parse);

        assert_eq!(read(b"# no data here").unwrap_err().kind(), ErrorKind::Parse);

        let mut binary = to_bytes(&f, Representation::Bin8, false);
        let marker = b"# Begin: Data Binary 8\n";
        let start = binary
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        binary[start..start + 8].copy_from_slice(&1.0f64.to_ne_bytes());
        let err = read(&binary).unwrap_err();
        assert!(matches!(err, Error::SentinelMismatch { found, .. } if found == 1.));
    }

    #[test]
    fn representation_strings() {
        for r in [Representation::Text, Representation::Bin4, Representation::Bin8] {
            assert_eq!(r.to_string().parse::<Representation>().unwrap(), r);
        }
        assert_eq!(
            "BIN8".parse::<Representation>().unwrap(),
            Representation::Bin8
        );
        let err = "binary".parse::<Representation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
