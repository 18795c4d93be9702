//! Binary geometry format
//!
//! ```text
//! offset  size  field
//!      0     6  magic "M2N1.0"
//!      6     1  format version (1)
//!      7     4  payload byte length, u32 LE
//!     11     4  reserved, always 0
//!     15     n  vertex records
//! ```
//!
//! A record is eight little-endian `f32`: position(3), tex coord(2),
//! normal(3). The encoder only writes this layout. [`decode`] also reads
//! the older header-less layout (`u32` payload length, `u32` reserved,
//! 20-byte position + tex coord records).

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Vec2, Vec3};
use m2n_core::{Error, Result, Vertex};
use serde::{Deserialize, Serialize};

use super::GeometryFile;

/// File magic
pub const MAGIC: &[u8; 6] = b"M2N1.0";

/// Format version written by [`GeometryEncoder`]
pub const FORMAT_VERSION: u8 = 1;

/// Size of the versioned header in bytes
pub const HEADER_SIZE: usize = 15;

/// Size of one vertex record in bytes
pub const VERTEX_STRIDE: usize = 32;

/// Size of the legacy header in bytes
pub const LEGACY_HEADER_SIZE: usize = 8;

/// Size of one legacy vertex record in bytes
pub const LEGACY_VERTEX_STRIDE: usize = 20;

/// Vertex attribute set selected for export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexAttributes {
    /// Position and tex coord; the normal slot is written as zero
    PositionTexCoord,
    /// Position, tex coord and normal
    #[default]
    PositionTexCoordNormal,
    /// Joints, weights and a second UV set; no binary layout exists
    Skinned,
}

impl VertexAttributes {
    pub fn is_supported(&self) -> bool {
        !matches!(self, VertexAttributes::Skinned)
    }
}

impl std::fmt::Display for VertexAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VertexAttributes::PositionTexCoord => "position_tex_coord",
            VertexAttributes::PositionTexCoordNormal => "position_tex_coord_normal",
            VertexAttributes::Skinned => "skinned",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for VertexAttributes {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "position_tex_coord" => Ok(VertexAttributes::PositionTexCoord),
            "position_tex_coord_normal" => Ok(VertexAttributes::PositionTexCoordNormal),
            "skinned" => Ok(VertexAttributes::Skinned),
            _ => Err(format!("Unknown vertex attribute set: {}", s)),
        }
    }
}

/// Writes vertex lists in the versioned format
#[derive(Debug, Clone, Copy)]
pub struct GeometryEncoder {
    attributes: VertexAttributes,
}

impl GeometryEncoder {
    /// Create an encoder for an attribute set
    pub fn new(attributes: VertexAttributes) -> Result<Self> {
        if !attributes.is_supported() {
            return Err(Error::UnsupportedVertexAttributes {
                attributes: attributes.to_string(),
            });
        }
        Ok(Self { attributes })
    }

    /// Encode one vertex list
    pub fn encode(&self, vertices: &[Vertex]) -> Result<Vec<u8>> {
        self.encode_chunks([vertices])
    }

    /// Encode a geometry file, concatenating its groups in order
    pub fn encode_file(&self, file: &GeometryFile<'_>) -> Result<Vec<u8>> {
        self.encode_chunks(file.groups.iter().map(|group| group.vertices.as_slice()))
    }

    /// Encode several vertex lists back to back into one buffer
    pub fn encode_chunks<'a, I>(&self, chunks: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = &'a [Vertex]>,
        I::IntoIter: Clone,
    {
        let chunks = chunks.into_iter();
        let count: usize = chunks.clone().map(<[Vertex]>::len).sum();
        let payload_len = payload_length(count)?;

        let mut out = Vec::with_capacity(HEADER_SIZE + payload_len as usize);
        out.write_all(MAGIC)?;
        out.write_u8(FORMAT_VERSION)?;
        out.write_u32::<LittleEndian>(payload_len)?;
        out.write_u32::<LittleEndian>(0)?;

        for vertex in chunks.flatten() {
            self.write_vertex(&mut out, vertex)?;
        }

        debug_assert_eq!(out.len(), HEADER_SIZE + payload_len as usize);
        Ok(out)
    }

    fn write_vertex<W: Write>(&self, out: &mut W, vertex: &Vertex) -> Result<()> {
        let normal = match self.attributes {
            VertexAttributes::PositionTexCoord => Vec3::ZERO,
            _ => vertex.normal,
        };

        write_floats(out, &vertex.position.to_array())?;
        write_floats(out, &vertex.tex_coord.to_array())?;
        write_floats(out, &normal.to_array())?;
        Ok(())
    }
}

fn payload_length(count: usize) -> Result<u32> {
    let bytes = count
        .checked_mul(VERTEX_STRIDE)
        .ok_or(Error::PayloadTooLarge { bytes: usize::MAX })?;
    u32::try_from(bytes).map_err(|_| Error::PayloadTooLarge { bytes })
}

fn write_floats<W: Write>(out: &mut W, values: &[f32]) -> Result<()> {
    for &value in values {
        out.write_f32::<LittleEndian>(value)?;
    }
    Ok(())
}

/// Layout of a geometry file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "layout")]
pub enum GeometryFormat {
    /// Magic-tagged layout with the given version byte
    Versioned { version: u8 },
    /// Header-less 20-byte-stride layout
    Legacy,
}

impl GeometryFormat {
    /// Record stride in bytes
    pub fn stride(&self) -> usize {
        match self {
            GeometryFormat::Versioned { .. } => VERTEX_STRIDE,
            GeometryFormat::Legacy => LEGACY_VERTEX_STRIDE,
        }
    }
}

impl std::fmt::Display for GeometryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryFormat::Versioned { version } => write!(f, "M2N version {}", version),
            GeometryFormat::Legacy => f.write_str("legacy"),
        }
    }
}

/// Guess the layout of a geometry file
///
/// The magic wins. Without it a file is legacy only if its length field
/// is a whole number of 20-byte records and exactly covers the file.
pub fn detect_format(bytes: &[u8]) -> Option<GeometryFormat> {
    if bytes.len() > MAGIC.len() && bytes.starts_with(MAGIC) {
        return Some(GeometryFormat::Versioned {
            version: bytes[MAGIC.len()],
        });
    }

    if bytes.len() < LEGACY_HEADER_SIZE {
        return None;
    }

    let payload_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let reserved = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

    let matches_file = LEGACY_HEADER_SIZE.checked_add(payload_len) == Some(bytes.len());
    (reserved == 0 && payload_len % LEGACY_VERTEX_STRIDE == 0 && matches_file)
        .then_some(GeometryFormat::Legacy)
}

/// A decoded geometry file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGeometry {
    pub format: GeometryFormat,
    pub vertices: Vec<Vertex>,
}

impl DecodedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Axis-aligned bounds of all positions, `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position), max.max(v.position))
        }))
    }
}

/// Decode a geometry file in either layout
pub fn decode(bytes: &[u8]) -> Result<DecodedGeometry> {
    match detect_format(bytes) {
        Some(GeometryFormat::Legacy) => decode_legacy(bytes),
        _ => decode_versioned(bytes),
    }
}

fn decode_versioned(bytes: &[u8]) -> Result<DecodedGeometry> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::UnexpectedEof {
            offset: bytes.len() as u64,
        });
    }

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 6];
    cursor.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::InvalidMagic {
            expected: MAGIC.to_vec(),
            found: magic.to_vec(),
        });
    }

    let version = cursor.read_u8()?;
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_len = cursor.read_u32::<LittleEndian>()? as usize;
    let reserved = cursor.read_u32::<LittleEndian>()?;
    if reserved != 0 {
        return Err(Error::invalid_data(format!("reserved field is {}, expected 0", reserved)));
    }

    let vertices = read_records(&mut cursor, bytes.len(), payload_len, VERTEX_STRIDE, true)?;

    Ok(DecodedGeometry {
        format: GeometryFormat::Versioned { version },
        vertices,
    })
}

fn decode_legacy(bytes: &[u8]) -> Result<DecodedGeometry> {
    let mut cursor = Cursor::new(bytes);
    let payload_len = cursor.read_u32::<LittleEndian>()? as usize;
    let _reserved = cursor.read_u32::<LittleEndian>()?;

    let vertices = read_records(&mut cursor, bytes.len(), payload_len, LEGACY_VERTEX_STRIDE, false)?;

    Ok(DecodedGeometry {
        format: GeometryFormat::Legacy,
        vertices,
    })
}

fn read_records(
    cursor: &mut Cursor<&[u8]>,
    total: usize,
    payload_len: usize,
    stride: usize,
    with_normal: bool,
) -> Result<Vec<Vertex>> {
    if payload_len % stride != 0 {
        return Err(Error::invalid_data(format!(
            "payload length {} is not a multiple of the {}-byte stride",
            payload_len, stride
        )));
    }

    let start = cursor.position() as usize;
    let end = start + payload_len;
    if end > total {
        return Err(Error::UnexpectedEof { offset: total as u64 });
    }
    if end < total {
        return Err(Error::invalid_data(format!(
            "{} trailing bytes after payload",
            total - end
        )));
    }

    let count = payload_len / stride;
    let mut vertices = Vec::with_capacity(count);
    for _ in 0..count {
        let position = read_vec3(cursor)?;
        let tex_coord = Vec2::new(
            cursor.read_f32::<LittleEndian>()?,
            cursor.read_f32::<LittleEndian>()?,
        );
        let normal = if with_normal { read_vec3(cursor)? } else { Vec3::ZERO };
        vertices.push(Vertex::new(position, normal, tex_coord));
    }

    Ok(vertices)
}

fn read_vec3(cursor: &mut Cursor<&[u8]>) -> Result<Vec3> {
    Ok(Vec3::new(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Vertex> {
        vec![
            Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, Vec2::new(0.5, 0.25)),
            Vertex::new(Vec3::new(-1.5, 0.0, 9.0), Vec3::NEG_Z, Vec2::new(1.0, 0.0)),
        ]
    }

    fn encoder() -> GeometryEncoder {
        GeometryEncoder::new(VertexAttributes::default()).unwrap()
    }

    fn legacy_bytes(records: &[[f32; 5]]) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>((records.len() * LEGACY_VERTEX_STRIDE) as u32).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        for record in records {
            write_floats(&mut out, record).unwrap();
        }
        out
    }

    #[test]
    fn test_header_layout() {
        let bytes = encoder().encode(&sample()).unwrap();

        assert_eq!(&bytes[0..6], b"M2N1.0");
        assert_eq!(bytes[6], 1);
        assert_eq!(u32::from_le_bytes(bytes[7..11].try_into().unwrap()), 64);
        assert_eq!(u32::from_le_bytes(bytes[11..15].try_into().unwrap()), 0);
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * VERTEX_STRIDE);
    }

    #[test]
    fn test_record_order() {
        let bytes = encoder().encode(&sample()[..1]).unwrap();
        let floats: Vec<f32> = bytes[HEADER_SIZE..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();

        assert_eq!(floats, vec![1.0, 2.0, 3.0, 0.5, 0.25, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_geometry() {
        let bytes = encoder().encode(&[]).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.vertex_count(), 0);
        assert_eq!(decoded.bounds(), None);
    }

    #[test]
    fn test_position_tex_coord_zeroes_normal() {
        let encoder = GeometryEncoder::new(VertexAttributes::PositionTexCoord).unwrap();
        let decoded = decode(&encoder.encode(&sample()).unwrap()).unwrap();

        assert!(decoded.vertices.iter().all(|v| v.normal == Vec3::ZERO));
        assert_eq!(decoded.vertices[0].position, sample()[0].position);
    }

    #[test]
    fn test_skinned_is_rejected() {
        let err = GeometryEncoder::new(VertexAttributes::Skinned).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVertexAttributes { .. }));
    }

    #[test]
    fn test_chunks_are_concatenated() {
        let vertices = sample();
        let bytes = encoder()
            .encode_chunks([&vertices[..1], &vertices[1..], &vertices[..]])
            .unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.vertex_count(), 4);
        assert_eq!(decoded.vertices[1], vertices[1]);
        assert_eq!(decoded.vertices[2], vertices[0]);
    }

    #[test]
    fn test_decode_legacy() {
        let bytes = legacy_bytes(&[[1.0, 2.0, 3.0, 0.5, 0.5], [4.0, 5.0, 6.0, 0.0, 1.0]]);
        assert_eq!(detect_format(&bytes), Some(GeometryFormat::Legacy));

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.format, GeometryFormat::Legacy);
        assert_eq!(decoded.vertex_count(), 2);
        assert_eq!(decoded.vertices[1].position, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(decoded.vertices[1].normal, Vec3::ZERO);
        assert_eq!(
            decoded.bounds(),
            Some((Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)))
        );
    }

    #[test]
    fn test_versioned_never_detected_as_legacy() {
        let bytes = encoder().encode(&sample()).unwrap();
        assert_eq!(
            detect_format(&bytes),
            Some(GeometryFormat::Versioned { version: 1 })
        );
    }

    #[test]
    fn test_decode_errors() {
        let good = encoder().encode(&sample()).unwrap();

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(decode(&bad_magic), Err(Error::InvalidMagic { .. })));

        let mut bad_version = good.clone();
        bad_version[6] = 2;
        assert!(matches!(
            decode(&bad_version),
            Err(Error::UnsupportedVersion { version: 2, supported: 1 })
        ));

        let truncated = &good[..good.len() - 4];
        assert!(matches!(decode(truncated), Err(Error::UnexpectedEof { .. })));

        let mut trailing = good.clone();
        trailing.push(0);
        assert!(decode(&trailing).unwrap_err().is_format_error());

        assert!(matches!(decode(&good[..4]), Err(Error::UnexpectedEof { offset: 4 })));
    }

    fn arb_vertex() -> impl Strategy<Value = Vertex> {
        (prop::array::uniform8(any::<f32>())).prop_map(|f| {
            Vertex::new(
                Vec3::new(f[0], f[1], f[2]),
                Vec3::new(f[5], f[6], f[7]),
                Vec2::new(f[3], f[4]),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip_is_bit_exact(vertices in prop::collection::vec(arb_vertex(), 0..64)) {
            let bytes = encoder().encode(&vertices).unwrap();
            let payload_len = u32::from_le_bytes(bytes[7..11].try_into().unwrap()) as usize;
            prop_assert_eq!(payload_len / VERTEX_STRIDE, vertices.len());

            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(decoded.vertex_count(), vertices.len());
            for (a, b) in decoded.vertices.iter().zip(&vertices) {
                let bits = |v: &Vertex| {
                    [v.position.x, v.position.y, v.position.z, v.tex_coord.x, v.tex_coord.y,
                     v.normal.x, v.normal.y, v.normal.z].map(f32::to_bits)
                };
                prop_assert_eq!(bits(a), bits(b));
            }
        }
    }
}
