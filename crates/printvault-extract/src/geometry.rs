//! Triangle-mesh geometry extraction.
//!
//! Supports both STL serializations:
//!
//! ```text
//! Binary:
//!   UINT8[80]  – header (ignored)
//!   UINT32     – triangle count (little-endian)
//!   foreach triangle (50 bytes)
//!       REAL32[3] – normal (ignored)
//!       REAL32[3] – vertex 1
//!       REAL32[3] – vertex 2
//!       REAL32[3] – vertex 3
//!       UINT16    – attribute byte count (ignored)
//!
//! ASCII:
//!   solid name
//!     facet normal ni nj nk
//!       outer loop
//!         vertex x y z      (three per triangle)
//!       endloop
//!     endfacet
//!   endsolid
//! ```
//!
//! Volume uses the divergence-theorem decomposition of a closed mesh into
//! signed tetrahedra against the origin. The absolute value of the sum is
//! reported because source meshes are not assumed consistently wound.

use serde::{Deserialize, Serialize};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Axis-aligned bounding-box dimensions and enclosed volume of a mesh.
///
/// Units follow the source coordinates (millimeters for print meshes, so
/// `volume` is mm³; callers convert to cm³ for display).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshGeometry {
    /// Bounding box extent along X.
    pub dim_x: f64,
    /// Bounding box extent along Y.
    pub dim_y: f64,
    /// Bounding box extent along Z.
    pub dim_z: f64,
    /// Enclosed volume (meaningful for closed meshes).
    pub volume: f64,
}

/// Running accumulator over triangles.
struct Accumulator {
    min: [f64; 3],
    max: [f64; 3],
    signed_volume: f64,
    vertex_count: u64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
            signed_volume: 0.0,
            vertex_count: 0,
        }
    }

    fn add_triangle(&mut self, v: [[f64; 3]; 3]) {
        for vertex in &v {
            for axis in 0..3 {
                self.min[axis] = self.min[axis].min(vertex[axis]);
                self.max[axis] = self.max[axis].max(vertex[axis]);
            }
        }
        self.vertex_count += 3;

        let [[x1, y1, z1], [x2, y2, z2], [x3, y3, z3]] = v;
        self.signed_volume +=
            (x1 * y2 * z3 - x1 * y3 * z2 - x2 * y1 * z3 + x2 * y3 * z1 + x3 * y1 * z2
                - x3 * y2 * z1)
                / 6.0;
    }

    fn finish(self) -> MeshGeometry {
        // No vertices means the sentinels never moved; report zeros rather
        // than letting infinities leak out.
        if self.vertex_count == 0 {
            return MeshGeometry::default();
        }
        MeshGeometry {
            dim_x: self.max[0] - self.min[0],
            dim_y: self.max[1] - self.min[1],
            dim_z: self.max[2] - self.min[2],
            volume: self.signed_volume.abs(),
        }
    }
}

/// Extract bounding-box dimensions and enclosed volume from raw mesh bytes.
///
/// Never fails: malformed or unrecognized input yields zeroed geometry so
/// that ingestion can still create the record.
pub fn extract_geometry(bytes: &[u8]) -> MeshGeometry {
    if is_binary_stl(bytes) {
        extract_binary(bytes)
    } else {
        extract_ascii(bytes)
    }
}

/// Binary iff the declared triangle count exactly accounts for the file
/// length: 80-byte header + 4-byte count + count × 50-byte records.
fn is_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() <= HEADER_SIZE + 4 {
        return false;
    }
    let count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);
    count as u64 * TRIANGLE_SIZE as u64 + (HEADER_SIZE as u64 + 4) == bytes.len() as u64
}

fn read_vertex(buf: &[u8]) -> [f64; 3] {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    [x as f64, y as f64, z as f64]
}

fn extract_binary(bytes: &[u8]) -> MeshGeometry {
    let count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]) as usize;

    let mut acc = Accumulator::new();
    for i in 0..count {
        let offset = HEADER_SIZE + 4 + i * TRIANGLE_SIZE;
        let record = &bytes[offset..offset + TRIANGLE_SIZE];
        // 12-byte normal skipped, then three 12-byte vertices; the two
        // trailing attribute bytes are ignored.
        acc.add_triangle([
            read_vertex(&record[12..24]),
            read_vertex(&record[24..36]),
            read_vertex(&record[36..48]),
        ]);
    }
    acc.finish()
}

fn extract_ascii(bytes: &[u8]) -> MeshGeometry {
    let text = String::from_utf8_lossy(bytes);

    let mut acc = Accumulator::new();
    let mut pending: Vec<[f64; 3]> = Vec::with_capacity(3);

    // Every three `vertex x y z` lines form one triangle; the surrounding
    // solid/facet/loop keyword lines carry no geometry and are skipped.
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("vertex") {
            continue;
        }
        let coords: Vec<f64> = tokens.map_while(|t| t.parse::<f64>().ok()).collect();
        if coords.len() < 3 {
            continue;
        }
        pending.push([coords[0], coords[1], coords[2]]);
        if pending.len() == 3 {
            acc.add_triangle([pending[0], pending[1], pending[2]]);
            pending.clear();
        }
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize triangles into a valid binary STL buffer.
    fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            bytes.extend_from_slice(&[0u8; 12]); // normal
            for vertex in tri {
                for coord in vertex {
                    bytes.extend_from_slice(&coord.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&[0u8; 2]); // attribute byte count
        }
        bytes
    }

    /// The 12 consistently wound triangles of an axis-aligned unit cube.
    fn unit_cube_triangles() -> Vec<[[f32; 3]; 3]> {
        let quads: [[[f32; 3]; 4]; 6] = [
            // -Z face (viewed from below: wound so normals point outward)
            [
                [0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
            ],
            // +Z face
            [
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            // -Y face
            [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0],
            ],
            // +Y face
            [
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, 0.0],
            ],
            // -X face
            [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [0.0, 1.0, 0.0],
            ],
            // +X face
            [
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 1.0, 1.0],
                [1.0, 0.0, 1.0],
            ],
        ];

        let mut triangles = Vec::with_capacity(12);
        for quad in &quads {
            triangles.push([quad[0], quad[1], quad[2]]);
            triangles.push([quad[0], quad[2], quad[3]]);
        }
        triangles
    }

    #[test]
    fn test_single_binary_triangle() {
        let bytes = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        let geo = extract_geometry(&bytes);
        assert_eq!(geo.dim_x, 1.0);
        assert_eq!(geo.dim_y, 1.0);
        assert_eq!(geo.dim_z, 0.0);
        // A single zero-height triangle encloses nothing.
        assert_eq!(geo.volume, 0.0);
    }

    #[test]
    fn test_unit_cube_volume() {
        let bytes = binary_stl(&unit_cube_triangles());
        let geo = extract_geometry(&bytes);
        assert!((geo.dim_x - 1.0).abs() < 1e-9);
        assert!((geo.dim_y - 1.0).abs() < 1e-9);
        assert!((geo.dim_z - 1.0).abs() < 1e-9);
        assert!((geo.volume - 1.0).abs() < 1e-6, "volume = {}", geo.volume);
    }

    #[test]
    fn test_reversed_winding_same_volume() {
        let mut reversed = unit_cube_triangles();
        for tri in &mut reversed {
            tri.swap(1, 2);
        }
        let geo = extract_geometry(&binary_stl(&reversed));
        assert!((geo.volume - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_translated_cube_volume_unchanged() {
        let mut triangles = unit_cube_triangles();
        for tri in &mut triangles {
            for vertex in tri.iter_mut() {
                vertex[0] += 10.0;
                vertex[1] -= 3.0;
                vertex[2] += 7.5;
            }
        }
        let geo = extract_geometry(&binary_stl(&triangles));
        assert!((geo.dim_x - 1.0).abs() < 1e-5);
        assert!((geo.volume - 1.0).abs() < 1e-4, "volume = {}", geo.volume);
    }

    #[test]
    fn test_ascii_triangle() {
        let stl = "solid test\n\
                   facet normal 0 0 1\n\
                   outer loop\n\
                   vertex 0 0 0\n\
                   vertex 2 0 0\n\
                   vertex 0 3 0\n\
                   endloop\n\
                   endfacet\n\
                   endsolid test\n";
        let geo = extract_geometry(stl.as_bytes());
        assert_eq!(geo.dim_x, 2.0);
        assert_eq!(geo.dim_y, 3.0);
        assert_eq!(geo.dim_z, 0.0);
    }

    #[test]
    fn test_ascii_scientific_notation() {
        let stl = "solid s\nvertex 1.5e1 0 0\nvertex 0 2.5E-1 0\nvertex 0 0 1\nendsolid\n";
        let geo = extract_geometry(stl.as_bytes());
        assert!((geo.dim_x - 15.0).abs() < 1e-9);
        assert!((geo.dim_y - 0.25).abs() < 1e-9);
        assert!((geo.dim_z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_degrades_to_zeros() {
        assert_eq!(extract_geometry(&[]), MeshGeometry::default());
    }

    #[test]
    fn test_garbage_input_degrades_to_zeros() {
        let garbage = b"this is not a mesh at all";
        assert_eq!(extract_geometry(garbage), MeshGeometry::default());
    }

    #[test]
    fn test_truncated_binary_treated_as_ascii() {
        // Length does not satisfy the binary size equation, and the bytes
        // contain no vertex lines: zeros, not a panic.
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(extract_geometry(&bytes), MeshGeometry::default());
    }
}
