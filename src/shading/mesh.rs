//! Decodes PDF mesh shading streams (Types 4/5 Gouraud triangles, Types
//! 6/7 Coons and tensor-product patches) into tessellated geometry with
//! per-vertex sRGB color.

use super::{MeshStreamDescriptor, ShadingDescriptor};
use crate::colorspace::Converter;
use crate::error::{ColorCoreError, Result};

/// Control-point read order for a tensor-product patch's 16 points
/// laid out as a spiral starting at the corner shared with the previous
/// patch (PDF 32000-1 Table 85). Index `i` gives the position in the
/// conceptual 4x4 grid (row-major) that the `i`-th read control point
/// fills for a brand-new (flag == 0) patch.
const TENSOR_SPIRAL: [usize; 16] = [0, 1, 2, 3, 7, 11, 15, 14, 13, 12, 8, 4, 5, 6, 9, 10];

#[derive(Debug, Clone, Copy)]
pub struct MeshVertex {
    pub x: f32,
    pub y: f32,
    pub color: [u8; 4],
    pub flag: u8,
}

#[derive(Debug)]
pub struct TriangleMesh {
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<[usize; 3]>,
}

/// A Coons or tensor-product patch, stored as its 4x4 control-point grid
/// (row-major; for Coons patches the 4 interior points are synthesized)
/// and the sRGB colors at its 4 corners, matched to the grid corners
/// `(0,0) (0,3) (3,3) (3,0)`.
#[derive(Debug, Clone)]
pub struct Patch {
    pub control_points: [(f32, f32); 16],
    pub corner_colors: [[u8; 4]; 4],
}

impl Patch {
    /// Evaluates the Coons surface at parametric `(u, v)` in `[0,1]^2`
    /// using a bicubic Bezier blend of the 4x4 control grid, and bilinear
    /// interpolation of the 4 corner colors.
    pub fn sample(&self, u: f32, v: f32) -> ((f32, f32), [u8; 4]) {
        let bu = bernstein_weights(u);
        let bv = bernstein_weights(v);
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        for row in 0..4 {
            for col in 0..4 {
                let (px, py) = self.control_points[row * 4 + col];
                let weight = bu[col] * bv[row];
                x += weight * px;
                y += weight * py;
            }
        }
        let top = lerp_color(self.corner_colors[0], self.corner_colors[3], u);
        let bottom = lerp_color(self.corner_colors[1], self.corner_colors[2], u);
        let color = lerp_color(top, bottom, v);
        ((x, y), color)
    }
}

fn bernstein_weights(t: f32) -> [f32; 4] {
    let mt = 1.0 - t;
    [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t]
}

fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = (a[i] as f32 + t * (b[i] as f32 - a[i] as f32)).round() as u8;
    }
    out
}

#[derive(Debug)]
pub struct PatchMesh {
    pub patches: Vec<Patch>,
}

struct MeshBitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> MeshBitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        MeshBitReader { data, bit_pos: 0 }
    }

    fn read_bits(&mut self, count: u8) -> Option<u64> {
        if count == 0 {
            return Some(0);
        }
        let mut value: u64 = 0;
        for _ in 0..count {
            let byte_index = self.bit_pos / 8;
            if byte_index >= self.data.len() {
                return None;
            }
            let bit_index = 7 - (self.bit_pos % 8);
            let bit = (self.data[byte_index] >> bit_index) & 1;
            value = (value << 1) | bit as u64;
            self.bit_pos += 1;
        }
        Some(value)
    }

    fn align_to_byte(&mut self) {
        self.bit_pos = (self.bit_pos + 7) / 8 * 8;
    }

    fn read_decoded(&mut self, bits: u8, decode_lo: f32, decode_hi: f32) -> Option<f32> {
        let raw = self.read_bits(bits)?;
        let max = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        let t = raw as f64 / max.max(1) as f64;
        Some(decode_lo + (t as f32) * (decode_hi - decode_lo))
    }
}

fn decode_pair(decode: &[f32], index: usize) -> (f32, f32) {
    (decode[index * 2], decode[index * 2 + 1])
}

fn read_vertex(
    reader: &mut MeshBitReader,
    stream: &MeshStreamDescriptor,
) -> Option<(u8, f32, f32, Vec<f32>)> {
    let flag = reader.read_bits(stream.bits_per_flag)? as u8;
    let (x_lo, x_hi) = decode_pair(&stream.decode, 0);
    let (y_lo, y_hi) = decode_pair(&stream.decode, 1);
    let x = reader.read_decoded(stream.bits_per_coordinate, x_lo, x_hi)?;
    let y = reader.read_decoded(stream.bits_per_coordinate, y_lo, y_hi)?;
    let mut components = Vec::with_capacity(stream.color_components);
    for c in 0..stream.color_components {
        let (lo, hi) = decode_pair(&stream.decode, 2 + c);
        components.push(reader.read_decoded(stream.bits_per_component, lo, hi)?);
    }
    Some((flag, x, y, components))
}

pub(crate) fn build_triangle_mesh(
    descriptor: &ShadingDescriptor,
    converter: &Converter,
) -> Result<TriangleMesh> {
    let stream = descriptor
        .mesh
        .as_ref()
        .ok_or_else(|| ColorCoreError::MeshDecode("triangle mesh requires stream data".to_string()))?;

    let mut reader = MeshBitReader::new(&stream.data);
    let mut vertices: Vec<MeshVertex> = Vec::new();

    loop {
        let Some((flag, x, y, components)) = read_vertex(&mut reader, stream) else {
            break;
        };
        reader.align_to_byte();
        let color = converter.to_srgb(&components, descriptor.intent);
        vertices.push(MeshVertex { x, y, color, flag });
    }

    let triangles = if descriptor.shading_type == 5 {
        stream
            .vertices_per_row
            .map(|row_width| lattice_triangles(&vertices, row_width as usize))
            .unwrap_or_default()
    } else {
        free_form_triangles(&vertices)
    };

    Ok(TriangleMesh { vertices, triangles })
}

/// Lattice-form (Type 5) meshes have no per-vertex flag: every
/// `row_width` consecutive vertices form one row, and each cell between
/// two adjacent rows is split into two triangles.
fn lattice_triangles(vertices: &[MeshVertex], row_width: usize) -> Vec<[usize; 3]> {
    if row_width < 2 {
        return Vec::new();
    }
    let row_count = vertices.len() / row_width;
    let mut triangles = Vec::new();
    for row in 0..row_count.saturating_sub(1) {
        for col in 0..row_width - 1 {
            let top_left = row * row_width + col;
            let top_right = top_left + 1;
            let bottom_left = top_left + row_width;
            let bottom_right = bottom_left + 1;
            triangles.push([top_left, top_right, bottom_left]);
            triangles.push([top_right, bottom_right, bottom_left]);
        }
    }
    triangles
}

/// Free-form (Type 4) triangle strips: flag 0 starts a fresh triangle
/// from the next two vertices read; flag 1 reuses the previous
/// triangle's second and third vertices; flag 2 reuses its first and
/// third (PDF 32000-1 §8.7.4.5.5).
fn free_form_triangles(vertices: &[MeshVertex]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for (index, vertex) in vertices.iter().enumerate() {
        match vertex.flag {
            0 => {
                current.push(index);
                if current.len() > 3 {
                    current = vec![index];
                }
            }
            1 if current.len() == 3 => {
                current = vec![current[1], current[2], index];
            }
            2 if current.len() == 3 => {
                current = vec![current[0], current[2], index];
            }
            _ => {
                current.push(index);
            }
        }
        if current.len() == 3 {
            triangles.push([current[0], current[1], current[2]]);
        }
    }
    triangles
}

fn read_patch_points(
    reader: &mut MeshBitReader,
    stream: &MeshStreamDescriptor,
    count: usize,
) -> Option<Vec<(f32, f32)>> {
    let (x_lo, x_hi) = decode_pair(&stream.decode, 0);
    let (y_lo, y_hi) = decode_pair(&stream.decode, 1);
    (0..count)
        .map(|_| {
            let x = reader.read_decoded(stream.bits_per_coordinate, x_lo, x_hi)?;
            let y = reader.read_decoded(stream.bits_per_coordinate, y_lo, y_hi)?;
            Some((x, y))
        })
        .collect()
}

fn read_patch_colors(
    reader: &mut MeshBitReader,
    stream: &MeshStreamDescriptor,
    count: usize,
) -> Option<Vec<Vec<f32>>> {
    (0..count)
        .map(|_| {
            (0..stream.color_components)
                .map(|c| {
                    let (lo, hi) = decode_pair(&stream.decode, 2 + c);
                    reader.read_decoded(stream.bits_per_component, lo, hi)
                })
                .collect()
        })
        .collect()
}

pub(crate) fn build_patch_mesh(descriptor: &ShadingDescriptor, converter: &Converter) -> Result<PatchMesh> {
    let stream = descriptor
        .mesh
        .as_ref()
        .ok_or_else(|| ColorCoreError::MeshDecode("patch mesh requires stream data".to_string()))?;
    let is_tensor = descriptor.shading_type == 7;
    let mut reader = MeshBitReader::new(&stream.data);
    let mut patches = Vec::new();

    loop {
        let Some(flag) = reader.read_bits(stream.bits_per_flag) else {
            break;
        };
        let (point_count, color_count) = if flag == 0 {
            (if is_tensor { 16 } else { 12 }, 4)
        } else {
            (if is_tensor { 12 } else { 8 }, 2)
        };
        let Some(points) = read_patch_points(&mut reader, stream, point_count) else {
            break;
        };
        let Some(colors) = read_patch_colors(&mut reader, stream, color_count) else {
            break;
        };
        reader.align_to_byte();

        if flag != 0 {
            // Shared-edge continuation patches are not reconstructed here;
            // skip rather than guess at which previous edge is reused.
            continue;
        }

        let mut grid = [(0.0f32, 0.0f32); 16];
        if is_tensor {
            for (read_index, grid_index) in TENSOR_SPIRAL.iter().enumerate() {
                grid[*grid_index] = points[read_index];
            }
        } else {
            for (read_index, grid_index) in TENSOR_SPIRAL.iter().take(12).enumerate() {
                grid[*grid_index] = points[read_index];
            }
            synthesize_coons_interior(&mut grid);
        }

        let corner_colors: Vec<[u8; 4]> = colors
            .iter()
            .map(|c| converter.to_srgb(c, descriptor.intent))
            .collect();

        patches.push(Patch {
            control_points: grid,
            corner_colors: [corner_colors[0], corner_colors[1], corner_colors[2], corner_colors[3]],
        });
    }

    Ok(PatchMesh { patches })
}

/// Coons patches specify only the 12 boundary control points of
/// `(1-v)*Bbottom(u) + v*Btop(u) + (1-u)*Bleft(v) + u*Bright(v) -
/// bilinear(corners)`. The 4 interior points of the equivalent bicubic
/// Bezier grid are derived from the boundary so the tensor-product
/// surface `Patch::sample` evaluates reproduces that blend exactly,
/// rather than an approximation.
fn synthesize_coons_interior(grid: &mut [(f32, f32); 16]) {
    let p00 = grid[0];
    let p01 = grid[1];
    let p02 = grid[2];
    let p03 = grid[3];
    let p10 = grid[4];
    let p13 = grid[7];
    let p20 = grid[8];
    let p23 = grid[11];
    let p30 = grid[12];
    let p31 = grid[13];
    let p32 = grid[14];
    let p33 = grid[15];

    let blend = |terms: &[(f32, (f32, f32))]| -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        for (w, (px, py)) in terms {
            x += w * px;
            y += w * py;
        }
        (x / 9.0, y / 9.0)
    };

    grid[5] = blend(&[
        (-4.0, p00), (6.0, p01), (6.0, p10), (-2.0, p03), (-2.0, p30), (3.0, p31), (3.0, p13), (-1.0, p33),
    ]);
    grid[6] = blend(&[
        (-4.0, p03), (6.0, p02), (6.0, p13), (-2.0, p00), (-2.0, p33), (3.0, p32), (3.0, p10), (-1.0, p30),
    ]);
    grid[9] = blend(&[
        (-4.0, p30), (6.0, p31), (6.0, p20), (-2.0, p33), (-2.0, p00), (3.0, p01), (3.0, p23), (-1.0, p03),
    ]);
    grid[10] = blend(&[
        (-4.0, p33), (6.0, p32), (6.0, p23), (-2.0, p30), (-2.0, p03), (3.0, p20), (3.0, p13), (-1.0, p00),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{build_converter, ColorSpaceDescriptor};
    use crate::config::RenderingIntent;
    use crate::shading::Affine2;

    fn base_descriptor(shading_type: u8, stream: MeshStreamDescriptor) -> ShadingDescriptor {
        ShadingDescriptor {
            shading_type,
            color_space: ColorSpaceDescriptor::DeviceRgb,
            coords: vec![],
            domain: [0.0, 1.0],
            extend: [false, false],
            functions: vec![],
            matrix: Affine2::IDENTITY,
            intent: RenderingIntent::RelativeColorimetric,
            mesh: Some(stream),
        }
    }

    fn pack_bits(values: &[(u64, u8)]) -> Vec<u8> {
        let mut bits: Vec<u8> = Vec::new();
        for &(value, width) in values {
            for i in (0..width).rev() {
                bits.push(((value >> i) & 1) as u8);
            }
        }
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, bit) in bits.iter().enumerate() {
            if *bit == 1 {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        bytes
    }

    #[test]
    fn triangle_mesh_decodes_single_triangle() {
        // 3 vertices, flag=0 each, coords map to fixed x/y, single red color channel set.
        let data = pack_bits(&[
            (0, 8), (0, 16), (0, 16), (255, 8), (0, 8), (0, 8),
            (0, 8), (255, 16), (0, 16), (0, 8), (255, 8), (0, 8),
            (0, 8), (0, 16), (255, 16), (0, 8), (0, 8), (255, 8),
        ]);
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data,
            color_components: 3,
            vertices_per_row: None,
        };
        let descriptor = base_descriptor(4, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_triangle_mesh(&descriptor, &converter).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.vertices[0].color, [255, 0, 0, 255]);
    }

    #[test]
    fn empty_mesh_stream_yields_no_triangles() {
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data: vec![],
            color_components: 3,
            vertices_per_row: None,
        };
        let descriptor = base_descriptor(4, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_triangle_mesh(&descriptor, &converter).unwrap();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn missing_mesh_stream_is_rejected() {
        let mut descriptor = base_descriptor(4, MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![],
            data: vec![],
            color_components: 3,
            vertices_per_row: None,
        });
        descriptor.mesh = None;
        let converter = build_converter(&descriptor.color_space).unwrap();
        assert!(build_triangle_mesh(&descriptor, &converter).is_err());
    }

    #[test]
    fn lattice_mesh_builds_two_triangles_per_cell() {
        // 2x2 grid of vertices (row width 2), no flags consumed.
        let mut coords: Vec<(u64, u8)> = Vec::new();
        let corners: [(u32, u32); 4] = [(0, 0), (65535, 0), (0, 65535), (65535, 65535)];
        for (x, y) in corners.iter() {
            coords.push((0, 8)); // flag, ignored for lattice meshes
            coords.push((*x as u64, 16));
            coords.push((*y as u64, 16));
            coords.push((128, 8));
            coords.push((128, 8));
            coords.push((128, 8));
        }
        let data = pack_bits(&coords);
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data,
            color_components: 3,
            vertices_per_row: Some(2),
        };
        let descriptor = base_descriptor(5, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_triangle_mesh(&descriptor, &converter).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn free_form_strip_reuses_previous_edge() {
        // flag 0,0,0 forms the first triangle; a following flag 1 vertex
        // extends the strip by reusing vertices 1 and 2.
        let data = pack_bits(&[
            (0, 8), (0, 16), (0, 16), (0, 8), (0, 8), (0, 8),
            (0, 8), (65535, 16), (0, 16), (0, 8), (0, 8), (0, 8),
            (0, 8), (0, 16), (65535, 16), (0, 8), (0, 8), (0, 8),
            (1, 8), (65535, 16), (65535, 16), (0, 8), (0, 8), (0, 8),
        ]);
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data,
            color_components: 3,
            vertices_per_row: None,
        };
        let descriptor = base_descriptor(4, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_triangle_mesh(&descriptor, &converter).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1], [1, 2, 3]);
    }

    #[test]
    fn coons_patch_corners_match_control_points() {
        let mut coords: Vec<(u64, u8)> = vec![(0, 8)];
        let points: [(u32, u32); 12] = [
            (0, 0), (0, 21845), (0, 43690), (0, 65535),
            (21845, 65535), (43690, 65535), (65535, 65535), (65535, 43690),
            (65535, 21845), (65535, 0), (43690, 0), (21845, 0),
        ];
        for (x, y) in points.iter() {
            coords.push((*x as u64, 16));
            coords.push((*y as u64, 16));
        }
        for _ in 0..4 {
            coords.push((255, 8));
            coords.push((0, 8));
            coords.push((0, 8));
        }
        let data = pack_bits(&coords);
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data,
            color_components: 3,
            vertices_per_row: None,
        };
        let descriptor = base_descriptor(6, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_patch_mesh(&descriptor, &converter).unwrap();
        assert_eq!(mesh.patches.len(), 1);
        let patch = &mesh.patches[0];
        let ((x0, y0), _) = patch.sample(0.0, 0.0);
        assert!((x0 - 0.0).abs() < 0.02);
        assert!((y0 - 0.0).abs() < 0.02);
        let ((x1, y1), _) = patch.sample(1.0, 1.0);
        assert!((x1 - 1.0).abs() < 0.02);
        assert!((y1 - 1.0).abs() < 0.02);
    }

    #[test]
    fn tensor_patch_corners_match_corner_colors_exactly() {
        let mut coords: Vec<(u64, u8)> = vec![(0, 8)];
        // 12 boundary points forming a unit square, spiral order, plus 4
        // arbitrary interior points (unused by the corner assertions below).
        let points: [(u32, u32); 16] = [
            (0, 0), (0, 21845), (0, 43690), (0, 65535),
            (21845, 65535), (43690, 65535), (65535, 65535), (65535, 43690),
            (65535, 21845), (65535, 0), (43690, 0), (21845, 0),
            (21845, 21845), (43690, 21845), (43690, 43690), (21845, 43690),
        ];
        for (x, y) in points.iter() {
            coords.push((*x as u64, 16));
            coords.push((*y as u64, 16));
        }
        // colors read in order c0..c3; c0->P00 (0,0), c1->P30 (0,1),
        // c2->P33 (1,1), c3->P03 (1,0) per the tensor control-point spiral.
        let red = (255u64, 0u64, 0u64);
        let blue = (0u64, 0u64, 255u64);
        let white = (255u64, 255u64, 255u64);
        let green = (0u64, 255u64, 0u64);
        for (r, g, b) in [red, blue, white, green] {
            coords.push((r, 8));
            coords.push((g, 8));
            coords.push((b, 8));
        }
        let data = pack_bits(&coords);
        let stream = MeshStreamDescriptor {
            bits_per_coordinate: 16,
            bits_per_component: 8,
            bits_per_flag: 8,
            decode: vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            data,
            color_components: 3,
            vertices_per_row: None,
        };
        let descriptor = base_descriptor(7, stream);
        let converter = build_converter(&descriptor.color_space).unwrap();
        let mesh = build_patch_mesh(&descriptor, &converter).unwrap();
        assert_eq!(mesh.patches.len(), 1);
        let patch = &mesh.patches[0];
        assert_eq!(patch.sample(0.0, 0.0).1, [255, 0, 0, 255]);
        assert_eq!(patch.sample(1.0, 0.0).1, [0, 255, 0, 255]);
        assert_eq!(patch.sample(0.0, 1.0).1, [0, 0, 255, 255]);
        assert_eq!(patch.sample(1.0, 1.0).1, [255, 255, 255, 255]);
    }
}
