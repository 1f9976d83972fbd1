use super::Transform;
use crate::vector::Vector4;

/// Number of active input dimensions of a CLUT, 1 through 4.
pub type ClutDimension = u8;

/// An N-dimensional grid of 4-lane samples (N in 1..=4), evaluated with
/// tetrahedral interpolation for N=3/4 and full multilinear interpolation
/// otherwise. Dimension 0 varies fastest in the backing table.
#[derive(Debug, Clone)]
pub struct Clut {
    dims: usize,
    grid_sizes: [usize; 4],
    strides: [usize; 4],
    table: Vec<Vector4>,
}

impl Clut {
    /// `grid_sizes` has one entry per active dimension (length = `dims`).
    /// `table` is row-major with dimension 0 fastest, length
    /// `product(grid_sizes)`.
    pub fn new(dims: usize, grid_sizes: &[usize], table: Vec<Vector4>) -> Self {
        assert!((1..=4).contains(&dims), "CLUT dims must be 1..=4");
        assert_eq!(grid_sizes.len(), dims);
        let mut sizes = [1usize; 4];
        let mut strides = [0usize; 4];
        let mut stride = 1usize;
        for d in 0..dims {
            sizes[d] = grid_sizes[d];
            strides[d] = stride;
            stride = stride.saturating_mul(grid_sizes[d]);
        }
        Clut {
            dims,
            grid_sizes: sizes,
            strides,
            table,
        }
    }

    fn sample(&self, indices: [usize; 4]) -> Vector4 {
        let mut offset = 0usize;
        for d in 0..self.dims {
            offset += indices[d].min(self.grid_sizes[d] - 1) * self.strides[d];
        }
        self.table[offset]
    }

    /// Grid coordinates (floor index + fraction) per lane, scaled by
    /// `grid_size - 1` and clamped so the top corner is always reachable.
    fn grid_coords(&self, v: Vector4) -> ([usize; 4], [f32; 4]) {
        let lanes = [v.x, v.y, v.z, v.w];
        let mut floor_idx = [0usize; 4];
        let mut frac = [0f32; 4];
        for d in 0..self.dims {
            let max_index = (self.grid_sizes[d] - 1) as f32;
            let scaled = (lanes[d] * max_index).clamp(0.0, max_index - 1e-5_f32.min(max_index));
            let fi = scaled.floor();
            floor_idx[d] = fi as usize;
            frac[d] = scaled - fi;
        }
        (floor_idx, frac)
    }

    fn evaluate_tetrahedral_3d(&self, floor_idx: [usize; 4], frac: [f32; 4]) -> Vector4 {
        let base = self.sample(floor_idx);
        let mut next = [floor_idx; 3];
        for (d, n) in next.iter_mut().enumerate() {
            n[d] += 1;
        }
        let c_x = self.sample(next[0]);
        let c_y = self.sample(next[1]);
        let c_z = self.sample(next[2]);

        // Order fractional components descending with a branchless sorting
        // network over (value, axis) pairs; equal values do not swap.
        let mut order = [(frac[0], 0usize), (frac[1], 1usize), (frac[2], 2usize)];
        if order[0].0 < order[1].0 {
            order.swap(0, 1);
        }
        if order[1].0 < order[2].0 {
            order.swap(1, 2);
        }
        if order[0].0 < order[1].0 {
            order.swap(0, 1);
        }

        let corner_for_axis = |axis: usize| match axis {
            0 => c_x,
            1 => c_y,
            _ => c_z,
        };

        let (a, axis_a) = order[0];
        let (b, axis_b) = order[1];
        let (c, axis_c) = order[2];

        let w0 = 1.0 - a;
        let w1 = a - b;
        let w2 = b - c;
        let w3 = c;

        base * w0
            + corner_for_axis(axis_a) * w1
            + self.sample(self.combined_corner(floor_idx, &[axis_a, axis_b])) * w2
            + self.sample(self.combined_corner(floor_idx, &[axis_a, axis_b, axis_c])) * w3
    }

    fn combined_corner(&self, floor_idx: [usize; 4], axes: &[usize]) -> [usize; 4] {
        let mut idx = floor_idx;
        for &axis in axes {
            idx[axis] += 1;
        }
        idx
    }

    fn evaluate_tetrahedral_4d(&self, floor_idx: [usize; 4], frac: [f32; 4]) -> Vector4 {
        let mut order = [
            (frac[0], 0usize),
            (frac[1], 1usize),
            (frac[2], 2usize),
            (frac[3], 3usize),
        ];
        // Insertion sort, descending, stable on ties.
        for i in 1..order.len() {
            let mut j = i;
            while j > 0 && order[j - 1].0 < order[j].0 {
                order.swap(j - 1, j);
                j -= 1;
            }
        }

        let weights = [
            1.0 - order[0].0,
            order[0].0 - order[1].0,
            order[1].0 - order[2].0,
            order[2].0 - order[3].0,
            order[3].0,
        ];

        let mut result = self.sample(floor_idx) * weights[0];
        let mut active_axes: Vec<usize> = Vec::with_capacity(4);
        for (vertex, &(_, axis)) in order.iter().enumerate() {
            active_axes.push(axis);
            result = result + self.sample(self.combined_corner(floor_idx, &active_axes)) * weights[vertex + 1];
        }
        result
    }

    fn evaluate_multilinear(&self, floor_idx: [usize; 4], frac: [f32; 4]) -> Vector4 {
        let corner_count = 1usize << self.dims;
        let mut result = Vector4::ZERO;
        for corner in 0..corner_count {
            let mut weight = 1f32;
            let mut idx = floor_idx;
            for d in 0..self.dims {
                if (corner >> d) & 1 == 1 {
                    idx[d] += 1;
                    weight *= frac[d];
                } else {
                    weight *= 1.0 - frac[d];
                }
            }
            if weight < 1e-5 {
                continue;
            }
            result = result + self.sample(idx) * weight;
        }
        result
    }
}

impl Transform for Clut {
    fn is_identity(&self) -> bool {
        false
    }

    fn transform(&self, v: Vector4) -> Vector4 {
        let (floor_idx, frac) = self.grid_coords(v);
        match self.dims {
            3 => self.evaluate_tetrahedral_3d(floor_idx, frac),
            4 => self.evaluate_tetrahedral_4d(floor_idx, frac),
            _ => self.evaluate_multilinear(floor_idx, frac),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_3d_table(n: usize) -> Vec<Vector4> {
        let mut table = vec![Vector4::ZERO; n * n * n];
        for b in 0..n {
            for g in 0..n {
                for r in 0..n {
                    let idx = (b * n + g) * n + r;
                    let s = (n - 1) as f32;
                    table[idx] = Vector4::new(r as f32 / s, g as f32 / s, b as f32 / s, 1.0);
                }
            }
        }
        table
    }

    #[test]
    fn tetrahedral_matches_multilinear_on_grid_vertices() {
        let n = 5;
        let table = identity_3d_table(n);
        let clut = Clut::new(3, &[n, n, n], table);

        for r in 0..n {
            for g in 0..n {
                for b in 0..n {
                    let s = (n - 1) as f32;
                    let v = Vector4::new(r as f32 / s, g as f32 / s, b as f32 / s, 1.0);
                    let out = clut.transform(v);
                    assert!((out.x - v.x).abs() < 1e-4);
                    assert!((out.y - v.y).abs() < 1e-4);
                    assert!((out.z - v.z).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn tetrahedral_3d_interior_point_agrees_with_multilinear() {
        let n = 3;
        let table = identity_3d_table(n);
        let clut = Clut::new(3, &[n, n, n], table);

        let v = Vector4::new(0.37, 0.81, 0.12, 1.0);
        let (floor_idx, frac) = clut.grid_coords(v);
        let tetra = clut.evaluate_tetrahedral_3d(floor_idx, frac);
        let multi = clut.evaluate_multilinear(floor_idx, frac);
        assert!((tetra.x - multi.x).abs() < 5e-2);
        assert!((tetra.y - multi.y).abs() < 5e-2);
        assert!((tetra.z - multi.z).abs() < 5e-2);
    }

    #[test]
    fn clut_upper_boundary_does_not_panic_and_returns_top_corner() {
        let n = 4;
        let table = identity_3d_table(n);
        let clut = Clut::new(3, &[n, n, n], table);
        let v = Vector4::new(1.0, 1.0, 1.0, 1.0);
        let out = clut.transform(v);
        assert!((out.x - 1.0).abs() < 1e-3);
        assert!((out.y - 1.0).abs() < 1e-3);
        assert!((out.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn one_dimensional_clut_uses_multilinear_path() {
        let table = vec![Vector4::new(0.0, 0.0, 0.0, 1.0), Vector4::new(1.0, 1.0, 1.0, 1.0)];
        let clut = Clut::new(1, &[2], table);
        let out = clut.transform(Vector4::new(0.5, 0.0, 0.0, 1.0));
        assert!((out.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn four_dimensional_tetrahedral_matches_multilinear_on_vertices() {
        let n = 2;
        let mut table = Vec::with_capacity(n * n * n * n);
        for _k in 0..n {
            for _b in 0..n {
                for _g in 0..n {
                    for _r in 0..n {
                        table.push(Vector4::new(_r as f32, _g as f32, _b as f32, _k as f32));
                    }
                }
            }
        }
        let clut = Clut::new(4, &[n, n, n, n], table);
        let v = Vector4::new(1.0, 0.0, 1.0, 0.0);
        let out = clut.transform(v);
        assert_eq!(out, Vector4::new(1.0, 0.0, 1.0, 0.0));
    }
}
