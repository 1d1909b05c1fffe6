//! Histogram-of-oriented-gradients descriptor.
//!
//! Follows the classic Dalal–Triggs layout as popularised by scikit-image:
//! unsigned orientations, hard binning per cell (no interpolation), cell
//! histograms averaged over the cell area, overlapping block normalization,
//! and block-major output order.

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::math::matrix::Matrix;

const EPS: f64 = 1e-5;
const L2_HYS_CLIP: f64 = 0.2;

/// Block normalization method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockNorm {
    #[serde(rename = "L1")]
    L1,
    #[serde(rename = "L1-sqrt")]
    L1Sqrt,
    #[serde(rename = "L2")]
    L2,
    #[default]
    #[serde(rename = "L2-Hys")]
    L2Hys,
}

/// Descriptor parameters. Cells and blocks are square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HogParams {
    pub orientations: usize,
    pub pixels_per_cell: u32,
    pub cells_per_block: u32,
    #[serde(default)]
    pub block_norm: BlockNorm,
}

impl Default for HogParams {
    fn default() -> Self {
        HogParams {
            orientations: 9,
            pixels_per_cell: 8,
            cells_per_block: 2,
            block_norm: BlockNorm::L2Hys,
        }
    }
}

impl HogParams {
    pub fn with_cell(pixels_per_cell: u32) -> Self {
        HogParams { pixels_per_cell, ..HogParams::default() }
    }

    /// Number of blocks along one axis of a `resolution`-pixel square image,
    /// or `None` if not even one block fits.
    pub fn blocks_per_axis(&self, resolution: u32) -> Option<usize> {
        if self.pixels_per_cell == 0 || self.cells_per_block == 0 || self.orientations == 0 {
            return None;
        }
        let cells = resolution / self.pixels_per_cell;
        if cells < self.cells_per_block {
            return None;
        }
        Some((cells - self.cells_per_block + 1) as usize)
    }

    /// Descriptor length for a square image:
    /// `blocks_per_axis² × cells_per_block² × orientations`.
    pub fn descriptor_len(&self, resolution: u32) -> Option<usize> {
        let blocks = self.blocks_per_axis(resolution)?;
        let cpb = self.cells_per_block as usize;
        Some(blocks * blocks * cpb * cpb * self.orientations)
    }
}

/// Computes the descriptor of a single-channel image (`rows × cols`).
pub fn hog(gray: &Matrix, params: &HogParams) -> Result<Vec<f64>, FeatureError> {
    let too_small = FeatureError::ImageTooSmall {
        resolution: gray.rows.min(gray.cols) as u32,
        pixels_per_cell: params.pixels_per_cell,
        cells_per_block: params.cells_per_block,
    };
    if params.pixels_per_cell == 0 || params.cells_per_block == 0 || params.orientations == 0 {
        return Err(too_small);
    }

    let ppc = params.pixels_per_cell as usize;
    let cpb = params.cells_per_block as usize;
    let n_orient = params.orientations;
    let cells_row = gray.rows / ppc;
    let cells_col = gray.cols / ppc;
    if cells_row < cpb || cells_col < cpb {
        return Err(too_small);
    }

    let (magnitude, orientation) = gradients(gray);
    let hist = cell_histograms(&magnitude, &orientation, cells_row, cells_col, ppc, n_orient);

    let blocks_row = cells_row - cpb + 1;
    let blocks_col = cells_col - cpb + 1;
    let block_len = cpb * cpb * n_orient;
    let mut out = Vec::with_capacity(blocks_row * blocks_col * block_len);
    let mut block = Vec::with_capacity(block_len);

    for r in 0..blocks_row {
        for c in 0..blocks_col {
            block.clear();
            for br in 0..cpb {
                for bc in 0..cpb {
                    let start = ((r + br) * cells_col + (c + bc)) * n_orient;
                    block.extend_from_slice(&hist[start..start + n_orient]);
                }
            }
            normalize_block(&mut block, params.block_norm);
            out.extend_from_slice(&block);
        }
    }

    Ok(out)
}

/// Central-difference gradients, zero on the border rows/columns.
/// Returns (magnitude, unsigned orientation in degrees `[0, 180)`).
fn gradients(gray: &Matrix) -> (Matrix, Matrix) {
    let (rows, cols) = (gray.rows, gray.cols);
    let mut magnitude = Matrix::zeros(rows, cols);
    let mut orientation = Matrix::zeros(rows, cols);

    for r in 0..rows {
        for c in 0..cols {
            let g_row = if r > 0 && r + 1 < rows {
                gray.data[r + 1][c] - gray.data[r - 1][c]
            } else {
                0.0
            };
            let g_col = if c > 0 && c + 1 < cols {
                gray.data[r][c + 1] - gray.data[r][c - 1]
            } else {
                0.0
            };
            magnitude.data[r][c] = g_col.hypot(g_row);
            let mut angle = g_row.atan2(g_col).to_degrees().rem_euclid(180.0);
            if angle >= 180.0 {
                angle = 0.0;
            }
            orientation.data[r][c] = angle;
        }
    }

    (magnitude, orientation)
}

/// Per-cell orientation histograms, laid out as `[cell_row][cell_col][bin]`.
fn cell_histograms(
    magnitude: &Matrix,
    orientation: &Matrix,
    cells_row: usize,
    cells_col: usize,
    ppc: usize,
    n_orient: usize,
) -> Vec<f64> {
    let bin_width = 180.0 / n_orient as f64;
    let cell_area = (ppc * ppc) as f64;
    let mut hist = vec![0.0; cells_row * cells_col * n_orient];

    for cr in 0..cells_row {
        for cc in 0..cells_col {
            let base = (cr * cells_col + cc) * n_orient;
            for r in cr * ppc..(cr + 1) * ppc {
                for c in cc * ppc..(cc + 1) * ppc {
                    let bin = orientation_bin(orientation.data[r][c], bin_width, n_orient);
                    hist[base + bin] += magnitude.data[r][c];
                }
            }
            for v in &mut hist[base..base + n_orient] {
                *v /= cell_area;
            }
        }
    }

    hist
}

/// Bin `i` covers `[i·width, (i+1)·width)`.
fn orientation_bin(angle: f64, bin_width: f64, n_orient: usize) -> usize {
    let mut bin = ((angle / bin_width) as usize).min(n_orient - 1);
    // Nudge across float rounding at the bin edges.
    while bin > 0 && angle < bin_width * bin as f64 {
        bin -= 1;
    }
    while bin + 1 < n_orient && angle >= bin_width * (bin + 1) as f64 {
        bin += 1;
    }
    bin
}

fn normalize_block(block: &mut [f64], norm: BlockNorm) {
    match norm {
        BlockNorm::L1 => {
            let denom = block.iter().map(|v| v.abs()).sum::<f64>() + EPS;
            block.iter_mut().for_each(|v| *v /= denom);
        }
        BlockNorm::L1Sqrt => {
            let denom = block.iter().map(|v| v.abs()).sum::<f64>() + EPS;
            block.iter_mut().for_each(|v| *v = (*v / denom).sqrt());
        }
        BlockNorm::L2 => l2_normalize(block),
        BlockNorm::L2Hys => {
            l2_normalize(block);
            block.iter_mut().for_each(|v| *v = v.min(L2_HYS_CLIP));
            l2_normalize(block);
        }
    }
}

fn l2_normalize(block: &mut [f64]) {
    let denom = (block.iter().map(|v| v * v).sum::<f64>() + EPS * EPS).sqrt();
    block.iter_mut().for_each(|v| *v /= denom);
}
