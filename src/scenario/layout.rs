//! 节点布局
//!
//! 基站排成网格，行数取 `floor(sqrt(n))`（至少 1），列数 `ceil(n / rows)`，
//! 与区域边界留出相等的间距。终端在正方形内均匀随机撒点。

use rand::Rng;

use crate::lte::Vector3;

pub const ENB_HEIGHT_M: f64 = 30.0;
pub const UE_HEIGHT_M: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: u16,
    pub cols: u16,
    pub dx: f64,
    pub dy: f64,
    half: f64,
}

impl GridLayout {
    pub fn new(n_cells: u16, area_size: f64) -> Self {
        let rows = (f64::from(n_cells).sqrt().floor() as u16).max(1);
        let cols = n_cells.div_ceil(rows).max(1);
        Self {
            rows,
            cols,
            dx: area_size / (f64::from(cols) + 1.0),
            dy: area_size / (f64::from(rows) + 1.0),
            half: area_size / 2.0,
        }
    }

    /// 网格槽位总数（可能多于基站数，多出来的槽位空着）
    pub fn slots(&self) -> u32 {
        u32::from(self.rows) * u32::from(self.cols)
    }

    /// 第 i 个基站的 (行, 列)
    pub fn cell(&self, i: u16) -> (u16, u16) {
        (i / self.cols, i % self.cols)
    }

    pub fn position(&self, i: u16) -> Vector3 {
        let (row, col) = self.cell(i);
        Vector3::new(
            -self.half + (f64::from(col) + 1.0) * self.dx,
            -self.half + (f64::from(row) + 1.0) * self.dy,
            ENB_HEIGHT_M,
        )
    }

    pub fn positions(&self, n_cells: u16) -> Vec<Vector3> {
        (0..n_cells).map(|i| self.position(i)).collect()
    }
}

/// 在 `[-area/2, area/2]²` 内均匀抽取终端初始位置
pub fn random_endpoint_positions<R: Rng>(n: u32, area_size: f64, rng: &mut R) -> Vec<Vector3> {
    let half = area_size / 2.0;
    (0..n)
        .map(|_| {
            let x = rng.gen_range(-half..=half);
            let y = rng.gen_range(-half..=half);
            Vector3::new(x, y, UE_HEIGHT_M)
        })
        .collect()
}
