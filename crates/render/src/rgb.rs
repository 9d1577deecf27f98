mod color;

use std::ops;

pub use self::color::{Color, ParseColorError};

pub type Idx = [u32; 2];

/// Owned raster of RGB texels, stored row by row.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    dim: Idx,
    buf: Vec<Color>,
}

impl Image {
    pub fn new(dim @ [dx, dy]: Idx, fill: Color) -> Image {
        Image { dim, buf: vec![fill; dx as usize * dy as usize] }
    }
    pub fn from_raw(dim @ [dx, dy]: Idx, buf: Vec<Color>) -> Option<Image> {
        if dx as usize * dy as usize != buf.len() {
            return None;
        }
        Some(Image { dim, buf })
    }
    pub fn by_row(&self) -> impl Iterator<Item = Idx> {
        let [dx, dy] = self.dim;
        (0..dy).flat_map(move |y| (0..dx).map(move |x| [x, y]))
    }
    pub fn buf(&self) -> &[Color] {
        &self.buf
    }
    pub fn buf_mut(&mut self) -> &mut [Color] {
        &mut self.buf
    }
    pub fn dim(&self) -> Idx {
        self.dim
    }
    pub fn width(&self) -> u32 {
        self.dim[0]
    }
    pub fn height(&self) -> u32 {
        self.dim[1]
    }
    pub fn get(&self, idx: Idx) -> Option<Color> {
        self.linear(idx).map(|l| self.buf[l])
    }
    pub fn fill(&mut self, color: Color) {
        self.buf.fill(color)
    }
    /// Mutable access to one row.
    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [Color] {
        let start = (y * self.dim[0]) as usize;
        let end = start + self.dim[0] as usize;
        &mut self.buf[start..end]
    }
    fn linear(&self, idx: Idx) -> Option<usize> {
        if !(idx[0] < self.dim[0] && idx[1] < self.dim[1]) {
            return None;
        }
        Some(idx[0] as usize + idx[1] as usize * self.dim[0] as usize)
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image({}x{})", self.dim[0], self.dim[1])
    }
}

impl ops::Index<Idx> for Image {
    type Output = Color;

    fn index(&self, index: Idx) -> &Self::Output {
        let l = self.linear(index).unwrap();
        &self.buf()[l]
    }
}

impl ops::IndexMut<Idx> for Image {
    fn index_mut(&mut self, index: Idx) -> &mut Self::Output {
        let l = self.linear(index).unwrap();
        &mut self.buf_mut()[l]
    }
}
