use crate::DecodeError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

pub const CANVAS_WIDTH: u32 = 700;
pub const CANVAS_HEIGHT: u32 = 600;

/// Baked background under the shape log, one ARGB word per pixel, row-major.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RasterRepr")]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

#[derive(Deserialize)]
struct RasterRepr {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl TryFrom<RasterRepr> for Raster {
    type Error = DecodeError;

    fn try_from(repr: RasterRepr) -> Result<Self, Self::Error> {
        Raster::from_pixels(repr.width, repr.height, repr.pixels)
    }
}

impl Raster {
    /// Fully transparent buffer.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, DecodeError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| DecodeError(format!("{}x{} overflows", width, height)))?;
        if pixels.len() != expected {
            return Err(DecodeError(format!(
                "{}x{} raster needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, argb: u32) -> bool {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = argb;
            true
        } else {
            false
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl std::default::Default for Raster {
    fn default() -> Self {
        Self::blank(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Converts between file bytes and `Raster`. Decoding must not partially
/// succeed: either a whole raster comes back or an error does.
pub trait RasterCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, DecodeError>;
    fn encode(&self, raster: &Raster) -> Vec<u8>;
}

/// Plain bincode layout of `Raster`, the format peers exchange by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeRasterCodec;

impl RasterCodec for BincodeRasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, DecodeError> {
        bincode::deserialize(bytes).map_err(|e| DecodeError(e.to_string()))
    }

    fn encode(&self, raster: &Raster) -> Vec<u8> {
        bincode::serialize(raster).expect("must succeed")
    }
}
