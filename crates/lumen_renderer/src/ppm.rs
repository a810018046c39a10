//! Plain-text PPM (`P3`) output and 8-bit color conversion.

use crate::{ImageBuffer, PixelSink, RenderError, RenderResult};
use lumen_math::{Color, Interval};
use std::io::Write;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
///
/// Channels outside [0, 1] mean the light transport math went wrong
/// somewhere, so they are reported rather than clamped.
pub fn color_to_rgb8(color: Color) -> RenderResult<[u8; 3]> {
    let mut rgb = [0u8; 3];
    for (value, (channel, out)) in color
        .to_array()
        .into_iter()
        .zip(["red", "green", "blue"].into_iter().zip(rgb.iter_mut()))
    {
        if !Interval::UNIT.contains(value) {
            return Err(RenderError::ColorOutOfRange {
                color,
                channel,
                value,
            });
        }
        *out = (255.999 * linear_to_gamma(value)) as u8;
    }
    Ok(rgb)
}

impl ImageBuffer {
    /// Convert to gamma-corrected RGB bytes, 3 per pixel, raster order.
    pub fn to_rgb8(&self) -> RenderResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color)?);
        }
        Ok(bytes)
    }
}

/// Streams pixels to a writer as an ASCII PPM image.
///
/// Header `P3`, `<width> <height>`, `255`, then one `R G B` line per pixel.
pub struct PpmEncoder<W: Write> {
    writer: W,
    expected: usize,
    written: usize,
}

impl<W: Write> PpmEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            expected: 0,
            written: 0,
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PixelSink for PpmEncoder<W> {
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.expected = width as usize * height as usize;
        self.written = 0;
        write!(self.writer, "P3\n{} {}\n255\n", width, height)?;
        Ok(())
    }

    fn write_pixel(&mut self, color: Color) -> RenderResult<()> {
        if self.written >= self.expected {
            return Err(RenderError::SizeMismatch {
                expected: self.expected,
                actual: self.written + 1,
            });
        }
        let [r, g, b] = color_to_rgb8(color)?;
        writeln!(self.writer, "{} {} {}", r, g, b)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> RenderResult<()> {
        if self.written != self.expected {
            return Err(RenderError::SizeMismatch {
                expected: self.expected,
                actual: self.written,
            });
        }
        self.writer.flush()?;
        Ok(())
    }
}
