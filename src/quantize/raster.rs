use crate::error::{AnalysisError, Result};
use crate::types::Region;

/// A decoded image as straight RGBA8 pixels in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl RasterImage {
    /// Wrap a tightly packed RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ImageDecode`] if `data` is not `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AnalysisError::ImageDecode(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        let pixels = data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Decode PNG bytes. Palette, grayscale and 16-bit images are normalized to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ImageDecode`] for corrupt or truncated data.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let data = &buf[..info.buffer_size()];

        let pixels: Vec<[u8; 4]> = match info.color_type {
            png::ColorType::Rgba => data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]).collect(),
            png::ColorType::Rgb => data.chunks_exact(3).map(|p| [p[0], p[1], p[2], 255]).collect(),
            png::ColorType::GrayscaleAlpha => data.chunks_exact(2).map(|p| [p[0], p[0], p[0], p[1]]).collect(),
            png::ColorType::Grayscale => data.iter().map(|&v| [v, v, v, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(AnalysisError::ImageDecode(
                    "indexed PNG was not expanded to RGB".to_string(),
                ))
            }
        };

        if pixels.len() != info.width as usize * info.height as usize {
            return Err(AnalysisError::ImageDecode(format!(
                "decoded {} pixels for a {}x{} image",
                pixels.len(),
                info.width,
                info.height
            )));
        }

        Ok(Self {
            width: info.width,
            height: info.height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Copy out `region`, clamped to the image bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidRegion`] if nothing of the region lies inside the image.
    pub fn crop(&self, region: Region) -> Result<RasterImage> {
        let left = region.left.min(self.width);
        let top = region.top.min(self.height);
        let right = region.left.saturating_add(region.width).min(self.width);
        let bottom = region.top.saturating_add(region.height).min(self.height);

        if right <= left || bottom <= top {
            return Err(AnalysisError::invalid_region(format!(
                "region {}x{} at ({}, {}) is empty inside a {}x{} image",
                region.width, region.height, region.left, region.top, self.width, self.height
            )));
        }

        let width = right - left;
        let height = bottom - top;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in top..bottom {
            let row = y as usize * self.width as usize;
            pixels.extend_from_slice(&self.pixels[row + left as usize..row + right as usize]);
        }
        Ok(RasterImage { width, height, pixels })
    }

    /// Bilinear resample so the longer side is at most `max_side`, keeping the aspect ratio.
    /// Images already small enough are returned unchanged.
    pub fn downsample(&self, max_side: u32) -> RasterImage {
        let max_side = max_side.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_side || self.pixels.is_empty() {
            return self.clone();
        }

        let scale = max_side as f64 / longest as f64;
        let out_w = ((self.width as f64 * scale).round() as u32).clamp(1, max_side);
        let out_h = ((self.height as f64 * scale).round() as u32).clamp(1, max_side);
        let sx = self.width as f64 / out_w as f64;
        let sy = self.height as f64 / out_h as f64;

        let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize);
        for oy in 0..out_h {
            let (y0, y1, fy) = sample_axis(oy, sy, self.height);
            for ox in 0..out_w {
                let (x0, x1, fx) = sample_axis(ox, sx, self.width);
                let tl = self.pixel(x0, y0);
                let tr = self.pixel(x1, y0);
                let bl = self.pixel(x0, y1);
                let br = self.pixel(x1, y1);
                let mut out = [0u8; 4];
                for c in 0..4 {
                    let top = tl[c] as f64 * (1.0 - fx) + tr[c] as f64 * fx;
                    let bottom = bl[c] as f64 * (1.0 - fx) + br[c] as f64 * fx;
                    out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
                }
                pixels.push(out);
            }
        }

        RasterImage {
            width: out_w,
            height: out_h,
            pixels,
        }
    }
}

/// Map an output index to its two neighbouring source indices and the blend factor,
/// sampling at pixel centers.
fn sample_axis(out: u32, scale: f64, len: u32) -> (u32, u32, f64) {
    let src = ((out as f64 + 0.5) * scale - 0.5).clamp(0.0, (len - 1) as f64);
    let i0 = src.floor() as u32;
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, src - i0 as f64)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::RasterImage;

    /// Solid `width x height` image.
    pub fn solid(width: u32, height: u32, px: [u8; 4]) -> RasterImage {
        let data: Vec<u8> = std::iter::repeat(px).take((width * height) as usize).flatten().collect();
        RasterImage::from_rgba(width, height, &data).unwrap()
    }

    /// Left `split` columns are `left`, the rest `right`.
    pub fn two_tone(width: u32, height: u32, split: u32, left: [u8; 4], right: [u8; 4]) -> RasterImage {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..height {
            for x in 0..width {
                data.extend_from_slice(if x < split { &left } else { &right });
            }
        }
        RasterImage::from_rgba(width, height, &data).unwrap()
    }

    /// Encode as an 8-bit PNG of the given color type.
    pub fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buffer
    }
}
