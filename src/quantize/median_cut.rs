use std::ops::Range;

use super::{mean_color, sort_by_weight, Quantizer};
use crate::types::WeightedColor;

/// Median-cut palette: split the box with the widest channel range at its
/// median until there are `k` boxes or nothing is left to split.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, pixels: &[[u8; 4]], k: usize) -> Vec<WeightedColor> {
        if pixels.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut work = pixels.to_vec();
        let mut boxes: Vec<Range<usize>> = vec![0..work.len()];

        while boxes.len() < k {
            let Some((idx, channel)) = widest_box(&work, &boxes) else {
                break;
            };
            let range = boxes[idx].clone();
            // Stable sort keeps the split deterministic for equal channel values
            work[range.clone()].sort_by_key(|px| px[channel]);
            let mid = range.start + range.len() / 2;
            boxes[idx] = range.start..mid;
            boxes.insert(idx + 1, mid..range.end);
        }

        let total = work.len() as f64;
        let mut palette: Vec<WeightedColor> = Vec::with_capacity(boxes.len());
        for range in boxes {
            let weight = range.len() as f64 / total;
            let color = mean_color(&work[range]);
            // Boxes split off a uniform run can share a mean; report it once
            match palette.iter_mut().find(|w| w.color == color) {
                Some(existing) => existing.weight += weight,
                None => palette.push(WeightedColor { color, weight }),
            }
        }
        sort_by_weight(&mut palette);
        palette
    }
}

/// The first box with the largest single-channel range, and that channel.
/// Boxes of one pixel or one color cannot be split and are skipped.
fn widest_box(pixels: &[[u8; 4]], boxes: &[Range<usize>]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, u8)> = None;
    for (idx, range) in boxes.iter().enumerate() {
        if range.len() < 2 {
            continue;
        }
        let (channel, spread) = widest_channel(&pixels[range.clone()]);
        if spread == 0 {
            continue;
        }
        if best.map_or(true, |(_, _, s)| spread > s) {
            best = Some((idx, channel, spread));
        }
    }
    best.map(|(idx, channel, _)| (idx, channel))
}

fn widest_channel(pixels: &[[u8; 4]]) -> (usize, u8) {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for px in pixels {
        for c in 0..3 {
            lo[c] = lo[c].min(px[c]);
            hi[c] = hi[c].max(px[c]);
        }
    }
    (0..3)
        .map(|c| (c, hi[c].saturating_sub(lo[c])))
        .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::color::Rgb;
    use approx::assert_relative_eq;

    #[test]
    fn single_color_is_one_entry() {
        let pixels = vec![[10, 20, 30, 255]; 50];
        let palette = MedianCut.quantize(&pixels, 5);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].color.rgb(), Rgb::new(10, 20, 30));
        assert_eq!(palette[0].weight, 1.0);
    }

    #[test]
    fn two_colors_split_by_count() {
        let mut pixels = vec![[0, 0, 0, 255]; 30];
        pixels.extend(vec![[255, 255, 255, 255]; 70]);
        let palette = MedianCut.quantize(&pixels, 2);
        assert_eq!(palette.len(), 2);
        // Median split of 100 pixels lands at 50, mixing the halves
        assert_relative_eq!(palette[0].weight + palette[1].weight, 1.0);
        assert_eq!(palette[0].weight, 0.5);
    }

    #[test]
    fn k_one_is_the_mean() {
        let pixels = vec![[0, 0, 0, 255], [100, 200, 50, 255]];
        let palette = MedianCut.quantize(&pixels, 1);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].color.rgb(), Rgb::new(50, 100, 25));
    }

    #[test]
    fn splits_along_widest_channel() {
        // Green varies the most; red barely moves
        let pixels: Vec<[u8; 4]> = (0..8u8).map(|i| [i, i * 30, 0, 255]).collect();
        let palette = MedianCut.quantize(&pixels, 2);
        let mut greens: Vec<u8> = palette.iter().map(|w| w.color.g).collect();
        greens.sort_unstable();
        assert_eq!(greens, vec![45, 165]);
    }

    #[test]
    fn equal_means_are_merged() {
        let mut pixels = vec![[20, 20, 20, 255]; 25];
        pixels.extend(vec![[200, 30, 30, 255]; 75]);
        let palette = MedianCut.quantize(&pixels, 5);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].color.rgb(), Rgb::new(200, 30, 30));
        assert_relative_eq!(palette[0].weight, 0.75);
    }

    #[test]
    fn mean_alpha_is_kept() {
        let pixels = vec![[255, 0, 0, 0], [255, 0, 0, 255]];
        let palette = MedianCut.quantize(&pixels, 3);
        assert_eq!(palette.len(), 1);
        assert_relative_eq!(palette[0].color.alpha, 127.5 / 255.0);
    }
}
