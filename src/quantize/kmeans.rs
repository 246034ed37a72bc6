use std::collections::BTreeMap;

use super::{sort_by_weight, Quantizer};
use crate::config::KMeansConfig;
use crate::math::color::Color;
use crate::types::WeightedColor;

/// Lloyd's k-means in RGB space with k-means++ seeding.
///
/// Pixels are deduplicated into weighted points first, so cost scales with the
/// number of distinct colors. Every restart draws from one seeded generator and
/// the lowest-cost run wins, which makes the palette reproducible.
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(KMeansConfig::default())
    }
}

/// A distinct color and how many pixels carry it.
struct Point {
    rgb: [f64; 3],
    count: f64,
    alpha_sum: f64,
}

struct Run {
    centers: Vec<[f64; 3]>,
    assignment: Vec<usize>,
    cost: f64,
}

impl Quantizer for KMeans {
    fn quantize(&self, pixels: &[[u8; 4]], k: usize) -> Vec<WeightedColor> {
        if pixels.is_empty() || k == 0 {
            return Vec::new();
        }

        let points = distinct_points(pixels);
        let k = k.min(points.len());
        let mut rng = SplitMix64::new(self.config.seed);

        let mut best: Option<Run> = None;
        for _ in 0..self.config.restarts.max(1) {
            let centers = seed_centers(&points, k, &mut rng);
            let run = lloyd(&points, centers, self.config.max_iterations.max(1));
            if best.as_ref().map_or(true, |b| run.cost < b.cost) {
                best = Some(run);
            }
        }
        let Some(best) = best else {
            return Vec::new();
        };

        let mut counts = vec![0.0; best.centers.len()];
        let mut alphas = vec![0.0; best.centers.len()];
        for (point, &cluster) in points.iter().zip(&best.assignment) {
            counts[cluster] += point.count;
            alphas[cluster] += point.alpha_sum;
        }

        let total = pixels.len() as f64;
        let mut palette: Vec<WeightedColor> = best
            .centers
            .iter()
            .enumerate()
            .filter(|(i, _)| counts[*i] > 0.0)
            .map(|(i, center)| {
                let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
                WeightedColor {
                    color: Color::new(
                        channel(center[0]),
                        channel(center[1]),
                        channel(center[2]),
                        alphas[i] / counts[i] / 255.0,
                    ),
                    weight: counts[i] / total,
                }
            })
            .collect();
        sort_by_weight(&mut palette);
        palette
    }
}

fn distinct_points(pixels: &[[u8; 4]]) -> Vec<Point> {
    let mut by_color: BTreeMap<[u8; 3], (u64, u64)> = BTreeMap::new();
    for px in pixels {
        let entry = by_color.entry([px[0], px[1], px[2]]).or_default();
        entry.0 += 1;
        entry.1 += px[3] as u64;
    }
    by_color
        .into_iter()
        .map(|(rgb, (count, alpha_sum))| Point {
            rgb: [rgb[0] as f64, rgb[1] as f64, rgb[2] as f64],
            count: count as f64,
            alpha_sum: alpha_sum as f64,
        })
        .collect()
}

fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Index and squared distance of the nearest center; ties go to the lower index.
fn nearest(point: &[f64; 3], centers: &[[f64; 3]]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, center) in centers.iter().enumerate() {
        let d = distance_sq(point, center);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++: each new center is drawn with probability proportional to
/// pixel count times squared distance to the closest chosen center.
fn seed_centers(points: &[Point], k: usize, rng: &mut SplitMix64) -> Vec<[f64; 3]> {
    let mut centers = Vec::with_capacity(k);
    let weights: Vec<f64> = points.iter().map(|p| p.count).collect();
    centers.push(points[pick_weighted(&weights, rng)].rgb);

    while centers.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| p.count * nearest(&p.rgb, &centers).1)
            .collect();
        if weights.iter().sum::<f64>() <= 0.0 {
            break;
        }
        centers.push(points[pick_weighted(&weights, rng)].rgb);
    }
    centers
}

fn pick_weighted(weights: &[f64], rng: &mut SplitMix64) -> usize {
    let total: f64 = weights.iter().sum();
    let mut target = rng.next_f64() * total;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 && target < w {
            return i;
        }
        target -= w;
    }
    // Rounding left target past the end; take the last candidate
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

fn lloyd(points: &[Point], mut centers: Vec<[f64; 3]>, max_iterations: usize) -> Run {
    let mut assignment = vec![usize::MAX; points.len()];

    for _ in 0..max_iterations {
        let mut changed = false;
        for (slot, point) in assignment.iter_mut().zip(points) {
            let (cluster, _) = nearest(&point.rgb, &centers);
            if *slot != cluster {
                *slot = cluster;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![[0.0; 3]; centers.len()];
        let mut counts = vec![0.0; centers.len()];
        for (point, &cluster) in points.iter().zip(&assignment) {
            for c in 0..3 {
                sums[cluster][c] += point.rgb[c] * point.count;
            }
            counts[cluster] += point.count;
        }
        for (i, center) in centers.iter_mut().enumerate() {
            // An emptied cluster keeps its previous center
            if counts[i] > 0.0 {
                *center = [sums[i][0] / counts[i], sums[i][1] / counts[i], sums[i][2] / counts[i]];
            }
        }
    }

    // Final assignment against the final centers
    let mut cost = 0.0;
    for (slot, point) in assignment.iter_mut().zip(points) {
        let (cluster, d) = nearest(&point.rgb, &centers);
        *slot = cluster;
        cost += d * point.count;
    }

    Run {
        centers,
        assignment,
        cost,
    }
}

/// SplitMix64: small, seedable and good enough to pick initial centers.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::color::Rgb;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn blocks(spec: &[([u8; 3], usize)]) -> Vec<[u8; 4]> {
        spec.iter()
            .flat_map(|&([r, g, b], n)| std::iter::repeat([r, g, b, 255]).take(n))
            .collect()
    }

    #[test]
    fn finds_well_separated_clusters() {
        let pixels = blocks(&[
            ([250, 250, 250], 60),
            ([252, 248, 251], 10),
            ([10, 20, 200], 30),
        ]);
        let palette = KMeans::default().quantize(&pixels, 2);
        assert_eq!(palette.len(), 2);
        assert_relative_eq!(palette[0].weight, 0.7);
        assert_relative_eq!(palette[1].weight, 0.3);
        assert_eq!(palette[1].color.rgb(), Rgb::new(10, 20, 200));
        let light = palette[0].color.rgb();
        assert!(light.r >= 250 && light.g >= 248);
    }

    #[test]
    fn k_capped_by_distinct_colors() {
        let pixels = blocks(&[([0, 0, 0], 5), ([255, 0, 0], 5)]);
        let palette = KMeans::default().quantize(&pixels, 5);
        assert_eq!(palette.len(), 2);
        assert_relative_eq!(palette[0].weight, 0.5);
    }

    #[test]
    fn same_seed_same_palette() {
        let pixels: Vec<[u8; 4]> = (0..=255u8).map(|i| [i, 255 - i, i / 2, 255]).collect();
        let a = KMeans::default().quantize(&pixels, 4);
        let b = KMeans::default().quantize(&pixels, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn keeps_mean_alpha() {
        let pixels = vec![[0, 0, 0, 0], [0, 0, 0, 255]];
        let palette = KMeans::default().quantize(&pixels, 1);
        assert_relative_eq!(palette[0].color.alpha, 127.5 / 255.0);
    }

    #[test]
    fn splitmix_is_in_unit_interval() {
        let mut rng = SplitMix64::new(42);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    proptest! {
        #[test]
        fn weights_sum_to_one(
            pixels in prop::collection::vec(any::<[u8; 4]>(), 1..200),
            k in 1usize..8,
        ) {
            let config = KMeansConfig { seed: 7, restarts: 2, max_iterations: 20 };
            let palette = KMeans::new(config).quantize(&pixels, k);
            prop_assert!(!palette.is_empty());
            prop_assert!(palette.len() <= k);
            let total: f64 = palette.iter().map(|w| w.weight).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
            for pair in palette.windows(2) {
                prop_assert!(pair[0].weight >= pair[1].weight);
            }
        }
    }
}
