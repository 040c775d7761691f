//! Static point locator over a fixed point cloud.
//!
//! Curvilinear adjacency probes face corners against the points of a
//! neighbor's face. The locator bins the points of one face into a uniform
//! grid over their bounding box and answers nearest-point queries by
//! searching bins in expanding shells. It is per-block scratch built during
//! adjacency solving and never shared across threads.

/// Uniform-bin nearest-point locator over a borrowed point slice.
pub struct StaticPointLocator<'a> {
    points: &'a [[f64; 3]],
    bounds: [f64; 6],
    divisions: [usize; 3],
    bin_size: [f64; 3],
    /// Point indices grouped per bin, CSR-style.
    offsets: Vec<u32>,
    entries: Vec<u32>,
}

impl<'a> StaticPointLocator<'a> {
    /// Build a locator over `points`. Empty inputs yield a locator whose
    /// queries return `None`.
    pub fn build(points: &'a [[f64; 3]]) -> Self {
        let mut bounds = [f64::MAX, f64::MIN, f64::MAX, f64::MIN, f64::MAX, f64::MIN];
        for p in points {
            for d in 0..3 {
                bounds[2 * d] = bounds[2 * d].min(p[d]);
                bounds[2 * d + 1] = bounds[2 * d + 1].max(p[d]);
            }
        }
        // Aim for a handful of points per bin; faces are 2D so one axis
        // usually collapses to a single division.
        let target = ((points.len() as f64).cbrt().ceil() as usize).max(1);
        let mut divisions = [1usize; 3];
        let mut bin_size = [1.0f64; 3];
        for d in 0..3 {
            let span = bounds[2 * d + 1] - bounds[2 * d];
            if span > 0.0 {
                divisions[d] = target;
                bin_size[d] = span / target as f64;
            }
        }

        let nbins = divisions[0] * divisions[1] * divisions[2];
        let mut counts = vec![0u32; nbins + 1];
        let bin_of = |p: &[f64; 3]| -> usize {
            let mut idx = [0usize; 3];
            for d in 0..3 {
                if divisions[d] > 1 {
                    let t = ((p[d] - bounds[2 * d]) / bin_size[d]) as usize;
                    idx[d] = t.min(divisions[d] - 1);
                }
            }
            (idx[2] * divisions[1] + idx[1]) * divisions[0] + idx[0]
        };
        for p in points {
            counts[bin_of(p) + 1] += 1;
        }
        for b in 1..=nbins {
            counts[b] += counts[b - 1];
        }
        let offsets = counts.clone();
        let mut cursor = counts;
        let mut entries = vec![0u32; points.len()];
        for (i, p) in points.iter().enumerate() {
            let b = bin_of(p);
            entries[cursor[b] as usize] = i as u32;
            cursor[b] += 1;
        }

        StaticPointLocator {
            points,
            bounds,
            divisions,
            bin_size,
            offsets,
            entries,
        }
    }

    #[inline]
    fn bin_index(&self, p: [f64; 3]) -> [i64; 3] {
        let mut idx = [0i64; 3];
        for d in 0..3 {
            if self.divisions[d] > 1 {
                let t = ((p[d] - self.bounds[2 * d]) / self.bin_size[d]).floor() as i64;
                idx[d] = t.clamp(0, self.divisions[d] as i64 - 1);
            }
        }
        idx
    }

    /// Index of the point closest to `p`, or `None` for an empty cloud.
    pub fn find_closest(&self, p: [f64; 3]) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        let home = self.bin_index(p);
        let max_shell = self.divisions.iter().max().copied().unwrap_or(1) as i64;

        let mut best: Option<(usize, f64)> = None;
        for shell in 0..=max_shell {
            self.visit_shell(home, shell, |idx| {
                let q = self.points[idx];
                let d2 = (q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2) + (q[2] - p[2]).powi(2);
                if best.map_or(true, |(_, bd)| d2 < bd) {
                    best = Some((idx, d2));
                }
            });
            // One extra shell after the first hit guards against a closer
            // point straddling a bin boundary.
            if let Some((_, d2)) = best {
                let reach = shell as f64
                    * self
                        .bin_size
                        .iter()
                        .zip(&self.divisions)
                        .filter(|(_, &n)| n > 1)
                        .map(|(s, _)| *s)
                        .fold(f64::MAX, f64::min);
                if shell > 0 && d2.sqrt() <= reach {
                    break;
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Visit all point indices in bins whose Chebyshev distance from `home`
    /// is exactly `shell`.
    fn visit_shell(&self, home: [i64; 3], shell: i64, mut f: impl FnMut(usize)) {
        let range = |d: usize| -> std::ops::RangeInclusive<i64> {
            let lo = (home[d] - shell).max(0);
            let hi = (home[d] + shell).min(self.divisions[d] as i64 - 1);
            lo..=hi
        };
        for k in range(2) {
            for j in range(1) {
                for i in range(0) {
                    let cheb = (i - home[0])
                        .abs()
                        .max((j - home[1]).abs())
                        .max((k - home[2]).abs());
                    if cheb != shell {
                        continue;
                    }
                    let b = (k as usize * self.divisions[1] + j as usize) * self.divisions[0]
                        + i as usize;
                    for e in &self.entries[self.offsets[b] as usize..self.offsets[b + 1] as usize] {
                        f(*e as usize);
                    }
                }
            }
        }
    }
}
