use itertools::iproduct;

use crate::frc::FrcError;

/// Partition of a square Fourier grid into concentric rings
///
/// Every cell of the `N×N` grid is assigned to the ring
/// `floor(round(|cell - center|) / d_bin)` where `center = (N/2, N/2)`.
/// There are `floor(floor(N/2) / d_bin)` rings, cells past the last ring are left out.
/// The partition is computed once and stored as the cell indices (row-major)
/// sorted by ring, with the start offset of every ring.
#[derive(Debug, Clone)]
pub struct FourierRingIterator {
    side: usize,
    d_bin: f64,
    radii: Vec<f64>,
    cells: Vec<usize>,
    offsets: Vec<usize>,
}
impl FourierRingIterator {
    pub fn new(shape: [usize; 2], d_bin: f64) -> Result<Self, FrcError> {
        let [rows, cols] = shape;
        if rows != cols {
            return Err(FrcError::NonSquareGrid(rows, cols));
        }
        if !(d_bin > 0f64 && d_bin.is_finite()) {
            return Err(FrcError::InvalidBinWidth(d_bin));
        }
        let side = rows;
        let n_bin = ((side / 2) as f64 / d_bin).floor() as usize;
        let radii: Vec<f64> = (0..n_bin).map(|i| i as f64 * d_bin).collect();

        let center = (side / 2) as f64;
        let bins: Vec<Option<usize>> = iproduct!(0..side, 0..side)
            .map(|(r, c)| {
                let radius = (r as f64 - center).hypot(c as f64 - center).round();
                let bin = (radius / d_bin).floor() as usize;
                (bin < n_bin).then_some(bin)
            })
            .collect();

        let mut offsets = vec![0usize; n_bin + 1];
        bins.iter().flatten().for_each(|&bin| offsets[bin + 1] += 1);
        for i in 0..n_bin {
            offsets[i + 1] += offsets[i];
        }
        let mut next = offsets.clone();
        let mut cells = vec![0usize; offsets[n_bin]];
        for (cell, bin) in bins.into_iter().enumerate() {
            if let Some(bin) = bin {
                cells[next[bin]] = cell;
                next[bin] += 1;
            }
        }
        log::debug!(
            "ring partition: {side}x{side} grid, {n_bin} rings of width {d_bin}, {} cells",
            cells.len()
        );
        Ok(Self {
            side,
            d_bin,
            radii,
            cells,
            offsets,
        })
    }
    /// Nominal radius of every ring, in pixels
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }
    /// Side of the square grid
    pub fn side(&self) -> usize {
        self.side
    }
    pub fn d_bin(&self) -> f64 {
        self.d_bin
    }
    /// Nyquist radius `floor(N/2)`
    pub fn nyquist(&self) -> usize {
        self.side / 2
    }
    /// Number of rings
    pub fn len(&self) -> usize {
        self.radii.len()
    }
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
    /// Iterator over the `(cell indices, ring index)` pairs, in increasing radius order
    pub fn iter(&self) -> Rings<'_> {
        Rings {
            partition: self,
            ring: 0,
        }
    }
}

/// Lazy sequence of the rings of a [FourierRingIterator]
pub struct Rings<'a> {
    partition: &'a FourierRingIterator,
    ring: usize,
}
impl<'a> Iterator for Rings<'a> {
    type Item = (&'a [usize], usize);

    fn next(&mut self) -> Option<Self::Item> {
        let partition = self.partition;
        if self.ring >= partition.len() {
            return None;
        }
        let idx = self.ring;
        self.ring += 1;
        let (start, end) = (partition.offsets[idx], partition.offsets[idx + 1]);
        Some((&partition.cells[start..end], idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.partition.len() - self.ring;
        (n, Some(n))
    }
}
impl ExactSizeIterator for Rings<'_> {}
impl<'a> IntoIterator for &'a FourierRingIterator {
    type Item = (&'a [usize], usize);
    type IntoIter = Rings<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rounded_radius(cell: usize, side: usize) -> f64 {
        let center = (side / 2) as f64;
        let (r, c) = ((cell / side) as f64, (cell % side) as f64);
        (r - center).hypot(c - center).round()
    }

    #[test]
    fn rings_cover_grid_below_nyquist() {
        for side in [8usize, 9, 16, 31] {
            for d_bin in [1f64, 2.] {
                let rings = FourierRingIterator::new([side, side], d_bin).unwrap();
                let mut seen = HashSet::new();
                for (cells, _) in &rings {
                    for &cell in cells {
                        assert!(seen.insert(cell), "cell {cell} in more than one ring");
                    }
                }
                let limit = rings.len() as f64 * d_bin;
                let expected: HashSet<usize> = (0..side * side)
                    .filter(|&cell| rounded_radius(cell, side) < limit)
                    .collect();
                assert_eq!(seen, expected, "side={side} d_bin={d_bin}");
            }
        }
    }

    #[test]
    fn rings_in_increasing_radius_order() {
        let rings = FourierRingIterator::new([32, 32], 1.).unwrap();
        assert_eq!(rings.nyquist(), 16);
        assert_eq!(rings.len(), 16);
        for (cells, idx) in rings.iter() {
            assert!(!cells.is_empty());
            assert!(cells
                .iter()
                .all(|&cell| rounded_radius(cell, 32) == rings.radii()[idx]));
        }
        let indices: Vec<usize> = rings.iter().map(|(_, idx)| idx).collect();
        assert_eq!(indices, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn center_ring() {
        let rings = FourierRingIterator::new([8, 8], 1.).unwrap();
        let (cells, idx) = rings.iter().next().unwrap();
        assert_eq!(idx, 0);
        assert_eq!(cells, &[4 * 8 + 4]);
        let (cells, _) = rings.iter().nth(1).unwrap();
        assert_eq!(cells.len(), 8);
    }

    #[test]
    fn radii_and_restart() {
        let rings = FourierRingIterator::new([20, 20], 2.5).unwrap();
        assert_eq!(rings.radii(), &[0., 2.5, 5., 7.5]);
        let first: Vec<Vec<usize>> = rings.iter().map(|(c, _)| c.to_vec()).collect();
        let again: Vec<Vec<usize>> = rings.iter().map(|(c, _)| c.to_vec()).collect();
        assert_eq!(first, again);
        let rebuilt = FourierRingIterator::new([20, 20], 2.5).unwrap();
        let other: Vec<Vec<usize>> = rebuilt.iter().map(|(c, _)| c.to_vec()).collect();
        assert_eq!(first, other);
        assert_eq!(rings.iter().len(), 4);
    }

    #[test]
    fn fractional_bin_width_leaves_empty_rings() {
        let rings = FourierRingIterator::new([8, 8], 0.5).unwrap();
        assert_eq!(rings.len(), 8);
        let sizes: Vec<usize> = rings.iter().map(|(c, _)| c.len()).collect();
        assert!(sizes.iter().skip(1).step_by(2).all(|&n| n == 0));
        assert!(sizes.iter().step_by(2).all(|&n| n > 0));
    }

    #[test]
    fn invalid_grids() {
        assert!(matches!(
            FourierRingIterator::new([8, 10], 1.),
            Err(FrcError::NonSquareGrid(8, 10))
        ));
        assert!(matches!(
            FourierRingIterator::new([8, 8], 0.),
            Err(FrcError::InvalidBinWidth(_))
        ));
        assert!(matches!(
            FourierRingIterator::new([8, 8], f64::NAN),
            Err(FrcError::InvalidBinWidth(_))
        ));
    }
}
