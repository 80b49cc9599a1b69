use rustfft::{num_complex::Complex64, FftPlanner};

/// In-place transpose of a `n×n` row-major matrix
fn transpose(data: &mut [Complex64], n: usize) {
    for i in 0..n {
        for j in i + 1..n {
            data.swap(i * n + j, j * n + i);
        }
    }
}

/// Moves the zero frequency of a `n×n` row-major spectrum to (`n/2`,`n/2`)
///
/// Same convention as numpy `fftshift`, index `k` goes to `(k + n/2) % n`.
pub(crate) fn fftshift2(data: &[Complex64], n: usize) -> Vec<Complex64> {
    let h = n / 2;
    let mut shifted = vec![Complex64::default(); data.len()];
    for (k, row) in data.chunks_exact(n).enumerate() {
        let start = ((k + h) % n) * n;
        let dst = &mut shifted[start..start + n];
        dst[h..].copy_from_slice(&row[..n - h]);
        dst[..h].copy_from_slice(&row[n - h..]);
    }
    shifted
}

/// Centered 2D discrete Fourier transform of a `n×n` real array in row-major order
///
/// Callers pass square images, `data.len()` must be `n²`.
pub(crate) fn fft2_centered(data: &[f64], n: usize) -> Vec<Complex64> {
    assert_eq!(data.len(), n * n, "expected a {n}x{n} array");
    if n == 0 {
        return Vec::new();
    }
    let mut buffer: Vec<Complex64> = data.iter().map(|&x| Complex64::new(x, 0f64)).collect();
    let fft = FftPlanner::new().plan_fft_forward(n);
    let mut scratch = vec![Complex64::default(); fft.get_inplace_scratch_len()];
    // rows, then columns as rows of the transpose
    for _ in 0..2 {
        for row in buffer.chunks_exact_mut(n) {
            fft.process_with_scratch(row, &mut scratch);
        }
        transpose(&mut buffer, n);
    }
    fftshift2(&buffer, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn dft2(data: &[f64], n: usize) -> Vec<Complex64> {
        let mut out = vec![Complex64::default(); n * n];
        for u in 0..n {
            for v in 0..n {
                for r in 0..n {
                    for c in 0..n {
                        let phase = -2f64 * PI * ((u * r + v * c) as f64) / n as f64;
                        out[u * n + v] += Complex64::from_polar(data[r * n + c], phase);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn matches_direct_dft() {
        for n in [4usize, 5] {
            let data: Vec<f64> = (0..n * n).map(|k| ((k * 7 + 3) % 11) as f64 - 4.).collect();
            let expected = fftshift2(&dft2(&data, n), n);
            let actual = fft2_centered(&data, n);
            for (a, e) in actual.iter().zip(&expected) {
                assert!((a - e).norm() < 1e-9, "{a} != {e}");
            }
        }
    }

    #[test]
    fn dc_is_centered() {
        for n in [4usize, 7] {
            let spectrum = fft2_centered(&vec![1f64; n * n], n);
            let center = (n / 2) * n + n / 2;
            assert!((spectrum[center].re - (n * n) as f64).abs() < 1e-9);
            let off_center: f64 = spectrum
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != center)
                .map(|(_, s)| s.norm())
                .sum();
            assert!(off_center < 1e-9);
        }
    }

    #[test]
    fn shift_odd_side() {
        let data: Vec<Complex64> = (0..9).map(|k| Complex64::new(k as f64, 0.)).collect();
        let shifted: Vec<f64> = fftshift2(&data, 3).iter().map(|c| c.re).collect();
        assert_eq!(shifted, vec![8., 6., 7., 2., 0., 1., 5., 3., 4.]);
    }
}
