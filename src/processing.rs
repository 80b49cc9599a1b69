//! Image preprocessing for Fourier correlation measurements
//!
//! Windowing, checkerboard splitting and zero padding of 2D images.
//! Every operation keeps the pixel spacing of its input.

use std::f64::consts::PI;

use itertools::iproduct;

use crate::image::{Image, ImageError};

type Result<T> = std::result::Result<T, ImageError>;

/// Hamming window of length `m`
fn hamming(m: usize) -> Vec<f64> {
    if m < 2 {
        return vec![1f64; m];
    }
    let d = (m - 1) as f64;
    (0..m)
        .map(|k| 0.54 - 0.46 * (2f64 * PI * k as f64 / d).cos())
        .collect()
}

fn spacing_2d(image: &Image) -> [f64; 2] {
    [image.spacing()[0], image.spacing()[1]]
}

/// Multiplies the image by a separable 2D Hamming window
pub fn apply_hamming_window(image: &Image) -> Result<Image> {
    let (rows, cols) = image.dims()?;
    let (wr, wc) = (hamming(rows), hamming(cols));
    let data = iproduct!(0..rows, 0..cols)
        .zip(image.data())
        .map(|((r, c), &v)| v * wr[r] * wc[c])
        .collect();
    Image::new(data, vec![rows, cols], image.spacing().to_vec())
}

/// Gathers the pixels at the cartesian product of the `rows` and `cols` parities
fn decimate(image: &Image, row_offset: usize, col_offset: usize) -> Result<Image> {
    let (rows, cols) = image.dims()?;
    let sub_rows: Vec<usize> = (row_offset..rows).step_by(2).collect();
    let sub_cols: Vec<usize> = (col_offset..cols).step_by(2).collect();
    let data = iproduct!(sub_rows.iter(), sub_cols.iter())
        .map(|(&r, &c)| image.data()[r * cols + c])
        .collect();
    Image::new(
        data,
        vec![sub_rows.len(), sub_cols.len()],
        image.spacing().to_vec(),
    )
}

/// Splits an image into (odd rows × odd columns, even rows × even columns) sub-images
pub fn checkerboard_split(image: &Image) -> Result<(Image, Image)> {
    Ok((decimate(image, 1, 1)?, decimate(image, 0, 0)?))
}

/// Splits an image into (odd rows × even columns, even rows × odd columns) sub-images,
/// the complement of [checkerboard_split]
pub fn reverse_checkerboard_split(image: &Image) -> Result<(Image, Image)> {
    Ok((decimate(image, 1, 0)?, decimate(image, 0, 1)?))
}

/// Zero pads an image to `shape`, centering the original pixels
///
/// Each axis receives `floor(Δ/2)` zeros before and `ceil(Δ/2)` after.
pub fn zero_pad_to_shape(image: &Image, shape: [usize; 2]) -> Result<Image> {
    let (rows, cols) = image.dims()?;
    let [new_rows, new_cols] = shape;
    if new_rows < rows || new_cols < cols {
        return Err(ImageError::PadTarget {
            from: image.shape().to_vec(),
            to: shape.to_vec(),
        });
    }
    if (new_rows, new_cols) == (rows, cols) {
        return Ok(image.clone());
    }
    let (r0, c0) = ((new_rows - rows) / 2, (new_cols - cols) / 2);
    let mut padded = Image::zeros(new_rows, new_cols, spacing_2d(image))?.into_data();
    for (r, row) in image.data().chunks_exact(cols).enumerate() {
        let start = (r + r0) * new_cols + c0;
        padded[start..start + cols].copy_from_slice(row);
    }
    Image::new(padded, shape.to_vec(), image.spacing().to_vec())
}

/// Zero pads the smaller of two images so both share the same shape
pub fn zero_pad_to_matching_shape(image1: &Image, image2: &Image) -> Result<(Image, Image)> {
    let (rows1, cols1) = image1.dims()?;
    let (rows2, cols2) = image2.dims()?;
    let shape = [rows1.max(rows2), cols1.max(cols2)];
    Ok((
        zero_pad_to_shape(image1, shape)?,
        zero_pad_to_shape(image2, shape)?,
    ))
}

/// Zero pads a 2D image into a square
pub fn zero_pad_to_cube(image: &Image) -> Result<Image> {
    let (rows, cols) = image.dims()?;
    let side = rows.max(cols);
    zero_pad_to_shape(image, [side, side])
}
