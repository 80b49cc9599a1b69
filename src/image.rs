use std::{fs::File, io, io::BufReader, path::Path};

use nalgebra::DMatrix;
use npyz::{npz::NpzArchive, DType, NpyFile, Order, TypeChar};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image data length {len} does not match shape {shape:?}")]
    Shape { len: usize, shape: Vec<usize> },
    #[error("spacing {spacing:?} does not match a {ndim}D image")]
    SpacingLength { spacing: Vec<f64>, ndim: usize },
    #[error("pixel spacing must be positive, found {0:?}")]
    Spacing(Vec<f64>),
    #[error("expected a 2D image, found {0}D")]
    NotTwoDimensional(usize),
    #[error("cannot pad a {from:?} image to {to:?}")]
    PadTarget { from: Vec<usize>, to: Vec<usize> },
    #[error("failed to read {1}")]
    Read(#[source] io::Error, String),
    #[error("array {0:?} not found in archive")]
    MissingArray(String),
    #[error("unsupported array type {0}")]
    DType(String),
}
type Result<T> = std::result::Result<T, ImageError>;

/// A real valued image with a physical pixel spacing per axis
///
/// The pixels are stored in row-major (C) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Vec<f64>,
    shape: Vec<usize>,
    spacing: Vec<f64>,
}
impl Image {
    /// Creates a new image from row-major `data`
    pub fn new(data: Vec<f64>, shape: Vec<usize>, spacing: Vec<f64>) -> Result<Self> {
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(ImageError::Shape {
                len: data.len(),
                shape,
            });
        }
        if spacing.len() != shape.len() {
            return Err(ImageError::SpacingLength {
                ndim: shape.len(),
                spacing,
            });
        }
        if spacing.iter().any(|&s| !(s > 0f64 && s.is_finite())) {
            return Err(ImageError::Spacing(spacing));
        }
        Ok(Self {
            data,
            shape,
            spacing,
        })
    }
    /// Creates a 2D image of zeros
    pub fn zeros(rows: usize, cols: usize, spacing: [f64; 2]) -> Result<Self> {
        Self::new(vec![0f64; rows * cols], vec![rows, cols], spacing.to_vec())
    }
    /// Creates a 2D image from a matrix
    pub fn from_matrix(matrix: &DMatrix<f64>, spacing: [f64; 2]) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        // nalgebra is column-major, the transpose iterates in row-major order
        let data: Vec<f64> = matrix.transpose().iter().cloned().collect();
        Self::new(data, vec![rows, cols], spacing.to_vec())
    }
    /// Returns the 2D image as a matrix
    pub fn to_matrix(&self) -> Result<DMatrix<f64>> {
        let (rows, cols) = self.dims()?;
        Ok(DMatrix::from_row_slice(rows, cols, &self.data))
    }
    /// Loads a 2D image from a numpy `.npy` file
    pub fn from_npy<P: AsRef<Path>>(path: P, spacing: [f64; 2]) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let file = File::open(path.as_ref()).map_err(|e| ImageError::Read(e, name.clone()))?;
        let npy =
            NpyFile::new(BufReader::new(file)).map_err(|e| ImageError::Read(e, name.clone()))?;
        Self::from_npy_file(npy, spacing).map_err(|e| match e {
            ImageError::Read(e, _) => ImageError::Read(e, name),
            e => e,
        })
    }
    /// Loads the 2D image `array` from a numpy `.npz` archive
    pub fn from_npz<P: AsRef<Path>>(path: P, array: &str, spacing: [f64; 2]) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let mut npz =
            NpzArchive::open(path.as_ref()).map_err(|e| ImageError::Read(e, name.clone()))?;
        let npy = npz
            .by_name(array)
            .map_err(|e| ImageError::Read(e, name.clone()))?
            .ok_or_else(|| ImageError::MissingArray(array.to_string()))?;
        Self::from_npy_file(npy, spacing).map_err(|e| match e {
            ImageError::Read(e, _) => ImageError::Read(e, format!("{name}:{array}")),
            e => e,
        })
    }
    fn from_npy_file<R: io::Read>(npy: NpyFile<R>, spacing: [f64; 2]) -> Result<Self> {
        let shape: Vec<usize> = npy.shape().iter().map(|&n| n as usize).collect();
        let order = npy.order();
        let data = read_as_f64(npy)?;
        if shape.len() != 2 {
            return Err(ImageError::NotTwoDimensional(shape.len()));
        }
        let data = match order {
            Order::C => data,
            Order::Fortran => {
                // column-major storage is exactly nalgebra's layout
                let m = DMatrix::from_column_slice(shape[0], shape[1], &data);
                m.transpose().iter().cloned().collect()
            }
        };
        Self::new(data, shape, spacing.to_vec())
    }
    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }
    /// Pixel values in row-major order
    pub fn data(&self) -> &[f64] {
        &self.data
    }
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
    /// Returns `(rows, cols)` or an error if the image is not 2D
    pub fn dims(&self) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            &[rows, cols] => Ok((rows, cols)),
            _ => Err(ImageError::NotTwoDimensional(self.ndim())),
        }
    }
    pub fn is_square(&self) -> bool {
        matches!(self.dims(), Ok((rows, cols)) if rows == cols)
    }
    /// Pixel value at (`row`,`col`) of a 2D image
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let (rows, cols) = self.dims().ok()?;
        if row < rows && col < cols {
            Some(self.data[row * cols + col])
        } else {
            None
        }
    }
}

/// Reads float, signed and unsigned integer arrays as `f64`
fn read_as_f64<R: io::Read>(npy: NpyFile<R>) -> Result<Vec<f64>> {
    macro_rules! convert {
        ($t:ty) => {
            npy.into_vec::<$t>()
                .map(|data| data.into_iter().map(|x| x as f64).collect())
        };
    }
    let dtype = npy.dtype();
    let data = match &dtype {
        DType::Plain(ty) => match (ty.type_char(), ty.size_field()) {
            (TypeChar::Float, 8) => npy.into_vec::<f64>(),
            (TypeChar::Float, 4) => convert!(f32),
            (TypeChar::Uint, 1) => convert!(u8),
            (TypeChar::Uint, 2) => convert!(u16),
            (TypeChar::Uint, 4) => convert!(u32),
            (TypeChar::Uint, 8) => convert!(u64),
            (TypeChar::Int, 1) => convert!(i8),
            (TypeChar::Int, 2) => convert!(i16),
            (TypeChar::Int, 4) => convert!(i32),
            (TypeChar::Int, 8) => convert!(i64),
            _ => return Err(ImageError::DType(dtype.descr())),
        },
        _ => return Err(ImageError::DType(dtype.descr())),
    };
    data.map_err(|e| ImageError::Read(e, String::new()))
}
