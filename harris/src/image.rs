use derive_more::{Deref, DerefMut};
use image::{DynamicImage, ImageBuffer, Luma};
use log::*;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use nshare::{MutNdarray2, RefNdarray2};
use wide::f32x4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type GrayImageBuffer = ImageBuffer<Luma<f32>, Vec<f32>>;

/// How samples that fall outside of the image are produced.
///
/// Every filter in this module takes the mode explicitly, since it decides
/// whether pixels on the image border can ever become corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BorderMode {
    /// Half-sample symmetric extension: `d c b a | a b c d | d c b a`.
    ///
    /// The extension repeats periodically, so arbitrarily distant samples
    /// still land inside the image.
    #[default]
    Reflect,
    /// Clamp to the nearest edge sample: `a a a a | a b c d | d d d d`.
    Replicate,
    /// Every outside sample has the given value.
    Constant(f32),
}

impl BorderMode {
    /// Map a possibly out-of-range `index` along an axis of length `len` onto
    /// a real sample. `None` means the value comes from [`BorderMode::fill_value`].
    pub fn resolve(self, index: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = len as isize - 1;
        if (0..=last).contains(&index) {
            return Some(index as usize);
        }
        match self {
            BorderMode::Reflect => {
                let m = index.rem_euclid(2 * len as isize) as usize;
                Some(if m < len { m } else { 2 * len - 1 - m })
            }
            BorderMode::Replicate => Some(index.clamp(0, last) as usize),
            BorderMode::Constant(_) => None,
        }
    }

    /// Value of samples without a source pixel. Only `Constant` produces
    /// those on non-empty axes; an empty axis reads as zero otherwise.
    pub fn fill_value(self) -> f32 {
        match self {
            BorderMode::Constant(value) => value,
            _ => 0.0,
        }
    }

    /// Read `line` at `index`, extending it past `0..len` with this mode.
    pub fn sample(self, line: impl Fn(usize) -> f32, index: isize, len: usize) -> f32 {
        self.resolve(index, len).map_or(self.fill_value(), line)
    }
}

/// The image type we use in this library.
///
/// This is simply a wrapper around a contiguous f32 buffer from the image
/// crate, in row-major order. Filters operate directly on the raw buffer
/// for speed, and `ndarray` views are handed out for element-wise math.
///
/// We continue to use the image crate for loading images.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct GrayFloatImage(pub GrayImageBuffer);

impl GrayFloatImage {
    /// Create a unit float image from the image crate's DynamicImage type.
    ///
    /// # Arguments
    /// * `input_image` - the input image.
    /// # Return value
    /// An image with pixel values between 0 and 1.
    pub fn from_dynamic(input_image: &DynamicImage) -> Self {
        info!(
            "Loaded a {} x {} image",
            input_image.width(),
            input_image.height()
        );
        let gray_image = input_image.to_luma16();
        Self(ImageBuffer::from_fn(
            gray_image.width(),
            gray_image.height(),
            |x, y| Luma([f32::from(gray_image[(x, y)][0]) / 65535f32]),
        ))
    }

    /// Build an image by evaluating `f(x, y)` at every pixel.
    ///
    /// # Panics
    /// If a dimension does not fit in a `u32`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        Self(ImageBuffer::from_fn(
            dimension(width),
            dimension(height),
            |x, y| Luma([f(x as usize, y as usize)]),
        ))
    }

    /// Build an image from an array of shape `(rows, columns)`.
    pub fn from_array2(arr: Array2<f32>) -> Self {
        let (height, width) = arr.dim();
        let data = arr.iter().copied().collect();
        Self(
            ImageBuffer::from_raw(dimension(width), dimension(height), data)
                .expect("array has exactly width * height pixels"),
        )
    }

    pub fn ref_array2(&self) -> ArrayView2<f32> {
        self.0.ref_ndarray2()
    }

    pub fn mut_array2(&mut self) -> ArrayViewMut2<f32> {
        self.0.mut_ndarray2()
    }

    pub fn zero_array(&self) -> Array2<f32> {
        Array2::zeros((self.height(), self.width()))
    }

    pub fn width(&self) -> usize {
        self.0.width() as usize
    }

    pub fn height(&self) -> usize {
        self.0.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn new(width: usize, height: usize) -> Self {
        Self(ImageBuffer::from_pixel(
            dimension(width),
            dimension(height),
            Luma([0.0]),
        ))
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.get_pixel(x as u32, y as u32)[0]
    }

    /// Read the pixel at `(x, y)`, which may lie outside of the image.
    pub fn sample(&self, x: isize, y: isize, border: BorderMode) -> f32 {
        match (
            border.resolve(x, self.width()),
            border.resolve(y, self.height()),
        ) {
            (Some(x), Some(y)) => self.get(x, y),
            _ => border.fill_value(),
        }
    }
}

fn dimension(len: usize) -> u32 {
    u32::try_from(len).expect("image dimension does not fit in a u32")
}

/// Pack a kernel into SIMD lanes, padded with 0.
fn simd_kernel(kernel: &[f32]) -> Vec<f32x4> {
    kernel
        .chunks(4)
        .map(|chunk| {
            let mut data = [0.0; 4];
            data[..chunk.len()].copy_from_slice(chunk);
            f32x4::new(data)
        })
        .collect()
}

fn simd_dot(window: &[f32], kernel_simd: &[f32x4]) -> f32 {
    window
        .chunks_exact(4)
        .map(|chunk| f32x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .zip(kernel_simd.iter())
        .fold(f32x4::splat(0.), |acc, (a, b)| a.mul_add(*b, acc))
        .reduce_add()
}

/// Correlate every row with `kernel`, centred on each sample.
///
/// `out[x] = sum_i kernel[i] * in[x + i - kernel.len() / 2]`
pub fn horizontal_filter(
    image: &GrayImageBuffer,
    kernel: &[f32],
    border: BorderMode,
) -> GrayImageBuffer {
    // Validate kernel size.
    let kernel_size = kernel.len();
    assert!(kernel_size % 2 == 1, "kernel length must be odd");
    let kernel_half_size = kernel_size / 2;
    let width = image.width() as usize;
    let height = image.height() as usize;
    if width == 0 || height == 0 {
        return image.clone();
    }
    let mut output = vec![0.0; width * height];
    let kernel_simd = simd_kernel(kernel);
    let kernel_simd_size = 4 * kernel_simd.len();
    let kernel_simd_extra_elements = kernel_simd_size - kernel_size;
    // Process each row independently.
    let row_in_it = image.as_raw().chunks_exact(width);
    let row_out_it = output.chunks_exact_mut(width);
    let mut scratch = vec![0f32; width + kernel_half_size * 2 + kernel_simd_extra_elements];
    for (row_in, row_out) in row_in_it.zip(row_out_it) {
        // Prefill extended buffer with center and border values.
        let at = |x: usize| row_in[x];
        for (i, s) in scratch[..kernel_half_size].iter_mut().enumerate() {
            *s = border.sample(at, i as isize - kernel_half_size as isize, width);
        }
        scratch[kernel_half_size..kernel_half_size + width].copy_from_slice(row_in);
        for (i, s) in scratch[kernel_half_size + width..2 * kernel_half_size + width]
            .iter_mut()
            .enumerate()
        {
            *s = border.sample(at, (width + i) as isize, width);
        }
        scratch[2 * kernel_half_size + width..].fill(0.);
        // Apply kernel.
        scratch
            .windows(kernel_simd_size)
            .zip(row_out)
            .for_each(|(window, output)| *output = simd_dot(window, &kernel_simd));
    }
    GrayImageBuffer::from_raw(dimension(width), dimension(height), output)
        .expect("output has exactly width * height pixels")
}

/// Correlate every column with `kernel`, centred on each sample.
pub fn vertical_filter(
    image: &GrayImageBuffer,
    kernel: &[f32],
    border: BorderMode,
) -> GrayImageBuffer {
    let kernel_size = kernel.len();
    assert!(kernel_size % 2 == 1, "kernel length must be odd");
    let kernel_half_size = kernel_size / 2;
    let width = image.width() as usize;
    let height = image.height() as usize;
    if width == 0 || height == 0 {
        return image.clone();
    }
    let mut output = vec![0.0; width * height];
    let kernel_simd = simd_kernel(kernel);
    let kernel_simd_size = 4 * kernel_simd.len();
    let kernel_simd_extra_elements = kernel_simd_size - kernel_size;
    // We use a scratch buffer of L1 cache width (64 bytes) to optimize memory access.
    const SCRATCH_WIDTH: usize = 16;
    let scratch_height = height + kernel_half_size * 2 + kernel_simd_extra_elements;
    let mut scratch = vec![0f32; SCRATCH_WIDTH * scratch_height];
    let image = image.as_raw();
    for x_s in (0..width).step_by(SCRATCH_WIDTH) {
        let x_e: usize = (x_s + SCRATCH_WIDTH).min(width);
        // Border rows first.
        for x in x_s..x_e {
            let at = |y: usize| image[y * width + x];
            let col = &mut scratch[(x - x_s) * scratch_height..(x - x_s + 1) * scratch_height];
            for (i, s) in col[..kernel_half_size].iter_mut().enumerate() {
                *s = border.sample(at, i as isize - kernel_half_size as isize, height);
            }
            let bottom = kernel_half_size + height;
            for (i, s) in col[bottom..bottom + kernel_half_size].iter_mut().enumerate() {
                *s = border.sample(at, (height + i) as isize, height);
            }
            col[bottom + kernel_half_size..].fill(0.);
        }
        // Then main content.
        for y in 0..height {
            let image_row_start = y * width;
            for x in x_s..x_e {
                scratch[(x - x_s) * scratch_height + y + kernel_half_size] =
                    image[image_row_start + x];
            }
        }
        // Apply kernel.
        let col_count = x_e - x_s;
        scratch
            .chunks(scratch_height)
            .take(col_count)
            .enumerate()
            .for_each(|(dx, col)| {
                let x = x_s + dx;
                col.windows(kernel_simd_size)
                    .enumerate()
                    .for_each(|(y, window)| {
                        output[y * width + x] = simd_dot(window, &kernel_simd);
                    });
            });
    }
    GrayImageBuffer::from_raw(dimension(width), dimension(height), output)
        .expect("output has exactly width * height pixels")
}

pub fn separable_filter(
    image: &GrayImageBuffer,
    h_kernel: &[f32],
    v_kernel: &[f32],
    border: BorderMode,
) -> GrayImageBuffer {
    let h = horizontal_filter(image, h_kernel, border);
    vertical_filter(&h, v_kernel, border)
}

/// The Gaussian function.
///
/// # Arguments
/// * `x` - the offset.
/// * `r` - sigma.
/// # Return value
/// The kernel value at x.
fn gaussian(x: f32, r: f32) -> f32 {
    ((2.0 * std::f32::consts::PI).sqrt() * r).recip() * (-x.powi(2) / (2.0 * r.powi(2))).exp()
}

/// Generate a Gaussian kernel.
///
/// # Arguments
/// * `r` - sigma.
/// * `kernel_size` - The size of the kernel.
/// # Return value
/// The kernel (a vector).
pub fn gaussian_kernel(r: f32, kernel_size: usize) -> Vec<f32> {
    assert!(kernel_size % 2 == 1, "kernel_size must be odd");
    if kernel_size == 1 {
        // Tiny sigmas underflow the exponent; a single tap is the identity.
        return vec![1.0];
    }
    let mut kernel = vec![0f32; kernel_size];
    let half_width = (kernel_size / 2) as i32;
    let mut sum = 0f32;
    for i in -half_width..=half_width {
        let val = gaussian(i as f32, r);
        kernel[(i + half_width) as usize] = val;
        sum += val;
    }
    for val in kernel.iter_mut() {
        *val /= sum;
    }
    kernel
}

/// Perform Gaussian blur on an image.
///
/// The kernel is truncated at four standard deviations.
///
/// # Arguments
/// * `r` - sigma.
/// * `border` - How samples outside of the image are produced.
/// # Return value
/// The resulting image after the filter was applied.
pub fn gaussian_blur(image: &GrayFloatImage, r: f32, border: BorderMode) -> GrayFloatImage {
    assert!(r > 0.0, "sigma must be > 0.0");
    let kernel_radius = (4.0 * r + 0.5) as usize;
    let kernel_size = kernel_radius * 2 + 1;
    let kernel = gaussian_kernel(r, kernel_size);
    GrayFloatImage(separable_filter(image, &kernel, &kernel, border))
}

/// Running maximum of one line into `output`, reusing `scratch` for the
/// border-extended copy.
fn running_max(
    input: ArrayView1<f32>,
    mut output: ArrayViewMut1<f32>,
    size: usize,
    border: BorderMode,
    scratch: &mut Vec<f32>,
) {
    let len = input.len();
    let half = size / 2;
    scratch.clear();
    scratch.extend(
        (0..len + 2 * half)
            .map(|i| border.sample(|j| input[j], i as isize - half as isize, len)),
    );
    for (out, window) in output.iter_mut().zip(scratch.windows(size)) {
        *out = window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    }
}

/// Replace every pixel by the maximum of the `size` x `size` window centred
/// on it.
///
/// A square maximum is separable, so this runs a 1D maximum over the rows
/// and then over the columns.
pub fn maximum_filter(image: &GrayFloatImage, size: usize, border: BorderMode) -> GrayFloatImage {
    assert!(size % 2 == 1, "maximum filter size must be odd");
    if image.is_empty() {
        return image.clone();
    }
    let mut scratch = vec![];
    let mut horizontal = image.zero_array();
    for (row_in, row_out) in image.ref_array2().rows().into_iter().zip(horizontal.rows_mut()) {
        running_max(row_in, row_out, size, border, &mut scratch);
    }
    let mut output = image.zero_array();
    for (col_in, col_out) in horizontal.columns().into_iter().zip(output.columns_mut()) {
        running_max(col_in, col_out, size, border, &mut scratch);
    }
    GrayFloatImage::from_array2(output)
}
