use crate::{
    derivatives,
    image::{gaussian_blur, GrayFloatImage},
    Harris,
};
use log::*;
use ndarray::azip;

/// Per-pixel products of the image gradients, the entries of the
/// structure tensor before smoothing.
#[allow(non_snake_case)]
struct GradientProducts {
    Ixx: GrayFloatImage,
    Iyy: GrayFloatImage,
    Ixy: GrayFloatImage,
}

impl GradientProducts {
    #[allow(non_snake_case)]
    fn new(Ix: &GrayFloatImage, Iy: &GrayFloatImage) -> Self {
        let mut Ixx = GrayFloatImage::new(Ix.width(), Ix.height());
        let mut Iyy = GrayFloatImage::new(Ix.width(), Ix.height());
        let mut Ixy = GrayFloatImage::new(Ix.width(), Ix.height());
        azip!((
            xx in Ixx.mut_array2(),
            yy in Iyy.mut_array2(),
            xy in Ixy.mut_array2(),
            &x in Ix.ref_array2(),
            &y in Iy.ref_array2(),
        ) {
            *xx = x * x;
            *yy = y * y;
            *xy = x * y;
        });
        Self { Ixx, Iyy, Ixy }
    }
}

impl Harris {
    fn gradients(&self, image: &GrayFloatImage) -> (GrayFloatImage, GrayFloatImage) {
        let border = self.params.border;
        #[cfg(not(feature = "rayon"))]
        {
            (
                derivatives::sobel_horizontal(image, border),
                derivatives::sobel_vertical(image, border),
            )
        }
        #[cfg(feature = "rayon")]
        {
            rayon::join(
                || derivatives::sobel_horizontal(image, border),
                || derivatives::sobel_vertical(image, border),
            )
        }
    }

    /// Smooth the gradient products into the structure tensor `(Sxx, Syy, Sxy)`.
    fn structure_tensor(
        &self,
        products: &GradientProducts,
    ) -> (GrayFloatImage, GrayFloatImage, GrayFloatImage) {
        let sigma = self.params.gaussian_sigma;
        let border = self.params.border;
        #[cfg(not(feature = "rayon"))]
        {
            (
                gaussian_blur(&products.Ixx, sigma, border),
                gaussian_blur(&products.Iyy, sigma, border),
                gaussian_blur(&products.Ixy, sigma, border),
            )
        }
        #[cfg(feature = "rayon")]
        {
            let (sxx, (syy, sxy)) = rayon::join(
                || gaussian_blur(&products.Ixx, sigma, border),
                || {
                    rayon::join(
                        || gaussian_blur(&products.Iyy, sigma, border),
                        || gaussian_blur(&products.Ixy, sigma, border),
                    )
                },
            );
            (sxx, syy, sxy)
        }
    }

    /// Compute the Harris corner response `det(M) - k * trace(M)^2` of every
    /// pixel, where `M` is the Gaussian-weighted structure tensor.
    ///
    /// The result has the same dimensions as the input image.
    #[allow(non_snake_case)]
    pub fn corner_response(&self, image: &GrayFloatImage) -> GrayFloatImage {
        let (Ix, Iy) = self.gradients(image);
        trace!("Computing gradients finished.");
        let products = GradientProducts::new(&Ix, &Iy);
        let (Sxx, Syy, Sxy) = self.structure_tensor(&products);
        trace!("Smoothing structure tensor finished.");
        let k = self.params.harris_corner_k;
        let mut response = GrayFloatImage::new(image.width(), image.height());
        azip!((
            r in response.mut_array2(),
            &xx in Sxx.ref_array2(),
            &yy in Syy.ref_array2(),
            &xy in Sxy.ref_array2(),
        ) {
            let det = xx * yy - xy * xy;
            let trace = xx + yy;
            *r = det - k * trace * trace;
        });
        response
    }
}
