/// Sigma implied by a kernel size when no sigma is given explicitly
/// (`0.3 * ((k - 1) / 2 - 1) + 0.8`).
pub fn sigma_for_kernel(kernel_size: usize) -> f64 {
    0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Binomial tables used for small kernels when no sigma is given.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1D Gaussian kernel of the given (odd) size.
///
/// Sizes up to 7 use the fixed binomial tables (5 taps is `[1, 4, 6, 4, 1] / 16`);
/// larger sizes sample a Gaussian with [`sigma_for_kernel`].
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    if let Some(table) = SMALL_KERNELS.get(kernel_size / 2) {
        return table.to_vec();
    }
    let sigma = sigma_for_kernel(kernel_size);
    let half = (kernel_size / 2) as f64;
    let mut kernel_f64: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

/// Index into `0..len` with the border mirrored around the edge pixel
/// (`dcb|abcd|cba`).
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        i = if i < 0 { -i } else { 2 * last - i };
    }
    i as usize
}

/// Separable Gaussian blur over an interleaved `u8` buffer, in place.
///
/// Edges reflect without repeating the border pixel. `temp` is a scratch
/// buffer that can be reused across frames.
pub fn separable_gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size / 2;

    temp.resize(width * height * channels, 0.0);

    // Horizontal pass: data -> temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - half as isize, width);
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp -> data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as isize + k as isize - half as isize, height);
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigma_for_5x5() {
        assert_relative_eq!(sigma_for_kernel(5), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_sums_to_one_and_is_symmetric() {
        let k = gaussian_kernel_1d(5);
        let sum: f32 = k.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        for i in 0..k.len() / 2 {
            assert_relative_eq!(k[i], k[k.len() - 1 - i], epsilon = 1e-6);
        }
        assert!(k[2] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn test_five_tap_kernel_is_binomial() {
        let k = gaussian_kernel_1d(5);
        let expected = [1.0, 4.0, 6.0, 4.0, 1.0].map(|v: f32| v / 16.0);
        for (got, want) in k.iter().zip(expected) {
            assert_relative_eq!(*got, want);
        }
    }

    #[test]
    fn test_large_kernel_falls_back_to_sigma() {
        let k = gaussian_kernel_1d(9);
        assert_eq!(k.len(), 9);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reflect_101_indices() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-2, 2), 0);
        assert_eq!(reflect_101(2, 1), 0);
    }

    #[test]
    fn test_blur_border_reflects() {
        // Row 0, 0, 160 extends as 160, 0 | 0, 0, 160 | 0, 0. Clamping would
        // repeat the edge instead and give 110 on the right.
        let mut data = vec![0u8, 0, 160];
        separable_gaussian_blur(&mut data, 3, 1, 1, &gaussian_kernel_1d(5), &mut Vec::new());
        assert_eq!(data, vec![20, 40, 60]);
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let mut data = vec![128u8; 10 * 10 * 3];
        let kernel = gaussian_kernel_1d(5);
        separable_gaussian_blur(&mut data, 10, 10, 3, &kernel, &mut Vec::new());
        assert!(data.iter().all(|&v| (v as i32 - 128).abs() <= 1));
    }

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut data = vec![0u8; 10 * 10 * 3];
        let cx = 5 * 10 + 5;
        data[cx * 3] = 255;

        let kernel = gaussian_kernel_1d(5);
        separable_gaussian_blur(&mut data, 10, 10, 3, &kernel, &mut Vec::new());

        assert!(data[cx * 3] < 255);
        assert!(data[(cx + 1) * 3] > 0);
        // Other channels untouched
        assert_eq!(data[cx * 3 + 1], 0);
    }

    #[test]
    fn test_kernel_size_1_is_identity() {
        let mut data = vec![42u8; 5 * 5 * 3];
        let original = data.clone();
        separable_gaussian_blur(&mut data, 5, 5, 3, &gaussian_kernel_1d(1), &mut Vec::new());
        assert_eq!(data, original);
    }
}
