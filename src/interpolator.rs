use ndarray::{Array2, ArrayView2};

/// In-plane resize used when resampling a permuted volume.
///
/// Always nearest neighbour: every output sample is a copy of an input
/// sample, so raw bit patterns of signed data survive untouched and no
/// intensity outside the source range is ever produced.
pub(crate) struct Interpolator;

impl Interpolator {
    /// Resize a slice to `height` x `width`.
    pub(crate) fn resize_slice(
        slice: &ArrayView2<u16>,
        height: usize,
        width: usize,
    ) -> Array2<u16> {
        let (slice_height, slice_width) = slice.dim();
        if (slice_height, slice_width) == (height, width) {
            return slice.to_owned();
        }
        if slice_height == 0 || slice_width == 0 {
            return Array2::zeros((height, width));
        }

        let rows: Vec<usize> = (0..height)
            .map(|y| Self::nearest_source(y, height, slice_height))
            .collect();
        let cols: Vec<usize> = (0..width)
            .map(|x| Self::nearest_source(x, width, slice_width))
            .collect();

        Array2::from_shape_fn((height, width), |(y, x)| slice[[rows[y], cols[x]]])
    }

    /// Source index whose pixel covers the centre of output pixel `index`.
    #[inline]
    fn nearest_source(index: usize, output_len: usize, source_len: usize) -> usize {
        // Half-pixel centres: floor((index + 0.5) * source_len / output_len)
        let src = (2 * index + 1) * source_len / (2 * output_len);
        src.min(source_len - 1)
    }

    /// Ratio between the original and the resized extent of one axis. The
    /// pixel spacing of that axis is multiplied by it.
    pub(crate) fn spacing_ratio(original: usize, resized: usize) -> f64 {
        original as f64 / resized as f64
    }
}
