use crate::enums::Mode;
use crate::interpolator::Interpolator;
use crate::metadata::{SliceTemplate, VolumeGeometry};

use log::debug;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;

/// A stack of slices with shape (slice_count, rows, columns) and the metadata
/// every output record is derived from.
#[derive(Clone, Debug)]
pub struct Volume {
    data: Array3<u16>,
    geometry: VolumeGeometry,
    template: SliceTemplate,
}

impl Volume {
    /// The dimension fields of `geometry` are taken from the shape of `data`.
    pub fn new(data: Array3<u16>, geometry: VolumeGeometry, template: SliceTemplate) -> Self {
        let (slice_count, rows, columns) = data.dim();
        Self {
            data,
            geometry: VolumeGeometry {
                rows,
                columns,
                slice_count,
                ..geometry
            },
            template,
        }
    }

    /// Get the dimensions of the volume (slices, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn template(&self) -> &SliceTemplate {
        &self.template
    }

    /// Slice `index` along the leading axis.
    pub fn slice(&self, index: usize) -> Option<ArrayView2<'_, u16>> {
        (index < self.geometry.slice_count).then(|| self.data.slice(s![index, .., ..]))
    }

    /// Permute, and resample when `mode` asks for it.
    pub fn reslice(self, mode: Mode) -> Self {
        let permuted = self.permute_axes();
        match mode {
            Mode::Dummy => permuted,
            Mode::Resample => {
                let size = permuted.geometry.slice_count;
                permuted.resample_in_plane(size)
            }
        }
    }

    /// Swap the stacking axis with the row axis, so that slicing along the
    /// new leading axis yields planes orthogonal to the acquisition plane.
    ///
    /// (slices, rows, columns) becomes (rows, slices, columns): the new row
    /// count is the old slice count, columns are kept, and the old row count
    /// becomes the slice count. Row spacing becomes the old slice thickness
    /// and the old row spacing becomes the distance between slices. Applying
    /// the permutation twice restores the original volume.
    pub fn permute_axes(self) -> Self {
        let data = self
            .data
            .permuted_axes([1, 0, 2])
            .as_standard_layout()
            .into_owned();
        let geometry = Self::permuted_geometry(&self.geometry);
        debug!(
            "permuted volume to {:?}, spacing {:?}, thickness {}",
            data.dim(),
            geometry.pixel_spacing,
            geometry.slice_thickness
        );
        Self::new(data, geometry, self.template)
    }

    fn permuted_geometry(geometry: &VolumeGeometry) -> VolumeGeometry {
        VolumeGeometry {
            rows: geometry.slice_count,
            columns: geometry.columns,
            slice_count: geometry.rows,
            pixel_spacing: (geometry.slice_thickness, geometry.pixel_spacing.1),
            slice_thickness: geometry.pixel_spacing.0,
            ..*geometry
        }
    }

    /// Resize every slice to `size` x `size` with nearest neighbour sampling.
    /// Pixel spacing is scaled by the ratio actually applied on each axis.
    pub fn resample_in_plane(self, size: usize) -> Self {
        let (slice_count, rows, columns) = self.dim();
        let mut data = Array3::<u16>::zeros((slice_count, size, size));

        for (i, slice) in self.data.axis_iter(Axis(0)).enumerate() {
            let resized = Interpolator::resize_slice(&slice, size, size);
            data.slice_mut(s![i, .., ..]).assign(&resized);
        }

        let (row_spacing, column_spacing) = self.geometry.pixel_spacing;
        let geometry = VolumeGeometry {
            pixel_spacing: (
                row_spacing * Interpolator::spacing_ratio(rows, size),
                column_spacing * Interpolator::spacing_ratio(columns, size),
            ),
            ..self.geometry
        };
        debug!(
            "resampled {rows}x{columns} slices to {size}x{size}, spacing {:?}",
            geometry.pixel_spacing
        );
        Self::new(data, geometry, self.template)
    }
}
