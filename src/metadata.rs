//! Typed view over the first matching slice of a series.
//!
//! Everything downstream of the loader works on [`VolumeGeometry`] and
//! [`SliceTemplate`] instead of probing data set attributes ad hoc. Both are
//! validated once, when the template slice is accepted.

use dicom::core::{PrimitiveValue, Tag};
use dicom::object::{InMemDicomObject, mem::InMemElement};
use dicom_dictionary_std::tags;

use crate::error::ReslicerError;

/// Maximum length of a DS value.
const MAX_DS_LEN: usize = 16;

/// Attributes copied verbatim from the template into every output record.
const PASS_THROUGH_TAGS: [Tag; 13] = [
    tags::PATIENT_NAME,
    tags::PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_SEX,
    tags::PATIENT_POSITION,
    tags::PATIENT_ORIENTATION,
    tags::STUDY_DATE,
    tags::STUDY_TIME,
    tags::STUDY_ID,
    tags::ACCESSION_NUMBER,
    tags::REFERRING_PHYSICIAN_NAME,
    tags::SERIES_NUMBER,
    tags::FRAME_OF_REFERENCE_UID,
];

/// Geometry and calibration shared by all slices of a volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeGeometry {
    pub rows: usize,
    pub columns: usize,
    pub slice_count: usize,
    /// (row spacing, column spacing)
    pub pixel_spacing: (f64, f64),
    /// Distance between consecutive slices along the stacking axis.
    pub slice_thickness: f64,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
}

impl VolumeGeometry {
    /// Extract the geometry of the template slice. `slice_count` starts at
    /// zero and is filled in by the assembler.
    pub fn from_template(obj: &InMemDicomObject, origin: &str) -> Result<Self, ReslicerError> {
        let malformed = |field| ReslicerError::MalformedTemplate {
            origin: origin.to_string(),
            field,
        };

        let rows = uint(obj, tags::ROWS).ok_or_else(|| malformed("Rows"))?;
        let columns = uint(obj, tags::COLUMNS).ok_or_else(|| malformed("Columns"))?;
        let pixel_spacing = multi_float(obj, tags::PIXEL_SPACING)
            .filter(|spacing| spacing.len() >= 2)
            .ok_or_else(|| malformed("PixelSpacing"))?;
        let slice_thickness =
            float(obj, tags::SLICE_THICKNESS).ok_or_else(|| malformed("SliceThickness"))?;
        let rescale_slope =
            float(obj, tags::RESCALE_SLOPE).ok_or_else(|| malformed("RescaleSlope"))?;
        let rescale_intercept =
            float(obj, tags::RESCALE_INTERCEPT).ok_or_else(|| malformed("RescaleIntercept"))?;

        Ok(Self {
            rows: rows as usize,
            columns: columns as usize,
            slice_count: 0,
            pixel_spacing: (pixel_spacing[0], pixel_spacing[1]),
            slice_thickness,
            rescale_slope,
            rescale_intercept,
        })
    }
}

/// Identity and pass-through attributes of the template slice.
#[derive(Clone, Debug)]
pub struct SliceTemplate {
    pub series_instance_uid: String,
    pub study_instance_uid: String,
    /// 0 for unsigned samples, 1 for two's complement.
    pub pixel_representation: u16,
    pub pass_through: Vec<InMemElement>,
}

impl SliceTemplate {
    pub fn from_template(obj: &InMemDicomObject, origin: &str) -> Result<Self, ReslicerError> {
        let malformed = |field| ReslicerError::MalformedTemplate {
            origin: origin.to_string(),
            field,
        };

        let series_instance_uid = string(obj, tags::SERIES_INSTANCE_UID)
            .ok_or_else(|| malformed("SeriesInstanceUID"))?;
        let study_instance_uid = string(obj, tags::STUDY_INSTANCE_UID)
            .ok_or_else(|| malformed("StudyInstanceUID"))?;
        let pixel_representation = uint(obj, tags::PIXEL_REPRESENTATION).unwrap_or(0);
        let pass_through = PASS_THROUGH_TAGS
            .iter()
            .filter_map(|tag| obj.element(*tag).ok().cloned())
            .collect();

        Ok(Self {
            series_instance_uid,
            study_instance_uid,
            pixel_representation,
            pass_through,
        })
    }
}

/// Third component of Image Position (Patient).
pub fn through_plane_position(obj: &InMemDicomObject) -> Option<f64> {
    multi_float(obj, tags::IMAGE_POSITION_PATIENT)?.get(2).copied()
}

pub(crate) fn float(obj: &InMemDicomObject, tag: Tag) -> Option<f64> {
    obj.element(tag).ok()?.to_float64().ok()
}

pub(crate) fn multi_float(obj: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    obj.element(tag).ok()?.to_multi_float64().ok()
}

pub(crate) fn uint(obj: &InMemDicomObject, tag: Tag) -> Option<u16> {
    obj.element(tag).ok()?.to_int::<u16>().ok()
}

/// Text value with UI/CS padding removed. Empty values count as absent.
pub(crate) fn string(obj: &InMemDicomObject, tag: Tag) -> Option<String> {
    let value = obj.element(tag).ok()?.to_str().ok()?;
    let value = value.trim_end_matches('\0').trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Format a number as a DS value that fits in 16 characters.
pub(crate) fn format_ds(value: f64) -> String {
    let plain = value.to_string();
    if plain.len() <= MAX_DS_LEN {
        return plain;
    }
    for precision in (0..MAX_DS_LEN).rev() {
        let fixed = format!("{value:.precision$}");
        let fixed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        };
        if fixed.len() <= MAX_DS_LEN {
            return fixed;
        }
    }
    format!("{value:.6e}")
}

/// Multi-valued DS.
pub(crate) fn ds_values(values: &[f64]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|v| format_ds(*v)).collect())
}
