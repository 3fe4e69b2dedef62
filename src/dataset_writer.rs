use crate::{
    config::Config,
    error::ReslicerError,
    metadata::{ds_values, format_ds},
    uid::UidGenerator,
    volume::Volume,
    volume_loader::DicomFile,
};

use dicom::{
    core::{DataElement, PrimitiveValue, Tag, VR},
    object::{FileMetaTableBuilder, InMemDicomObject},
    transfer_syntax::entries::IMPLICIT_VR_LITTLE_ENDIAN,
};
use dicom_dictionary_std::tags;
use log::{debug, info};
use ndarray::{ArrayView2, Axis};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Output file names carry a three digit index.
pub const MAX_OUTPUT_SLICES: usize = 1000;

const IMAGE_ORIENTATION: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// `IM000.dcm` .. `IM999.dcm`
pub fn output_file_name(index: usize) -> Result<String, ReslicerError> {
    if index >= MAX_OUTPUT_SLICES {
        return Err(ReslicerError::IdentifierExhaustion(format!(
            "slice index {index} does not fit a three digit file name"
        )));
    }
    Ok(format!("IM{index:03}.dcm"))
}

/// Builds one fresh record per slice of a (permuted) volume.
pub struct DatasetSynthesizer<'a> {
    volume: &'a Volume,
    config: &'a Config,
    series_base_uid: String,
}

impl<'a> DatasetSynthesizer<'a> {
    /// Generate the base identifier for this output series.
    ///
    /// # Errors
    ///
    /// Fails before anything is written when the slice count exceeds the
    /// file name capacity, an identifier would be too long, or a dimension
    /// does not fit in a US value.
    pub fn new(volume: &'a Volume, config: &'a Config) -> Result<Self, ReslicerError> {
        let geometry = volume.geometry();
        if geometry.slice_count > MAX_OUTPUT_SLICES {
            return Err(ReslicerError::IdentifierExhaustion(format!(
                "{} output slices, at most {MAX_OUTPUT_SLICES} file names available",
                geometry.slice_count
            )));
        }
        for extent in [geometry.rows, geometry.columns] {
            if u16::try_from(extent).is_err() {
                return Err(ReslicerError::DimensionOverflow(extent));
            }
        }

        let series_base_uid = UidGenerator::generate(config.uid_strategy, &config.uid_root);
        if let Some(last) = geometry.slice_count.checked_sub(1) {
            UidGenerator::instance_uid(&series_base_uid, last)?;
        }
        debug!("output series base identifier {series_base_uid}");

        Ok(Self {
            volume,
            config,
            series_base_uid,
        })
    }

    pub fn series_base_uid(&self) -> &str {
        &self.series_base_uid
    }

    /// Build the record of output slice `index` from its pixel grid.
    pub fn synthesize(
        &self,
        index: usize,
        slice: ArrayView2<'_, u16>,
    ) -> Result<DicomFile, ReslicerError> {
        let geometry = self.volume.geometry();
        let template = self.volume.template();
        let instance_uid = UidGenerator::instance_uid(&self.series_base_uid, index)?;
        let position = index as f64 * geometry.slice_thickness;
        let (rows, columns) = slice.dim();
        let samples: Vec<u16> = slice.iter().copied().collect();

        let mut obj = InMemDicomObject::new_empty();
        for element in &template.pass_through {
            obj.put(element.clone());
        }

        let text = |s: &str| PrimitiveValue::from(s);
        let ds = |v: f64| PrimitiveValue::from(format_ds(v));
        let us = |v: usize| PrimitiveValue::from(v as u16);
        let mut put = |tag: Tag, vr: VR, value: PrimitiveValue| {
            obj.put(DataElement::new(tag, vr, value));
        };

        put(tags::SOP_CLASS_UID, VR::UI, text(&self.config.output_sop_class_uid));
        put(tags::SOP_INSTANCE_UID, VR::UI, text(&instance_uid));
        put(tags::STUDY_INSTANCE_UID, VR::UI, text(&template.study_instance_uid));
        put(tags::SERIES_INSTANCE_UID, VR::UI, text(&template.series_instance_uid));
        put(tags::MODALITY, VR::CS, text(&self.config.modality));
        put(
            tags::IMAGE_TYPE,
            VR::CS,
            PrimitiveValue::Strs(self.config.image_type.iter().cloned().collect()),
        );
        put(tags::INSTANCE_NUMBER, VR::IS, text(&(index + 1).to_string()));

        put(tags::IMAGE_POSITION_PATIENT, VR::DS, ds_values(&[0.0, 0.0, position]));
        put(tags::IMAGE_ORIENTATION_PATIENT, VR::DS, ds_values(&IMAGE_ORIENTATION));
        put(tags::SLICE_LOCATION, VR::DS, ds(position));
        put(tags::SLICE_THICKNESS, VR::DS, ds(geometry.slice_thickness));
        put(
            tags::PIXEL_SPACING,
            VR::DS,
            ds_values(&[geometry.pixel_spacing.0, geometry.pixel_spacing.1]),
        );

        put(tags::SAMPLES_PER_PIXEL, VR::US, us(1));
        put(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, text("MONOCHROME2"));
        put(tags::ROWS, VR::US, us(rows));
        put(tags::COLUMNS, VR::US, us(columns));
        put(tags::BITS_ALLOCATED, VR::US, us(16));
        put(tags::BITS_STORED, VR::US, us(16));
        put(tags::HIGH_BIT, VR::US, us(15));
        put(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(template.pixel_representation),
        );
        put(tags::RESCALE_INTERCEPT, VR::DS, ds(geometry.rescale_intercept));
        put(tags::RESCALE_SLOPE, VR::DS, ds(geometry.rescale_slope));
        put(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::from(bytemuck::cast_slice::<u16, u8>(&samples).to_vec()),
        );

        obj.with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
                .media_storage_sop_class_uid(self.config.output_sop_class_uid.as_str())
                .media_storage_sop_instance_uid(instance_uid.as_str())
                .implementation_class_uid(self.config.implementation_class_uid.as_str())
                .implementation_version_name(self.config.implementation_version_name.as_str()),
        )
        .map_err(|e| ReslicerError::OutputWriteFailure {
            path: PathBuf::from(format!("IM{index:03}.dcm")),
            source: Box::new(e),
        })
    }

    /// Write every slice of the volume into `target` and return the paths in
    /// slice order. Existing files are never overwritten.
    pub fn write_all(&self, target: &Path) -> Result<Vec<PathBuf>, ReslicerError> {
        let mut written = Vec::with_capacity(self.volume.geometry().slice_count);

        for (index, slice) in self.volume.data().axis_iter(Axis(0)).enumerate() {
            let path = target.join(output_file_name(index)?);
            let record = self.synthesize(index, slice)?;
            Self::write_record(&record, &path)?;
            debug!("created {}", path.display());
            written.push(path);
        }

        info!("wrote {} slices to {}", written.len(), target.display());
        Ok(written)
    }

    fn write_record(record: &DicomFile, path: &Path) -> Result<(), ReslicerError> {
        let failure = |source: Box<dyn std::error::Error + Send + Sync>| {
            ReslicerError::OutputWriteFailure {
                path: path.to_path_buf(),
                source,
            }
        };

        let file = File::create_new(path).map_err(|e| failure(Box::new(e)))?;
        let mut writer = BufWriter::new(file);
        record.write_all(&mut writer).map_err(|e| failure(Box::new(e)))?;
        writer.flush().map_err(|e| failure(Box::new(e)))
    }
}
