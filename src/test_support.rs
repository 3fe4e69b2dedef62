//! Synthetic CT slices for unit tests.

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom::transfer_syntax::entries::EXPLICIT_VR_LITTLE_ENDIAN;
use dicom_dictionary_std::tags;

use crate::config::CT_IMAGE_STORAGE_UID;
use crate::volume_loader::DicomFile;

pub(crate) struct SyntheticSlice {
    position: f64,
    fill: u16,
    rows: u16,
    columns: u16,
    sop_class: String,
    thickness: String,
}

impl SyntheticSlice {
    pub(crate) fn new(position: f64) -> Self {
        Self {
            position,
            fill: 0,
            rows: 4,
            columns: 6,
            sop_class: CT_IMAGE_STORAGE_UID.to_string(),
            thickness: "2.5".to_string(),
        }
    }

    pub(crate) fn fill(mut self, fill: u16) -> Self {
        self.fill = fill;
        self
    }

    pub(crate) fn size(mut self, rows: u16, columns: u16) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    pub(crate) fn sop_class(mut self, sop_class: &str) -> Self {
        self.sop_class = sop_class.to_string();
        self
    }

    pub(crate) fn thickness(mut self, thickness: &str) -> Self {
        self.thickness = thickness.to_string();
        self
    }
}

fn strs(values: &[&str]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect())
}

pub(crate) fn ct_slice(slice: &SyntheticSlice) -> DicomFile {
    let samples = vec![slice.fill; slice.rows as usize * slice.columns as usize];
    let position = slice.position.to_string();
    let instance_uid = format!("1.2.3.4.5.{}", slice.fill);

    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(slice.sop_class.as_str()),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(instance_uid.as_str()),
        ),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3")),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3.4")),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("CT")),
        DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from("PAT-1")),
        DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            strs(&["0", "0", position.as_str()]),
        ),
        DataElement::new(tags::PIXEL_SPACING, VR::DS, strs(&["0.5", "0.75"])),
        DataElement::new(tags::SLICE_THICKNESS, VR::DS, strs(&[slice.thickness.as_str()])),
        DataElement::new(tags::RESCALE_SLOPE, VR::DS, strs(&["1"])),
        DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, strs(&["-1024"])),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(slice.rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(slice.columns)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::from(bytemuck::cast_slice::<u16, u8>(&samples).to_vec()),
        ),
    ]);

    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
            .media_storage_sop_class_uid(slice.sop_class.as_str())
            .media_storage_sop_instance_uid(instance_uid.as_str()),
    )
    .expect("valid file meta")
}

/// Replace the pixel data of `obj` with a single row of stored samples.
pub(crate) fn with_stored_samples(
    mut obj: DicomFile,
    bits_allocated: u16,
    bits_stored: u16,
    signed: bool,
    data: Vec<u8>,
) -> DicomFile {
    let columns = (data.len() / usize::from(bits_allocated / 8)) as u16;
    let vr = if bits_allocated == 8 { VR::OB } else { VR::OW };
    let us = |v: u16| PrimitiveValue::from(v);

    obj.put(DataElement::new(tags::ROWS, VR::US, us(1)));
    obj.put(DataElement::new(tags::COLUMNS, VR::US, us(columns)));
    obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, us(bits_allocated)));
    obj.put(DataElement::new(tags::BITS_STORED, VR::US, us(bits_stored)));
    obj.put(DataElement::new(tags::HIGH_BIT, VR::US, us(bits_stored - 1)));
    obj.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, us(u16::from(signed))));
    obj.put(DataElement::new(tags::PIXEL_DATA, vr, PrimitiveValue::from(data)));
    obj
}
