#![allow(dead_code)]

use std::{fs::File, io::BufWriter, path::Path};

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom::transfer_syntax::entries::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN};
use dicom_dictionary_std::tags;

pub const CT: &str = "1.2.840.10008.5.1.4.1.1.2";
pub const MR: &str = "1.2.840.10008.5.1.4.1.1.4";
pub const SERIES_UID: &str = "1.2.826.0.1.3680043.8.498.77.1";
pub const STUDY_UID: &str = "1.2.826.0.1.3680043.8.498.77";

fn strs(values: &[String]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().cloned().collect())
}

/// A CT slice of `rows` x `columns` whose samples are `marker + column`.
pub fn ct_dataset(
    sop_class: &str,
    position: f64,
    rows: u16,
    columns: u16,
    marker: u16,
) -> InMemDicomObject {
    let samples: Vec<u16> = (0..rows as usize * columns as usize)
        .map(|i| marker + (i % columns as usize) as u16)
        .collect();

    InMemDicomObject::from_element_iter([
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(sop_class)),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(format!("{SERIES_UID}.{marker}")),
        ),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from(STUDY_UID)),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from(SERIES_UID)),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("CT")),
        DataElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^Jane")),
        DataElement::new(tags::PATIENT_POSITION, VR::CS, PrimitiveValue::from("HFS")),
        DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            strs(&["-100".to_string(), "-100".to_string(), position.to_string()]),
        ),
        DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            strs(&["0.5".to_string(), "0.75".to_string()]),
        ),
        DataElement::new(tags::SLICE_THICKNESS, VR::DS, PrimitiveValue::from("2.5")),
        DataElement::new(tags::RESCALE_SLOPE, VR::DS, PrimitiveValue::from("1")),
        DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, PrimitiveValue::from("-1024")),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(columns)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::from(bytemuck::cast_slice::<u16, u8>(&samples).to_vec()),
        ),
    ])
}

/// Write a dataset as a regular DICOM file with a file meta group.
pub fn write_file(dir: &Path, name: &str, dataset: InMemDicomObject) {
    let sop_class = dataset
        .element(tags::SOP_CLASS_UID)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let sop_instance = dataset
        .element(tags::SOP_INSTANCE_UID)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let file = dataset
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
                .media_storage_sop_class_uid(sop_class)
                .media_storage_sop_instance_uid(sop_instance),
        )
        .unwrap();
    file.write_to_file(dir.join(name)).unwrap();
}

/// Write a dataset with neither preamble nor file meta group, encoded in
/// implicit VR little endian.
pub fn write_bare(dir: &Path, name: &str, dataset: &InMemDicomObject) {
    let out = BufWriter::new(File::create(dir.join(name)).unwrap());
    dataset
        .write_dataset_with_ts(out, &IMPLICIT_VR_LITTLE_ENDIAN.erased())
        .unwrap();
}

fn meta_element(out: &mut Vec<u8>, element: u16, vr: &[u8; 2], value: &[u8]) {
    out.extend_from_slice(&0x0002_u16.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(vr);
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value);
}

fn uid_bytes(uid: &str) -> Vec<u8> {
    let mut bytes = uid.as_bytes().to_vec();
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

/// Write a dataset in implicit VR little endian behind a preamble and a file
/// meta group that has SOP class and instance but no transfer syntax.
pub fn write_without_transfer_syntax(dir: &Path, name: &str, dataset: &InMemDicomObject) {
    let sop_instance = dataset
        .element(tags::SOP_INSTANCE_UID)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let mut group = Vec::new();
    meta_element(&mut group, 0x0002, b"UI", &uid_bytes(CT));
    meta_element(&mut group, 0x0003, b"UI", &uid_bytes(&sop_instance));

    let mut out = vec![0_u8; 128];
    out.extend_from_slice(b"DICM");
    meta_element(&mut out, 0x0000, b"UL", &(group.len() as u32).to_le_bytes());
    out.extend_from_slice(&group);
    dataset
        .write_dataset_with_ts(&mut out, &IMPLICIT_VR_LITTLE_ENDIAN.erased())
        .unwrap();
    std::fs::write(dir.join(name), out).unwrap();
}

/// A series of `count` slices with positions `spacing * i`, written in
/// reverse order of position.
pub fn write_series(dir: &Path, count: usize, rows: u16, columns: u16, spacing: f64) {
    for i in (0..count).rev() {
        let dataset = ct_dataset(CT, spacing * i as f64, rows, columns, (i * 1000) as u16);
        write_file(dir, &format!("slice_{:02}.dcm", count - 1 - i), dataset);
    }
}
