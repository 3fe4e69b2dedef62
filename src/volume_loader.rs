use crate::{
    config::Config,
    error::{ReslicerError, SkipReason},
    metadata::{self, SliceTemplate, VolumeGeometry},
    volume::Volume,
};

use dicom::{
    object::{FileDicomObject, FileMetaTableBuilder, InMemDicomObject, OpenFileOptions},
    pixeldata::{
        ConvertOptions, ModalityLutOption, PixelDecoder, PixelRepresentation, Rescale,
        VoiLutOption,
    },
    transfer_syntax::entries::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN},
};
use dicom_dictionary_std::tags;
use log::{debug, info, warn};
use ndarray::{Array2, Array3, s};
use std::{
    cmp::Ordering,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

pub type DicomFile = FileDicomObject<InMemDicomObject>;

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from DICOM objects
    ///
    /// Objects whose SOP class is not on the allow-list, or whose pixel data
    /// cannot be decoded, are left out. The first remaining object becomes the
    /// template.
    ///
    /// # Errors
    ///
    /// Returns error if no object matched, the template lacks a required
    /// field, or the slices disagree in dimensions
    pub fn load_from_dicom_objects(
        dicom_objects: &[DicomFile],
        config: &Config,
    ) -> Result<Volume, ReslicerError> {
        let mut series = SeriesAccumulator::new(config);
        for (i, dicom_object) in dicom_objects.iter().enumerate() {
            series.offer(dicom_object, &format!("object #{i}"))?;
        }
        series.finish()
    }

    /// Load a volume from file paths. Unreadable files are skipped.
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        config: &Config,
    ) -> Result<Volume, ReslicerError> {
        let mut series = SeriesAccumulator::new(config);
        for path in paths {
            let path = path.as_ref();
            match Self::read_tolerant(path) {
                Ok(dicom_object) => series.offer(&dicom_object, &path.display().to_string())?,
                Err(reason) => series.skip(&path.display().to_string(), reason),
            }
        }
        series.finish()
    }

    /// Load a volume from every regular file in a directory, visited in path
    /// order.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Volume, ReslicerError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();
        info!("{} candidate files in {}", paths.len(), path.as_ref().display());

        Self::load_from_file_paths(&paths, config)
    }

    /// Read a file as a DICOM object. A missing transfer syntax, either
    /// because there is no file meta group at all or because the meta group
    /// lacks one, defaults to implicit VR little endian.
    pub fn read_tolerant(path: &Path) -> Result<DicomFile, SkipReason> {
        let open_error = match OpenFileOptions::new().open_file(path) {
            Ok(dicom_object) => return Ok(dicom_object),
            Err(e) => e,
        };
        let unreadable = |e: &dyn Display| SkipReason::UnreadableFile(e.to_string());
        let bytes = fs::read(path).map_err(|e| unreadable(&e))?;

        // A bare data set starts with an element of group 0x0008
        if bytes.starts_with(&[0x08, 0x00]) {
            debug!(
                "{}: no file meta group, defaulting to implicit VR little endian",
                path.display()
            );
            return Self::read_implicit_dataset(&bytes, None);
        }

        if bytes.get(128..132) == Some(&b"DICM"[..]) {
            let rest = &bytes[132..];
            let meta_len = Self::meta_group_len(rest).ok_or_else(|| unreadable(&open_error))?;
            let (meta, dataset) = rest.split_at(meta_len);
            let meta =
                InMemDicomObject::read_dataset_with_ts(meta, &EXPLICIT_VR_LITTLE_ENDIAN.erased())
                    .map_err(|e| unreadable(&e))?;
            if metadata::string(&meta, tags::TRANSFER_SYNTAX_UID).is_none() {
                debug!(
                    "{}: file meta group has no transfer syntax, \
                     defaulting to implicit VR little endian",
                    path.display()
                );
                return Self::read_implicit_dataset(dataset, Some(&meta));
            }
        }

        Err(unreadable(&open_error))
    }

    /// Byte length of the explicit VR little endian group 0x0002 elements at
    /// the start of `bytes`.
    fn meta_group_len(bytes: &[u8]) -> Option<usize> {
        let mut offset = 0;
        while bytes.get(offset..)?.starts_with(&[0x02, 0x00]) {
            let field = |range: std::ops::Range<usize>| bytes.get(range);
            let (header_len, value_len) = match field(offset + 4..offset + 6)? {
                b"OB" | b"OD" | b"OF" | b"OL" | b"OV" | b"OW" | b"SQ" | b"SV" | b"UC" | b"UN"
                | b"UR" | b"UT" | b"UV" => {
                    let len: [u8; 4] = field(offset + 8..offset + 12)?.try_into().ok()?;
                    (12, u32::from_le_bytes(len) as usize)
                }
                _ => {
                    let len: [u8; 2] = field(offset + 6..offset + 8)?.try_into().ok()?;
                    (8, usize::from(u16::from_le_bytes(len)))
                }
            };
            offset += header_len + value_len;
        }
        Some(offset)
    }

    /// Read `bytes` as an implicit VR little endian data set and attach a
    /// file meta group declaring that encoding. SOP class and instance come
    /// from the original meta group when present.
    fn read_implicit_dataset(
        bytes: &[u8],
        meta: Option<&InMemDicomObject>,
    ) -> Result<DicomFile, SkipReason> {
        let dataset =
            InMemDicomObject::read_dataset_with_ts(bytes, &IMPLICIT_VR_LITTLE_ENDIAN.erased())
                .map_err(|e| SkipReason::UnreadableFile(e.to_string()))?;

        let lookup = |meta_tag, dataset_tag| {
            meta.and_then(|meta| metadata::string(meta, meta_tag))
                .or_else(|| metadata::string(&dataset, dataset_tag))
        };
        let sop_class_uid = lookup(tags::MEDIA_STORAGE_SOP_CLASS_UID, tags::SOP_CLASS_UID)
            .ok_or(SkipReason::NonMatchingSeries(None))?;
        let sop_instance_uid =
            lookup(tags::MEDIA_STORAGE_SOP_INSTANCE_UID, tags::SOP_INSTANCE_UID)
                .unwrap_or_default();

        dataset
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
                    .media_storage_sop_class_uid(sop_class_uid)
                    .media_storage_sop_instance_uid(sop_instance_uid),
            )
            .map_err(|e| SkipReason::UnreadableFile(e.to_string()))
    }

    /// Accept an object when either its data set or its file meta group
    /// carries a SOP class on the allow-list.
    fn check_sop_class(dicom_object: &DicomFile, config: &Config) -> Result<(), SkipReason> {
        let dataset_class = metadata::string(dicom_object, tags::SOP_CLASS_UID);
        let meta_class = dicom_object
            .meta()
            .media_storage_sop_class_uid
            .trim_end_matches('\0')
            .to_string();

        let accepted = dataset_class
            .iter()
            .chain(std::iter::once(&meta_class))
            .any(|class| config.accepts_sop_class(class));
        if accepted {
            Ok(())
        } else {
            Err(SkipReason::NonMatchingSeries(dataset_class.or(Some(meta_class))))
        }
    }

    /// First frame of the pixel data as 16-bit samples. Stored values are
    /// masked to Bits Stored and sign-extended per Pixel Representation, no
    /// LUT is applied, and signed samples keep their two's complement bits.
    fn decode_image(dicom_object: &DicomFile) -> Result<Array2<u16>, SkipReason> {
        let unsupported = |e: &dyn Display| SkipReason::UnsupportedPixelData(e.to_string());
        let pixel_data = dicom_object
            .decode_pixel_data()
            .map_err(|e| unsupported(&e))?;
        if pixel_data.samples_per_pixel() != 1
            || !pixel_data.photometric_interpretation().is_monochrome()
        {
            return Err(unsupported(&format!(
                "{} with {} samples per pixel",
                pixel_data.photometric_interpretation(),
                pixel_data.samples_per_pixel()
            )));
        }
        if !matches!(pixel_data.bits_allocated(), 8 | 16) {
            return Err(unsupported(&format!(
                "{} bits allocated",
                pixel_data.bits_allocated()
            )));
        }

        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::Override(Rescale::new(1.0, 0.0)))
            .with_voi_lut(VoiLutOption::Identity);
        let frame = match pixel_data.pixel_representation() {
            PixelRepresentation::Signed => pixel_data
                .to_ndarray_frame_with_options::<i16>(0, &options)
                .map(|arr| arr.mapv(|v| v as u16)),
            PixelRepresentation::Unsigned => {
                pixel_data.to_ndarray_frame_with_options::<u16>(0, &options)
            }
        }
        .map_err(|e| unsupported(&e))?;

        Ok(frame.slice_move(s![.., .., 0]))
    }

    /// Stable sort by position; equal positions keep encounter order.
    pub(crate) fn sort_slices(slices: &mut [(f64, Array2<u16>)]) {
        slices.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    }

    pub(crate) fn build_volume_array(images: &[Array2<u16>]) -> Array3<u16> {
        let (height, width) = images[0].dim();
        let depth = images.len();
        let mut volume = Array3::<u16>::zeros((depth, height, width));

        for (i, image) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }
}

/// Collects the slices of one series in encounter order.
struct SeriesAccumulator<'a> {
    config: &'a Config,
    template: Option<(SliceTemplate, VolumeGeometry, (usize, usize))>,
    slices: Vec<(f64, Array2<u16>)>,
    skipped: usize,
}

impl<'a> SeriesAccumulator<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            template: None,
            slices: Vec::new(),
            skipped: 0,
        }
    }

    fn skip(&mut self, origin: &str, reason: SkipReason) {
        self.skipped += 1;
        match reason {
            SkipReason::NonMatchingSeries(_) => debug!("skipping {origin}: {reason}"),
            _ => warn!("skipping {origin}: {reason}"),
        }
    }

    /// Add an object to the series, or skip it when it does not belong.
    fn offer(&mut self, dicom_object: &DicomFile, origin: &str) -> Result<(), ReslicerError> {
        if let Err(reason) = VolumeLoader::check_sop_class(dicom_object, self.config) {
            self.skip(origin, reason);
            return Ok(());
        }
        let image = match VolumeLoader::decode_image(dicom_object) {
            Ok(image) => image,
            Err(reason) => {
                self.skip(origin, reason);
                return Ok(());
            }
        };
        let position = metadata::through_plane_position(dicom_object);

        match &self.template {
            None => {
                let position = position.ok_or_else(|| ReslicerError::MalformedTemplate {
                    origin: origin.to_string(),
                    field: "ImagePositionPatient",
                })?;
                let template = SliceTemplate::from_template(dicom_object, origin)?;
                let geometry = VolumeGeometry::from_template(dicom_object, origin)?;
                debug!("template {origin}: {geometry:?}");
                self.template = Some((template, geometry, image.dim()));
                self.slices.push((position, image));
            }
            Some((_, _, expected)) => {
                let position = position.ok_or_else(|| ReslicerError::MalformedSlice {
                    origin: origin.to_string(),
                    field: "ImagePositionPatient",
                })?;
                if image.dim() != *expected {
                    return Err(ReslicerError::InconsistentDimensions {
                        origin: origin.to_string(),
                        expected: *expected,
                        actual: image.dim(),
                    });
                }
                debug!("accepted {origin} at {position}");
                self.slices.push((position, image));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Volume, ReslicerError> {
        let (template, geometry, _) = self.template.ok_or(ReslicerError::EmptySeries)?;

        VolumeLoader::sort_slices(&mut self.slices);
        let images: Vec<_> = self.slices.into_iter().map(|(_, image)| image).collect();
        let volume = Volume::new(VolumeLoader::build_volume_array(&images), geometry, template);

        info!(
            "assembled volume {:?} from {} slices ({} skipped)",
            volume.dim(),
            images.len(),
            self.skipped
        );
        Ok(volume)
    }
}
