//! # DICOM-reslice library
//!
//! This crate re-slices a CT series stored as one DICOM file per slice along
//! a different anatomical axis, and writes the result as a new series of
//! single-slice files.
//!
//! It is built on the dicom-rs ecosystem. Slices are read tolerantly from a
//! directory: files that are not DICOM, or whose SOP class is not on the
//! allow-list, are skipped. The remaining slices are sorted by the third
//! component of Image Position (Patient) and stacked into a volume. The
//! volume's slice axis is then swapped with its row axis, so that the new
//! slices are orthogonal to the acquisition plane, and optionally every new
//! slice is resized to a square grid. Each output slice gets a freshly
//! synthesized record:
//!  - new SOP Instance UIDs derived from one generated base identifier
//!  - Study and Series Instance UID copied from the first slice
//!  - recomputed position, spacing and a fixed orientation
//!  - the original Rescale Slope/Intercept
//!
//! Assumptions about the input:
//!   - Single frame images (only the first frame is used)
//!   - All slices share dimensions, spacing and calibration with the first
//!     matching slice; only the dimensions are checked
//!
//! # Examples
//!
//! ## Re-slicing a directory
//!
//! Read all CT slices from `input/`, permute the volume and write one file
//! per new slice into `target/`.
//!
//! ```no_run
//! # use dicom_reslice::{config::Config, enums::Mode, pipeline::reslice_directory};
//! # use std::path::Path;
//! let written = reslice_directory(
//!     Path::new("input"),
//!     Path::new("target"),
//!     Mode::Dummy,
//!     &Config::default(),
//! )
//! .expect("should have re-sliced the series");
//! println!("wrote {} files", written.len());
//! ```
//!
//! ## Working with the volume directly
//!
//! ```no_run
//! # use dicom_reslice::{config::Config, enums::Mode, volume_loader::VolumeLoader};
//! let volume = VolumeLoader::load_from_directory("input", &Config::default())
//!     .expect("should have loaded files from directory");
//! let resliced = volume.reslice(Mode::Resample);
//! println!("{:?}", resliced.dim());
//! ```

pub mod config;
pub mod dataset_writer;
pub mod enums;
pub mod error;
mod interpolator;
pub mod metadata;
pub mod pipeline;
#[cfg(test)]
mod test_support;
pub mod uid;
pub mod volume;
pub mod volume_loader;
