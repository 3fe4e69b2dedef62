use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use log::info;

use crate::{
    config::Config, dataset_writer::DatasetSynthesizer, enums::Mode, error::ReslicerError,
    volume_loader::VolumeLoader,
};

/// Load the series in `input`, re-slice it and write the result into
/// `target`, which is created if absent. Nothing is created when loading
/// fails.
///
/// Returns the written files in slice order. Files written before a later
/// failure are left in place.
pub fn reslice_directory(
    input: &Path,
    target: &Path,
    mode: Mode,
    config: &Config,
) -> Result<Vec<PathBuf>, ReslicerError> {
    let t0 = Instant::now();

    let volume = VolumeLoader::load_from_directory(input, config)?;
    let original = volume.dim();
    let volume = volume.reslice(mode);
    info!("re-sliced {original:?} to {:?} ({mode:?})", volume.dim());

    let synthesizer = DatasetSynthesizer::new(&volume, config)?;
    fs::create_dir_all(target).map_err(|e| ReslicerError::OutputWriteFailure {
        path: target.to_path_buf(),
        source: Box::new(e),
    })?;
    let written = synthesizer.write_all(target)?;

    info!("done in {:?}", t0.elapsed());
    Ok(written)
}
