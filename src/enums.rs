/// What happens to the volume after the axes have been permuted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Permute only, keep the in-plane resolution of the permuted slices.
    #[default]
    Dummy,
    /// Permute, then resize every slice to a square grid whose edge equals
    /// the new slice count.
    Resample,
}

/// How fresh identifiers are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum UidStrategy {
    /// `2.25.` followed by the decimal value of a time-ordered UUID.
    #[default]
    Uuid,
    /// Configured root, a day-month-year-hour-minute-second stamp and a
    /// three digit random suffix.
    Timestamp,
}
