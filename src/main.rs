use std::{error::Error, path::PathBuf};

use clap::Parser;
use dicom_reslice::{
    config::Config,
    enums::{Mode, UidStrategy},
    pipeline::reslice_directory,
};

/// Re-slice a directory of single-slice CT files along another axis.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input DICOM folder
    #[arg(long, default_value = "./input")]
    input: String,

    /// Target DICOM folder
    #[arg(long, default_value = "./target")]
    target: String,

    #[arg(long, value_enum, default_value_t = Mode::Dummy)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = UidStrategy::Uuid)]
    uid_strategy: UidStrategy,

    /// Root for timestamp identifiers
    #[arg(long)]
    uid_root: Option<String>,
}

/// Shells on some platforms pass quotes through verbatim.
fn strip_quotes(arg: &str) -> PathBuf {
    PathBuf::from(arg.replace(['"', '\''], ""))
}

fn main() -> Result<(), Box<dyn Error + Sync + Send>> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args = Args::parse();

    let mut config = Config::default().with_uid_strategy(args.uid_strategy);
    if let Some(root) = args.uid_root {
        config = config.with_uid_root(root);
    }

    reslice_directory(
        &strip_quotes(&args.input),
        &strip_quotes(&args.target),
        args.mode,
        &config,
    )?;

    Ok(())
}
