use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser as _;
use clap::Parser;

use tidir::error::DiskError;
use tidir::fs::catalog::Catalog;
use tidir::fs::filesystem::Filesystem;
use tidir::fs::image::DiskImage;
use tidir::fs::vib::{ReadOptions, DEFAULT_BITMAP_SCAN_LEN};
use tidir::fs::TiDisk;

#[derive(Parser)]
#[command(
    name = "tidir",
    version = env!("APP_VERSION"),
    about = "Catalog a TI-99/4A disk image or write its files to stdout"
)]
struct Cli {
    /// Disk image (.dsk, or .zst compressed)
    image: PathBuf,

    /// Files to extract; with none, the catalog is printed
    files: Vec<String>,

    /// Bitmap bytes scanned when counting used sectors
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_BITMAP_SCAN_LEN,
        value_parser = clap::value_parser!(u64).range(0..=DEFAULT_BITMAP_SCAN_LEN as u64).map(|n| n as usize)
    )]
    bitmap_scan_len: usize,

    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let image = DiskImage::open(&cli.image)
        .with_context(|| format!("can't read file {}", cli.image.display()))?;
    let options = ReadOptions {
        bitmap_scan_len: cli.bitmap_scan_len,
    };

    let disk = match TiDisk::open(image, options) {
        Ok(disk) => disk,
        Err(DiskError::InvalidVolume(msg)) => {
            eprintln!("{msg}, not cataloging.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if cli.files.is_empty() {
        print_catalog(&disk, cli.json)
    } else {
        extract_files(&disk, &cli.files)
    }
}

fn print_catalog(disk: &TiDisk, json: bool) -> Result<()> {
    let catalog = Catalog::build(disk)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &catalog)?;
        writeln!(out)?;
    } else {
        write!(out, "{catalog}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write each named file to stdout. Files that cannot be found or read are
/// reported on stderr and skipped.
fn extract_files(disk: &TiDisk, names: &[String]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for name in names {
        let written = disk
            .lookup(name)
            .and_then(|entry| disk.write_file_to(&entry, &mut out));
        match written {
            Ok(n) => log::debug!("{name}: wrote {n} bytes"),
            Err(DiskError::Io(e)) => return Err(e).context("writing to stdout"),
            Err(e) => eprintln!("{e}"),
        }
    }
    out.flush()?;
    Ok(())
}
