use std::fs::File;
use std::io::{self, BufWriter, Cursor, ErrorKind, Read, Seek, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use scchunks::{
    BlockRecord, Blocks, ChunksError, ChunksReader, DecodeOptions, ErrorPolicy, Plane, Surface,
    SurfaceRecord, VersionProfile,
};

#[derive(Parser)]
#[command(
    name = "scchunks",
    about = "Extract information from a Survivalcraft world's chunks file as CSV"
)]
struct Args {
    /// Version of Survivalcraft that wrote the file, or "auto" to detect it from the file name
    #[arg(short = 'V', long, default_value = "auto", value_name = "VERSION")]
    file_version: String,

    /// Chunks file to read. "-" or omitted reads stdin (requires an explicit version)
    #[arg(short = 'f', long, value_name = "FILE")]
    chunks_file: Option<PathBuf>,

    /// CSV file to write to. Defaults to stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Only extract blocks on one plane: a height (e.g. 64), or an offset from
    /// the surface (e.g. +1, -3). Ignored for surface extraction
    #[arg(short, long, value_name = "PLANE", allow_hyphen_values = true)]
    plane: Option<Plane>,

    /// Worker threads used to decode chunks
    #[arg(long, env = "SCCHUNKS_THREADS", default_value_t = 1)]
    threads: usize,

    /// Stop at the first damaged chunk instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// The type of data to extract
    #[arg(value_enum)]
    extract: Extract,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Extract {
    Blocks,
    Surface,
}

impl Args {
    /// The input path, or `None` for stdin.
    fn input_path(&self) -> Option<&PathBuf> {
        self.chunks_file.as_ref().filter(|p| p.as_os_str() != "-")
    }

    fn options(&self) -> DecodeOptions {
        let policy = if self.fail_fast {
            ErrorPolicy::FailFast
        } else {
            ErrorPolicy::BestEffort
        };
        DecodeOptions::default()
            .with_threads(self.threads)
            .with_policy(policy)
    }
}

/// Outcome of a completed extraction.
#[derive(Default)]
struct Summary {
    records: u64,
    chunk_errors: u64,
    warnings: u64,
    aborted: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let profile = match resolve_profile(&args) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return match e {
                ChunksError::UnsupportedVersion(_) => ExitCode::from(1),
                _ => ExitCode::from(2),
            };
        }
    };

    let result = open_output(&args).and_then(|mut out| match args.input_path() {
        Some(path) => File::open(path)
            .map_err(ChunksError::from)
            .and_then(|file| run(file, profile, &args, &mut out)),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .map_err(ChunksError::from)
                .and_then(|_| run(Cursor::new(bytes), profile, &args, &mut out))
        }
    });

    match result {
        Ok(summary) => {
            info!(
                "Extracted {} records ({} chunk errors, {} warnings)",
                summary.records, summary.chunk_errors, summary.warnings
            );
            if summary.aborted {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("ERROR: Failed to read chunks file");
            eprintln!("  {}", e);
            ExitCode::from(1)
        }
    }
}

fn resolve_profile(args: &Args) -> scchunks::Result<VersionProfile> {
    if args.file_version != "auto" {
        return VersionProfile::from_version(&args.file_version);
    }
    match args.input_path() {
        Some(path) => VersionProfile::from_path(path),
        None => Err(ChunksError::UndetectedVersion("<stdin>".to_string())),
    }
}

fn open_output(args: &Args) -> scchunks::Result<BufWriter<Box<dyn Write>>> {
    let out: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    Ok(BufWriter::new(out))
}

fn run<R: Read + Seek + Send>(
    source: R,
    profile: VersionProfile,
    args: &Args,
    out: &mut impl Write,
) -> scchunks::Result<Summary> {
    let reader = ChunksReader::with_profile(source, profile)?;
    let options = args.options();

    match (args.extract, args.plane) {
        (Extract::Blocks, Some(plane)) => {
            let mut iter = reader.iter_plane(plane, options);
            write_rows(out, &mut iter, options.policy, |it| it.take_warnings().len())
        }
        (Extract::Blocks, None) => {
            let mut iter = reader.iter_records::<Blocks>(options);
            write_rows(out, &mut iter, options.policy, |it| it.take_warnings().len())
        }
        (Extract::Surface, plane) => {
            if plane.is_some() {
                warn!("--plane has no effect on surface extraction");
            }
            let mut iter = reader.iter_records::<Surface>(options);
            write_rows(out, &mut iter, options.policy, |it| it.take_warnings().len())
        }
    }
}

/// Writes the CSV header and one row per record.
///
/// The library logs each warning as it is raised; here they are only counted.
/// A closed stdout (e.g. piping into `head`) ends the run quietly, which also
/// stops any further reads from the chunks file.
fn write_rows<I, T, W>(
    out: &mut impl Write,
    iter: &mut I,
    policy: ErrorPolicy,
    mut drain_warnings: W,
) -> scchunks::Result<Summary>
where
    I: Iterator<Item = scchunks::Result<T>>,
    T: CsvRow,
    W: FnMut(&mut I) -> usize,
{
    let mut summary = Summary::default();
    let written = (|| -> io::Result<()> {
        writeln!(out, "{}", T::HEADER)?;
        while let Some(item) = iter.next() {
            summary.warnings += drain_warnings(iter) as u64;
            match item {
                Ok(record) => {
                    record.write_row(out)?;
                    summary.records += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.chunk_errors += 1;
                    if policy == ErrorPolicy::FailFast {
                        summary.aborted = true;
                    }
                }
            }
        }
        summary.warnings += drain_warnings(iter) as u64;
        out.flush()
    })();

    match written {
        Ok(()) => Ok(summary),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("Output closed, stopping early");
            Ok(summary)
        }
        Err(e) => Err(e.into()),
    }
}

/// A record that can be written as one CSV row.
///
/// Columns follow the established Survivalcraft tooling: `x` and `y` are the
/// horizontal world coordinates, `z` is the height. Header names are quoted,
/// numbers are not.
trait CsvRow {
    const HEADER: &'static str;
    fn write_row(&self, out: &mut impl Write) -> io::Result<()>;
}

impl CsvRow for BlockRecord {
    const HEADER: &'static str = r#""x","y","z","type","light","state""#;

    fn write_row(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            self.world_x(),
            self.world_z(),
            self.local_y,
            self.block.block_type,
            self.block.light,
            self.block.data
        )
    }
}

impl CsvRow for SurfaceRecord {
    const HEADER: &'static str = r#""x","y","elevation","temperature","humidity""#;

    fn write_row(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{}",
            self.world_x(),
            self.world_z(),
            self.point.max_height,
            self.point.temperature,
            self.point.humidity
        )
    }
}
