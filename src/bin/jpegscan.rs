//! jpegscan CLI - simulated progressive JPEG refinement from the command line.
//!
//! Writes the coarse-to-fine scans of a JPEG to disk, applies single blur
//! passes, and re-encodes images with explicit save options.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use jpegscan_rs::approximation;
use jpegscan_rs::codec::{DctMethod, EncodeOptions, ImageCodec, JpegCodec, PngCodec, Quality};
use jpegscan_rs::eligibility;
use jpegscan_rs::loader::{self, LoadRequest, LoadStrategy};
use jpegscan_rs::{PixelBuffer, ScanSchedule, ScanSequencer, Viewer};

/// Simulated progressive JPEG refinement
#[derive(Parser)]
#[command(name = "jpegscan")]
#[command(author = "jpegscan-rs contributors")]
#[command(version)]
#[command(about = "Emulate how a progressive JPEG refines scan by scan", long_about = None)]
#[command(after_help = "EXAMPLES:
    jpegscan scans -i photo.jpg -o scans/
    jpegscan scans -i photo.jpg -o scans/ -f png --base-radius 12 --max-scans 7
    jpegscan blur -i photo.jpg -o blurred.png -r 6 -f png
    jpegscan save -i photo.jpg -o out.jpg -q 90 --scan 3
    jpegscan info -i photo.jpg")]
struct Cli {
    /// Log debug output (scan radii, eligibility decisions)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every simulated scan of an image, coarsest first
    ///
    /// Files are named scan_1.<ext>, scan_2.<ext>, ... in the output directory.
    #[command(visible_alias = "s")]
    Scans {
        /// Input image (JPEG for progressive simulation)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory, created if missing
        #[arg(short, long)]
        output: PathBuf,

        /// Output format for each scan
        #[arg(short, long, default_value = "jpeg", value_enum)]
        format: OutputFormat,

        /// Quality for JPEG output (0-100)
        #[arg(short, long, default_value = "75")]
        quality: u8,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Apply a single approximation pass with an explicit radius
    #[command(visible_alias = "b")]
    Blur {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Neighbourhood half-width; 0 copies the image
        #[arg(short, long, default_value = "8")]
        radius: u32,

        #[arg(short, long, default_value = "jpeg", value_enum)]
        format: OutputFormat,

        #[arg(short, long, default_value = "75")]
        quality: u8,
    },

    /// Re-encode an image as JPEG with explicit save options
    ///
    /// Progressive and DCT options are accepted but do not change the output.
    Save {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Quality level (0-100)
        #[arg(short, long, default_value = "75")]
        quality: u8,

        /// Request progressive encoding
        #[arg(long)]
        progressive: bool,

        /// DCT method
        #[arg(long, default_value = "integer", value_enum)]
        dct: DctArg,

        /// Save this scan instead of the full-detail image
        #[arg(long)]
        scan: Option<u32>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Show format, eligibility and dimensions of an image
    #[command(visible_alias = "i")]
    Info {
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Print the radius used at each scan
    Schedule {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct ScheduleArgs {
    /// Blur radius of the first scan
    #[arg(long, default_value = "8")]
    base_radius: u32,

    /// Radius decrease per scan
    #[arg(long, default_value = "2")]
    radius_step: u32,

    /// Number of scans including the first
    #[arg(long, default_value = "5")]
    max_scans: u32,
}

impl ScheduleArgs {
    fn to_schedule(self) -> ScanSchedule {
        let schedule = ScanSchedule::new(self.base_radius, self.radius_step, self.max_scans);
        if !schedule.reaches_full_detail() {
            log::warn!(
                "schedule ends at radius {}; the last scan will still be blurred",
                schedule.coarseness_of(schedule.max_scans())
            );
        }
        schedule
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Baseline JPEG
    Jpeg,
    /// Lossless PNG
    Png,
    /// Portable PixMap (P6, alpha dropped)
    Ppm,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Ppm => "ppm",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DctArg {
    Integer,
    Fast,
    Float,
}

impl From<DctArg> for DctMethod {
    fn from(arg: DctArg) -> Self {
        match arg {
            DctArg::Integer => DctMethod::Integer,
            DctArg::Fast => DctMethod::Fast,
            DctArg::Float => DctMethod::Float,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Scans {
            input,
            output,
            format,
            quality,
            schedule,
        } => write_scans(&input, &output, format, quality, schedule.to_schedule()),
        Commands::Blur {
            input,
            output,
            radius,
            format,
            quality,
        } => blur_image(&input, &output, radius, format, quality),
        Commands::Save {
            input,
            output,
            quality,
            progressive,
            dct,
            scan,
            schedule,
        } => save_image(
            &input,
            &output,
            quality,
            progressive,
            dct.into(),
            scan,
            schedule.to_schedule(),
        ),
        Commands::Info { input, schedule } => show_info(&input, schedule.to_schedule()),
        Commands::Schedule { schedule } => print_schedule(schedule.to_schedule()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn write_scans(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    quality: u8,
    schedule: ScanSchedule,
) -> Result<(), Box<dyn std::error::Error>> {
    let quality = Quality::new(quality)?;
    fs::create_dir_all(output)?;

    let mut sequencer = ScanSequencer::new(schedule);
    let request = LoadRequest {
        path: input.to_path_buf(),
        strategy: LoadStrategy::ProgressiveSimulated,
    };
    let outcome = loader::execute_load(&request, &JpegCodec, &mut sequencer)?;

    let mut written = vec![write_scan(output, 1, &outcome.image, format, quality)?];
    while sequencer.has_more() {
        let Some(scan) = sequencer.advance() else {
            break;
        };
        written.push(write_scan(output, sequencer.scan_index(), &scan, format, quality)?);
    }

    println!(
        "✓ Wrote {} scans of {}x{} image to {:?}",
        written.len(),
        outcome.image.width(),
        outcome.image.height(),
        output
    );
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn write_scan(
    dir: &Path,
    index: u32,
    scan: &PixelBuffer,
    format: OutputFormat,
    quality: Quality,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(format!("scan_{}.{}", index, format.extension()));
    write_output(&path, scan, format, quality)?;
    Ok(path)
}

fn blur_image(
    input: &Path,
    output: &Path,
    radius: u32,
    format: OutputFormat,
    quality: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let quality = Quality::new(quality)?;
    let data = fs::read(input)?;
    let source = JpegCodec.decode(&data)?;
    let blurred = approximation::apply(&source, radius);
    write_output(output, &blurred, format, quality)?;

    println!(
        "✓ Blurred {}x{} image (radius {}, stride {}) to {:?}",
        source.width(),
        source.height(),
        radius,
        approximation::sampling_stride(radius),
        output
    );
    Ok(())
}

fn save_image(
    input: &Path,
    output: &Path,
    quality: u8,
    progressive: bool,
    dct_method: DctMethod,
    scan: Option<u32>,
    schedule: ScanSchedule,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = EncodeOptions {
        quality: Quality::new(quality)?,
        progressive,
        dct_method,
    };
    let target_scan = scan.unwrap_or(schedule.max_scans()).clamp(1, schedule.max_scans());

    let mut viewer = Viewer::new(JpegCodec, schedule);
    viewer.load(input)?;
    while viewer.scan_index() < target_scan && viewer.next_scan().is_some() {}

    let outcome = viewer.save(output, options)?;
    println!(
        "✓ Saved scan {} as JPEG (quality {}) to {:?}: {} bytes",
        viewer.scan_index(),
        quality,
        output,
        outcome.bytes_written
    );
    Ok(())
}

fn show_info(input: &Path, schedule: ScanSchedule) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();

    let kind = eligibility::sniff(&data);
    let eligible = eligibility::detect_eligibility(&data);
    println!(
        "Format: {}",
        match kind {
            eligibility::SourceKind::ProgressiveJpeg => "JPEG (progressive, SOF2)",
            eligibility::SourceKind::BaselineJpeg => "JPEG (no SOF2 in header)",
            eligibility::SourceKind::Unrecognized => "Not JPEG",
        }
    );
    println!("  Eligible:   {}", if eligible { "Yes" } else { "No" });

    match JpegCodec.decode(&data) {
        Ok(image) => {
            println!("  Dimensions: {}x{}", image.width(), image.height());
            println!("  Channels:   {}", image.channel_count());
        }
        Err(e) => println!("  Decode:     failed ({})", e),
    }

    if kind.is_jpeg() && eligible {
        let radii: Vec<String> = schedule.radii().map(|r| r.to_string()).collect();
        println!("  Scans:      {} (radii {})", schedule.max_scans(), radii.join(", "));
    }
    Ok(())
}

fn print_schedule(schedule: ScanSchedule) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Base radius {}, step {}, {} scans",
        schedule.base_radius(),
        schedule.radius_step(),
        schedule.max_scans()
    );
    println!("Scan  Radius  Stride");
    for (index, radius) in (1..).zip(schedule.radii()) {
        let stride = if radius == 0 {
            "-".to_string()
        } else {
            approximation::sampling_stride(radius).to_string()
        };
        println!("{:>4}  {:>6}  {:>6}", index, radius, stride);
    }
    Ok(())
}

// Internal helpers

fn write_output(
    path: &Path,
    image: &PixelBuffer,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Jpeg => {
            let options = EncodeOptions {
                quality,
                ..EncodeOptions::default()
            };
            fs::write(path, JpegCodec.encode(image, &options)?)?;
        }
        OutputFormat::Png => {
            fs::write(path, PngCodec.encode(image, &EncodeOptions::default())?)?;
        }
        OutputFormat::Ppm => write_ppm(path, image)?,
    }
    Ok(())
}

fn write_ppm(path: &Path, image: &PixelBuffer) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    let mut file = std::io::BufWriter::new(fs::File::create(path)?);

    writeln!(file, "P6")?;
    writeln!(file, "{} {}", image.width(), image.height())?;
    writeln!(file, "255")?;
    for pixel in image.data().chunks_exact(image.channel_count()) {
        file.write_all(&pixel[..3])?;
    }
    file.flush()?;

    Ok(())
}
