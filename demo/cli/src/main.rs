// mvc-clone CLI: file front end for the seamless cloning solver
// Copyright 2025 Lars Brubaker
// License: MIT

use std::path::{Path, PathBuf};

use clap::Parser;
use image::{DynamicImage, GrayImage, Luma, PixelWithColorType, Rgb};
use mvc_clone::{ClonePixel, MvcSolver, Offset, PixelImage, SolverOptions};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "mvc-clone")]
#[command(about = "Seamlessly clone a masked source region into a target image")]
#[command(version)]
struct Cli {
    /// Source image holding the patch.
    #[arg(long)]
    src: PathBuf,

    /// Target image the patch is blended into.
    #[arg(long)]
    target: PathBuf,

    /// Mask over the source; non-zero pixels select the patch.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Placement of the patch in the target (pixels).
    #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
    offset: Option<Vec<i32>>,

    /// Directory that receives results/ and meshes/.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// File name of the cloned image inside results/.
    #[arg(long, default_value = "result.png")]
    name: String,

    /// Also write the refined mesh drawn over the source.
    #[arg(long)]
    mesh: bool,

    /// Also write the cloned region alone over black.
    #[arg(long)]
    cropped: bool,

    /// Solver options as JSON (missing fields keep their defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run single-threaded.
    #[arg(long)]
    serial: bool,

    /// Clone in grayscale instead of RGB.
    #[arg(long)]
    gray: bool,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn open(path: &Path) -> CliResult<DynamicImage> {
    image::open(path)
        .map_err(|e| -> CliError { format!("Failed to open image {}: {}", path.display(), e).into() })
}

fn load_options(cli: &Cli) -> CliResult<SolverOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<SolverOptions>(&text)?
        }
        None => SolverOptions::default(),
    };
    if cli.serial {
        options = options.sequential();
    }
    options.validate()?;
    Ok(options)
}

fn run(cli: &Cli) -> CliResult<()> {
    let mask_path = cli
        .mask
        .as_ref()
        .ok_or("a --mask image is required (interactive masks are not supported)")?;
    let offset = match cli.offset.as_deref() {
        Some([dx, dy]) => Offset::new(*dx, *dy),
        Some(_) => return Err("--offset takes exactly two values".into()),
        None => Offset::ZERO,
    };
    let options = load_options(cli)?;

    tracing::info!("Loading source: {}", cli.src.display());
    let src = open(&cli.src)?;
    tracing::info!("Loading target: {}", cli.target.display());
    let target = open(&cli.target)?;
    let mask = open(mask_path)?.to_luma8();

    let threshold = options.mask_threshold;
    let mut solver = MvcSolver::with_options(options);
    let results_dir = cli.out_dir.join("results");
    std::fs::create_dir_all(&results_dir)?;
    let stem = Path::new(&cli.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());

    if cli.gray {
        let result = solver.solve(&src.to_luma8(), &target.to_luma8(), &mask, offset)?;
        write_outputs::<Luma<u8>>(cli, &result, &mask, threshold, offset, &results_dir, &stem)?;
    } else {
        let result = solver.solve(&src.to_rgb8(), &target.to_rgb8(), &mask, offset)?;
        write_outputs::<Rgb<u8>>(cli, &result, &mask, threshold, offset, &results_dir, &stem)?;
    }

    if cli.mesh {
        let meshes_dir = cli.out_dir.join("meshes");
        std::fs::create_dir_all(&meshes_dir)?;
        let path = meshes_dir.join(format!("{}_mesh.png", stem));
        solver.mesh().render(&src.to_rgb8()).save(&path)?;
        tracing::info!(
            "Mesh ({} vertices, {} triangles) written to {}",
            solver.mesh().vertex_count(),
            solver.mesh().face_count(),
            path.display()
        );
    }
    Ok(())
}

fn write_outputs<P>(
    cli: &Cli,
    result: &PixelImage<P>,
    mask: &GrayImage,
    threshold: u8,
    offset: Offset,
    results_dir: &Path,
    stem: &str,
) -> CliResult<()>
where
    P: ClonePixel + PixelWithColorType,
{
    let path = results_dir.join(&cli.name);
    result.save(&path)?;
    tracing::info!("Result written to {}", path.display());

    if cli.cropped {
        let path = results_dir.join(format!("{}_cropped.png", stem));
        cropped(result, mask, threshold, offset).save(&path)?;
        tracing::info!("Cropped result written to {}", path.display());
    }
    Ok(())
}

/// The masked region of `result` (at its target position) over black.
fn cropped<P: ClonePixel>(
    result: &PixelImage<P>,
    mask: &GrayImage,
    threshold: u8,
    offset: Offset,
) -> PixelImage<P> {
    let (w, h) = result.dimensions();
    let mut out = PixelImage::<P>::from_pixel(w, h, P::from_color([0.0; 3]));
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] <= threshold {
            continue;
        }
        let tx = x as i64 + offset.dx as i64;
        let ty = y as i64 + offset.dy as i64;
        if tx >= 0 && ty >= 0 && tx < w as i64 && ty < h as i64 {
            out.put_pixel(tx as u32, ty as u32, *result.get_pixel(tx as u32, ty as u32));
        }
    }
    out
}
