use clap::Parser;
use image::RgbaImage;
use std::path::PathBuf;
use tracing::info;

use overtype::backend::{
    BackendError, DocumentPackager, PageRasterizer, RasterPage, RawFragment, TextRecognizer,
};
use overtype::render::Compositor;
use overtype::utils::config::AppConfig;
use overtype::{Editor, Page};

#[derive(Parser, Debug)]
#[command(name = "overtype")]
#[command(about = "Merge recognition fragments into editable regions and export a composited page")]
struct Args {
    /// Rasterized page image
    #[arg(long, short = 'p')]
    page: PathBuf,

    /// JSON file with recognizer output (a list of raw fragments)
    #[arg(long, short = 'f')]
    fragments: Option<PathBuf>,

    /// Output directory
    #[arg(long, short = 'o', default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overtype=info".into()),
        )
        .init();

    let config = match AppConfig::init() {
        Ok(config) => config,
        Err(_) => AppConfig::get(),
    };

    run(&args, config)?;

    Ok(())
}

fn run(args: &Args, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rasterizer = ImageFileRasterizer {
        path: args.page.clone(),
    };
    let raster = rasterizer.rasterize(1, 1.0)?;
    info!(width = raster.width, height = raster.height, "loaded page raster");

    let mut editor = Editor::new();
    editor.add_page(Page::new(1, raster.width as f32, raster.height as f32, 1.0));
    editor.open_page(0)?;

    let recognizer = FragmentFileRecognizer {
        path: args.fragments.clone(),
    };
    let progress = |report: overtype::backend::Progress| {
        info!(stage = %report.stage, fraction = report.fraction, "recognizer progress");
    };
    let recognition = recognizer.recognize(&raster.image, Some(&progress));
    let seeded = editor.ingest_recognition(recognition)?;
    info!(regions = seeded, "seeded editable regions");

    std::fs::create_dir_all(&args.out_dir)?;

    let regions_path = args.out_dir.join("regions.json");
    let page = editor.current_page()?;
    std::fs::write(&regions_path, serde_json::to_string_pretty(page.regions.list())?)?;
    info!(path = %regions_path.display(), "wrote region list");

    let compositor = Compositor::from_config(config)?;
    let exported = editor.export_pages(std::slice::from_ref(&raster.image), &compositor)?;
    let bytes = PngPackager.package(&exported)?;

    let export_path = args.out_dir.join("page_1.png");
    std::fs::write(&export_path, bytes)?;
    info!(path = %export_path.display(), "wrote composited export");

    Ok(())
}

/// Demo rasterizer over a single pre-rendered page image.
struct ImageFileRasterizer {
    path: PathBuf,
}

impl PageRasterizer for ImageFileRasterizer {
    fn rasterize(&self, _page_number: u32, _scale: f32) -> Result<RasterPage, BackendError> {
        let image = image::open(&self.path)
            .map_err(|error| BackendError::Rasterization {
                message: error.to_string(),
            })?
            .to_rgba8();
        Ok(RasterPage::new(image))
    }

    fn page_count(&self) -> u32 {
        1
    }
}

/// Demo recognizer that replays recognition output from a JSON file.
struct FragmentFileRecognizer {
    path: Option<PathBuf>,
}

impl TextRecognizer for FragmentFileRecognizer {
    fn recognize(
        &self,
        _image: &RgbaImage,
        on_progress: Option<overtype::backend::ProgressFn<'_>>,
    ) -> Result<Vec<RawFragment>, BackendError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(Vec::new()),
        };

        if let Some(report) = on_progress {
            report(overtype::backend::Progress {
                stage: "reading fragments".to_string(),
                fraction: 0.0,
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|error| BackendError::Recognition {
                message: error.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|error| BackendError::Recognition {
            message: error.to_string(),
        })
    }
}

/// Demo packager: encodes the first composited page as a PNG.
struct PngPackager;

impl DocumentPackager for PngPackager {
    fn package(&self, pages: &[RgbaImage]) -> Result<Vec<u8>, BackendError> {
        let page = pages.first().ok_or_else(|| BackendError::Packaging {
            message: "no pages to package".to_string(),
        })?;

        overtype::render::encode_png(page).map_err(|error| BackendError::Packaging {
            message: error.to_string(),
        })
    }
}
