//! # HEIGHTBRICK CLI
//!
//! ```bash
//! heightbrick -m maps/island.png -c maps/island_colors.png -z 40 --gapfill --optimize
//! heightbrick --config island.toml --blid -1
//! ```
//!
//! Exits with status 1 on any error; the previous output file, if any, is
//! left as it was.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use heightbrick::{run, AppResult, GenerationConfig, PipelineSummary};
use tracing::Level;

/// Convert heightmaps and colormaps into Blockland .bls save files.
#[derive(Parser, Debug)]
#[command(name = "heightbrick", version, about)]
struct Cli {
    /// Heightmap image (red channel = height in plates)
    #[arg(short = 'm', long)]
    heightmap: Option<PathBuf>,

    /// Colormap image
    #[arg(short = 'c', long)]
    colormap: Option<PathBuf>,

    /// Palette (colorset) text file
    #[arg(short = 's', long)]
    colorset: Option<PathBuf>,

    /// Output .bls file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Target X size in cells
    #[arg(short = 'x')]
    width: Option<u32>,

    /// Target Y size in cells
    #[arg(short = 'y')]
    height: Option<u32>,

    /// Stretch heights to this many plates above the lowest point
    #[arg(short = 'z')]
    z: Option<u32>,

    /// BL_ID to save the map under; negative for none
    #[arg(long, allow_hyphen_values = true)]
    blid: Option<i64>,

    /// Sit the map on the ground at its lowest point
    #[arg(long)]
    ground: bool,

    /// Fill steep vertical gaps
    #[arg(long)]
    gapfill: bool,

    /// Merge uniform 2x2 blocks into the second catalog brick
    #[arg(long)]
    optimize: bool,

    /// Brick catalog JSON
    #[arg(long)]
    bricks: Option<PathBuf>,

    /// Vertical step (1 = plate, 3 = brick)
    #[arg(long)]
    step: Option<u32>,

    /// TOML file with generation settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log stage details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layers explicit flags over the config file (or the defaults).
    fn resolve(self) -> AppResult<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(v) = self.heightmap {
            config.heightmap = v;
        }
        if let Some(v) = self.colormap {
            config.colormap = v;
        }
        if let Some(v) = self.colorset {
            config.colorset = v;
        }
        if let Some(v) = self.output {
            config.output = v;
        }
        if let Some(v) = self.bricks {
            config.bricks = v;
        }
        config.width = self.width.or(config.width);
        config.height = self.height.or(config.height);
        config.z = self.z.or(config.z);
        config.step = self.step.unwrap_or(config.step);
        config.blid = self.blid.unwrap_or(config.blid);
        // Switches can only be turned on from the command line
        config.ground |= self.ground;
        config.gap_fill |= self.gapfill;
        config.optimize |= self.optimize;

        Ok(config)
    }
}

fn report(summary: &PipelineSummary) {
    println!("Map generated!");
    println!(" [+] Grid:       {}x{}", summary.rows, summary.cols);
    println!(" [+] Bricks:     {}", summary.save.records);
    println!(" [+] Stacked:    {}", summary.stacked_cells);
    println!(" [+] Merged:     {}", summary.merge.blocks_merged);
    println!(" [+] Bytes:      {}", summary.save.bytes);
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let result = cli.resolve().and_then(|config| {
        println!("{config}");
        run(&config)
    });

    match result {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
