use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};

use glyphheat::manifest::{
    load_and_validate_manifest_with_options, ManifestLoadOptions, ParamOverride,
};
use glyphheat::renderer::{scripted_events, HeatmapRenderer};
use glyphheat::schema::Manifest;

#[derive(Debug, Parser)]
#[command(name = "glyphheat")]
#[command(about = "Emoji Heatmap Compiler")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a manifest and print a scene summary.
    Check {
        manifest: PathBuf,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Render every frame as text.
    Render {
        manifest: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        /// Emit one JSON histogram line per frame instead of frame text on
        /// stdout.
        #[arg(long)]
        stats: bool,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Play the animation in the terminal.
    Preview {
        manifest: PathBuf,
        /// Cap playback below the manifest fps.
        #[arg(long = "fps-cap")]
        fps_cap: Option<u32>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Print the SHA-256 digest of one rendered frame.
    Digest {
        manifest: PathBuf,
        #[arg(long, default_value_t = 0)]
        frame: u32,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { manifest, set } => run_check(&manifest, &set),
        Commands::Render {
            manifest,
            output,
            stats,
            set,
        } => run_render(&manifest, output.as_deref(), stats, &set),
        Commands::Preview {
            manifest,
            fps_cap,
            set,
        } => run_preview(&manifest, fps_cap, &set),
        Commands::Digest {
            manifest,
            frame,
            set,
        } => run_digest(&manifest, frame, &set),
    }
}

fn version_string() -> String {
    match option_env!("GLYPHHEAT_GIT_HASH") {
        Some(hash) => format!("{} ({hash})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_owned(),
    }
}

fn load(manifest_path: &Path, set: &[String]) -> Result<Manifest> {
    let overrides = set
        .iter()
        .map(|raw| ParamOverride::parse(raw))
        .collect::<Result<Vec<_>>>()?;
    load_and_validate_manifest_with_options(manifest_path, &ManifestLoadOptions { overrides })
}

fn run_check(manifest_path: &Path, set: &[String]) -> Result<()> {
    let manifest = load(manifest_path, set)?;
    let renderer = HeatmapRenderer::from_manifest(&manifest)?;

    println!(
        "OK: {} ({}x{} cells, {} fps, {} frames)",
        manifest_path.display(),
        manifest.environment.grid.columns,
        manifest.environment.grid.rows,
        manifest.environment.fps,
        manifest.environment.total_frames()
    );
    println!(
        "Categories: {} ({} glyphs)",
        renderer.catalog().category_count(),
        renderer.catalog().total_glyphs()
    );
    for name in renderer.catalog().category_names() {
        let id = renderer
            .catalog()
            .category_id(name)
            .expect("listed category resolves");
        println!("  {}: {} glyphs", name, renderer.catalog().glyphs(id).len());
    }
    Ok(())
}

fn run_render(
    manifest_path: &Path,
    output_path: Option<&Path>,
    stats: bool,
    set: &[String],
) -> Result<()> {
    let manifest = load(manifest_path, set)?;
    let total_frames = manifest.environment.total_frames();
    let mut renderer = HeatmapRenderer::from_manifest(&manifest)?;

    let mut sink: Option<Box<dyn Write>> = match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(Box::new(BufWriter::new(file)))
        }
        None if !stats => Some(Box::new(std::io::stdout().lock())),
        None => None,
    };

    for frame_index in 0..total_frames {
        for event in scripted_events(&manifest.interaction, frame_index) {
            renderer.handle_event(event);
        }

        let frame = renderer.render_frame(frame_index);
        if let Some(writer) = sink.as_mut() {
            writer.write_all(frame.to_text().as_bytes())?;
            if frame_index + 1 < total_frames {
                writer.write_all(b"\n")?;
            }
        }
        if stats {
            println!("{}", serde_json::to_string(&renderer.frame_stats())?);
        }

        if frame_index % manifest.environment.fps == 0 {
            eprintln!("rendered frame {}/{}", frame_index + 1, total_frames);
        }
    }

    if let Some(mut writer) = sink {
        writer.flush()?;
    }
    if let Some(path) = output_path {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_preview(manifest_path: &Path, fps_cap: Option<u32>, set: &[String]) -> Result<()> {
    let manifest = load(manifest_path, set)?;
    let total_frames = manifest.environment.total_frames();
    let mut renderer = HeatmapRenderer::from_manifest(&manifest)?;

    let playback_fps = match fps_cap {
        Some(cap) => manifest.environment.fps.min(cap.max(1)),
        None => manifest.environment.fps,
    };
    let frame_millis = 1000 / u64::from(playback_fps.max(1));

    for frame_index in 0..total_frames {
        for event in scripted_events(&manifest.interaction, frame_index) {
            renderer.handle_event(event);
        }

        let frame = renderer.render_frame(frame_index);
        print!("\x1B[2J\x1B[H");
        println!(
            "frame {}/{} @ {}fps\n{}",
            frame_index + 1,
            total_frames,
            playback_fps,
            frame.to_text()
        );
        thread::sleep(Duration::from_millis(frame_millis));
    }

    Ok(())
}

fn run_digest(manifest_path: &Path, frame: u32, set: &[String]) -> Result<()> {
    let manifest = load(manifest_path, set)?;
    let mut renderer = HeatmapRenderer::from_manifest(&manifest)?;

    // Earlier frames still render so the scripted gestures and balancer
    // feedback land in the same state a full run would reach.
    let mut text = String::new();
    for frame_index in 0..=frame {
        for event in scripted_events(&manifest.interaction, frame_index) {
            renderer.handle_event(event);
        }
        text = renderer.render_frame(frame_index).to_text();
    }

    println!("{}", sha256_hex(text.as_bytes()));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
