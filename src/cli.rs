//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::color::{format_color, parse_color};
use crate::config::Config;
use crate::document::{Document, RasterDocument};
use crate::listing::{identifiers, Side};
use crate::palette::FilePaletteLoader;
use crate::plan::{
    execute, AcceptAllWidths, SwapError, SwapOutcome, SwapPlan, SwapRequest, WidthPrompt,
};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// palswap - Remap colors between palette rows across image layers
#[derive(Parser)]
#[command(name = "palswap")]
#[command(about = "Remap colors between palette-strip rows across image layers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Swap palette-row colors across one or more image layers
    Swap {
        /// Input PNG files, one drawable surface each
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory holding palette PNGs (default: from palswap.toml)
        #[arg(long)]
        palette_dir: Option<PathBuf>,

        /// Source palette identifier
        #[arg(long)]
        from: String,

        /// Source rows, whitespace-separated (e.g. "0 2 5")
        #[arg(long)]
        from_rows: String,

        /// Destination palette identifier (default: same as --from)
        #[arg(long)]
        to: Option<String>,

        /// Destination rows, whitespace-separated
        #[arg(long)]
        to_rows: String,

        /// Per-channel match tolerance, 0-255 (default: from palswap.toml)
        #[arg(long)]
        tolerance: Option<u8>,

        /// Skip the palette-width confirmation entirely
        #[arg(long)]
        skip_width_check: bool,

        /// Answer yes to the width-mismatch confirmation
        #[arg(short = 'y', long)]
        yes: bool,

        /// Write results here instead of overwriting the inputs
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the replacement pairs without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace one color with another across image layers, no palette needed
    Replace {
        /// Input PNG files, one drawable surface each
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Color to replace, as hex (e.g. "#FF00FF" or "#F0F")
        #[arg(long)]
        from_color: String,

        /// Replacement color, as hex
        #[arg(long)]
        to_color: String,

        /// Per-channel match tolerance, 0-255 (default: from palswap.toml)
        #[arg(long)]
        tolerance: Option<u8>,

        /// Write results here instead of overwriting the inputs
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List palette identifiers, including the reserved sentinels
    Palettes {
        /// Directory holding palette PNGs (default: from palswap.toml)
        #[arg(long)]
        palette_dir: Option<PathBuf>,

        /// List the destination-side identifiers instead of the source side
        #[arg(long)]
        destination: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_or_default() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match cli.command {
        Commands::Swap {
            inputs,
            palette_dir,
            from,
            from_rows,
            to,
            to_rows,
            tolerance,
            skip_width_check,
            yes,
            output,
            dry_run,
        } => {
            let request = SwapRequest {
                palette_dir: palette_dir.unwrap_or_else(|| config.palette_dir.clone()),
                from_identifier: from,
                from_rows_text: from_rows,
                to_identifier: to
                    .unwrap_or_else(|| crate::palette::MATCH_FROM.to_string()),
                to_rows_text: to_rows,
                tolerance: tolerance.unwrap_or(config.tolerance),
                check_widths: !skip_width_check && config.check_widths,
            };
            run_swap(&inputs, &request, yes, output.as_deref(), dry_run)
        }
        Commands::Replace {
            inputs,
            from_color,
            to_color,
            tolerance,
            output,
        } => run_replace(
            &inputs,
            &from_color,
            &to_color,
            tolerance.unwrap_or(config.tolerance),
            output.as_deref(),
        ),
        Commands::Palettes {
            palette_dir,
            destination,
        } => {
            let dir = palette_dir.unwrap_or(config.palette_dir);
            let side = if destination { Side::Destination } else { Side::Source };
            for identifier in identifiers(&dir, side) {
                println!("{}", identifier);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

/// Execute the swap command
fn run_swap(
    inputs: &[PathBuf],
    request: &SwapRequest,
    yes: bool,
    output: Option<&Path>,
    dry_run: bool,
) -> ExitCode {
    let mut loader = FilePaletteLoader;

    if dry_run {
        let plan = match SwapPlan::prepare(request, &mut loader) {
            Ok(plan) => plan,
            Err(e) => return report_swap_error(e),
        };
        if let Some((fw, tw)) = plan.width_mismatch() {
            eprintln!("Note: palette widths differ ({} vs {})", fw, tw);
        }
        for pair in plan.replacement_pairs() {
            println!(
                "{} -> {} (tolerance {})",
                format_color(pair.from),
                format_color(pair.to),
                pair.tolerance
            );
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let mut document = match load_layers(inputs) {
        Ok(layers) => RasterDocument::new(layers),
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let outcome = if yes {
        execute(request, &mut loader, &mut AcceptAllWidths, &mut document)
    } else {
        execute(request, &mut loader, &mut ConsolePrompt, &mut document)
    };

    let result = match outcome {
        Ok(SwapOutcome::Applied(result)) => result,
        Ok(SwapOutcome::Cancelled) => {
            println!("Cancelled, no file modified.");
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(e) => return report_swap_error(e),
    };

    if let Err(message) = write_layers(inputs, document.layers(), output) {
        eprintln!("Error: {}", message);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Applied {} replacement pair(s) across {} surface(s), {} pixel(s) changed",
        result.pairs_applied, result.surfaces_modified, result.pixels_changed
    );
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the replace command: one replacement pair, no palette involved.
fn run_replace(
    inputs: &[PathBuf],
    from_color: &str,
    to_color: &str,
    tolerance: u8,
    output: Option<&Path>,
) -> ExitCode {
    let from = match parse_color(from_color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: --from-color: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let to = match parse_color(to_color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: --to-color: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut document = match load_layers(inputs) {
        Ok(layers) => RasterDocument::new(layers),
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut pixels_changed = 0u64;
    for surface in 0..document.surface_count() {
        let changed = document
            .set_current_surface(surface)
            .and_then(|_| document.replace_color(from, to, tolerance));
        match changed {
            Ok(n) => pixels_changed += n,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    if let Err(message) = write_layers(inputs, document.layers(), output) {
        eprintln!("Error: {}", message);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Replaced {} across {} surface(s), {} pixel(s) changed",
        format_color(from),
        document.surface_count(),
        pixels_changed
    );
    ExitCode::from(EXIT_SUCCESS)
}

/// Open each input PNG as one drawable surface.
fn load_layers(inputs: &[PathBuf]) -> Result<Vec<image::RgbaImage>, String> {
    let mut layers = Vec::with_capacity(inputs.len());
    for input in inputs {
        let img = image::open(input)
            .map_err(|e| format!("Cannot open input '{}': {}", input.display(), e))?;
        layers.push(img.to_rgba8());
    }
    Ok(layers)
}

/// Write each layer back next to its input, or into the output directory.
fn write_layers(
    inputs: &[PathBuf],
    layers: &[image::RgbaImage],
    output: Option<&Path>,
) -> Result<(), String> {
    for (input, layer) in inputs.iter().zip(layers) {
        let target = match output {
            Some(dir) => {
                let name = input
                    .file_name()
                    .ok_or_else(|| format!("'{}' has no file name", input.display()))?;
                dir.join(name)
            }
            None => input.clone(),
        };
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Cannot create '{}': {}", parent.display(), e))?;
            }
        }
        layer
            .save(&target)
            .map_err(|e| format!("Cannot write '{}': {}", target.display(), e))?;
    }
    Ok(())
}

fn report_swap_error(e: SwapError) -> ExitCode {
    match e {
        SwapError::Validation { messages } => {
            for message in &messages {
                eprintln!("Error: {}", message);
            }
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        other => {
            eprintln!("Error: {}", other);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Interactive y/n prompt on stderr/stdin.
struct ConsolePrompt;

impl WidthPrompt for ConsolePrompt {
    fn confirm_width_mismatch(&mut self, from_width: u32, to_width: u32) -> bool {
        eprint!(
            "Palette widths differ ({} vs {}). Continue? [y/N] ",
            from_width, to_width
        );
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}
