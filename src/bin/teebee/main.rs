//! teebee - render, analyze and play the 303 voice from the command line
//!
//! Run with: cargo run -- render --out acid.wav

mod analyze;
mod play;
mod render;
mod voice;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, Result, WrapErr};
use teebee_dsp::{
    dsp::{FilterMode, SampleRate, TeeBeeFilter},
    patch::VoicePatch,
};

use render::RenderSettings;

#[derive(Parser)]
#[command(name = "teebee")]
#[command(about = "TB-303 style filter and envelope kernel")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an acid line to a 32-bit float WAV file
    Render {
        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,

        /// Voice patch (TOML)
        #[arg(short, long)]
        patch: Option<PathBuf>,

        /// Number of sixteenth notes
        #[arg(long, default_value_t = 32)]
        notes: usize,

        #[arg(long, default_value_t = 130.0)]
        bpm: f32,

        /// Run the voice at 4x and decimate (overrides the patch)
        #[arg(long)]
        oversample: bool,

        #[arg(long, default_value_t = 44_100.0)]
        sample_rate: f32,
    },

    /// Print impulse response statistics of a filter setting
    Analyze {
        /// Voice patch (TOML); only the filter section is used
        #[arg(short, long)]
        patch: Option<PathBuf>,

        /// Cutoff in Hz (overrides the patch)
        #[arg(long)]
        cutoff: Option<f32>,

        /// Resonance in percent (overrides the patch)
        #[arg(long)]
        resonance: Option<f32>,

        /// Filter mode, e.g. tb303, lowpass24, bandpass6_6 (overrides the patch)
        #[arg(long)]
        mode: Option<FilterMode>,

        #[arg(long, default_value_t = 44_100.0)]
        sample_rate: f32,
    },

    /// Play the acid line on the default output device
    Play {
        /// Voice patch (TOML)
        #[arg(short, long)]
        patch: Option<PathBuf>,

        /// Playback length in seconds
        #[arg(long, default_value_t = 16.0)]
        seconds: f32,

        #[arg(long, default_value_t = 130.0)]
        bpm: f32,
    },
}

fn load_patch(path: Option<&Path>) -> Result<VoicePatch> {
    let Some(path) = path else {
        return Ok(VoicePatch::default());
    };
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read patch {}", path.display()))?;
    let patch = toml::from_str(&text)
        .wrap_err_with(|| format!("failed to parse patch {}", path.display()))?;
    tracing::info!(path = %path.display(), "patch loaded");
    Ok(patch)
}

/// Tempo must be a positive, finite number of beats per minute.
fn check_bpm(bpm: f32) -> Result<f32> {
    if !bpm.is_finite() || bpm <= 0.0 {
        bail!("invalid tempo {bpm} bpm: expected a positive number");
    }
    Ok(bpm)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Render {
            out,
            patch,
            notes,
            bpm,
            oversample,
            sample_rate,
        } => {
            let mut patch = load_patch(patch.as_deref())?;
            patch.oversample |= oversample;
            let settings = RenderSettings {
                notes,
                bpm: check_bpm(bpm)?,
                sample_rate: SampleRate::new(sample_rate)?,
            };

            let samples = render::render_line(patch, &settings);
            render::write_wav(&out, &samples, settings.sample_rate)?;
            println!(
                "Wrote {} samples ({:.2} s) to {}",
                samples.len(),
                samples.len() as f32 * settings.sample_rate.period(),
                out.display()
            );
        }
        Commands::Analyze {
            patch,
            cutoff,
            resonance,
            mode,
            sample_rate,
        } => {
            let mut settings = load_patch(patch.as_deref())?.filter;
            if let Some(hz) = cutoff {
                settings.cutoff_hz = hz;
            }
            if let Some(percent) = resonance {
                settings.resonance = percent;
            }
            if let Some(mode) = mode {
                settings.mode = mode;
            }

            let mut filter = TeeBeeFilter::new(SampleRate::new(sample_rate)?);
            settings.apply_to(&mut filter);
            let report = analyze::analyze(&mut filter);
            let coefficients = filter.coefficients();

            println!("=== {} ===", filter.mode());
            println!("Cutoff:     {:.1} Hz", filter.cutoff());
            println!("Resonance:  {:.1} %", filter.resonance());
            println!(
                "Coeffs:     a1 {:.6}  b0 {:.6}  k {:.4}  g {:.4}",
                coefficients.a1, coefficients.b0, coefficients.k, coefficients.g
            );
            println!(
                "Peak:       {:.5} ({:.1} dB) at sample {}",
                report.peak,
                report.peak_db(),
                report.peak_index
            );
            match report.settle_index {
                Some(n) => println!("Below 1%:   from sample {n}"),
                None => println!("Below 1%:   never (self-oscillating)"),
            }
            println!("Dominant:   {:.1} Hz", report.dominant_hz);
        }
        Commands::Play {
            patch,
            seconds,
            bpm,
        } => {
            let bpm = check_bpm(bpm)?;
            let patch = load_patch(patch.as_deref())?;
            play::play(patch, seconds, bpm)?;
        }
    }

    Ok(())
}
