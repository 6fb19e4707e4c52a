//! Offline rendering of the acid line to a WAV file.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use teebee_dsp::{dsp::SampleRate, patch::VoicePatch, MAX_BLOCK_SIZE};

use crate::voice::{AcidVoice, ACID_LINE};

pub struct RenderSettings {
    pub notes: usize,
    pub bpm: f32,
    pub sample_rate: SampleRate,
}

/// Renders `settings.notes` sixteenth notes, each gated for half a step.
/// A step is at least one sample long.
pub fn render_line(patch: VoicePatch, settings: &RenderSettings) -> Vec<f32> {
    let step = ((settings.sample_rate.hz() * 15.0 / settings.bpm).round() as usize).max(1);
    let gate = step / 2;
    let mut voice = AcidVoice::new(patch, settings.sample_rate);
    let mut samples = vec![0.0f32; step * settings.notes];

    for (i, chunk) in samples.chunks_mut(step).enumerate() {
        let (note, accent) = ACID_LINE[i % ACID_LINE.len()];
        voice.note_on(note, 100, accent);

        let (held, released) = chunk.split_at_mut(gate.min(chunk.len()));
        for block in held.chunks_mut(MAX_BLOCK_SIZE) {
            voice.render(block);
        }
        voice.note_off();
        for block in released.chunks_mut(MAX_BLOCK_SIZE) {
            voice.render(block);
        }
    }
    samples
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: SampleRate) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate.hz() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample).wrap_err("failed to write sample")?;
    }
    writer.finalize().wrap_err("failed to finalize wav")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_length_follows_tempo() {
        let settings = RenderSettings {
            notes: 4,
            bpm: 120.0,
            sample_rate: SampleRate::CD,
        };
        let samples = render_line(VoicePatch::default(), &settings);

        // a sixteenth at 120 bpm is 125 ms
        assert_eq!(samples.len(), 4 * 5_513);
        assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn extreme_tempo_renders_one_sample_steps() {
        let settings = RenderSettings {
            notes: 8,
            bpm: 1.0e9,
            sample_rate: SampleRate::CD,
        };
        let samples = render_line(VoicePatch::default(), &settings);
        assert_eq!(samples.len(), 8);
        assert!(samples.iter().all(|x| x.is_finite()));
    }
}
