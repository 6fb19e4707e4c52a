//! Live playback: the audio callback owns the filter and envelope, the main
//! thread plays the acid line and sweeps the cutoff through the handles.

use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use teebee_dsp::{
    control::{SharedEnvelope, SharedFilter},
    dsp::{convert::midi_note_to_freq, AnalogEnvelope, SampleRate, TeeBeeFilter},
    patch::VoicePatch,
    MAX_BLOCK_SIZE,
};

use crate::voice::{Saw, ACID_LINE};

pub fn play(patch: VoicePatch, seconds: f32, bpm: f32) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = SampleRate::new(config.sample_rate().0 as f32)?;
    let channels = config.channels() as usize;
    tracing::info!(sample_rate = sample_rate.hz(), channels, "output device ready");

    let mut filter = TeeBeeFilter::new(sample_rate);
    let mut amp_env = AnalogEnvelope::new(sample_rate);
    patch.apply_to(&mut filter, &mut amp_env);

    let (mut shared_filter, mut filter_handle) = SharedFilter::new(filter);
    let (mut shared_env, mut env_handle) = SharedEnvelope::new(amp_env);

    // pitch travels through its own queue; the saw lives on the audio thread
    let (mut pitch_tx, mut pitch_rx) = rtrb::RingBuffer::<f32>::new(16);

    let mut saw = Saw::default();
    let mut voice_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut env_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            while let Ok(hz) = pitch_rx.pop() {
                saw.set_frequency(hz, sample_rate);
            }

            let total_frames = data.len() / channels;
            let mut frames_written = 0;
            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let voice = &mut voice_buf[..frames];
                let env = &mut env_buf[..frames];

                for sample in voice.iter_mut() {
                    *sample = saw.next_sample();
                }
                shared_filter.render(voice);
                shared_env.render(env);

                let offset = frames_written * channels;
                for (i, (&x, &gain)) in voice.iter().zip(env.iter()).enumerate() {
                    let start = offset + i * channels;
                    data[start..start + channels].fill(x * gain);
                }
                frames_written += frames;
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    let step = Duration::from_secs_f32(15.0 / bpm);
    let started = Instant::now();
    let base_cutoff = patch.filter.cutoff_hz;

    for (i, &(note, accent)) in ACID_LINE.iter().cycle().enumerate() {
        let elapsed = started.elapsed().as_secs_f32();
        if elapsed >= seconds {
            break;
        }

        // one slow sine sweep over four octaves every eight seconds
        let sweep = (elapsed * std::f32::consts::TAU / 8.0).sin();
        filter_handle.set_cutoff(base_cutoff * (2.0 * sweep).exp2())?;

        if pitch_tx.push(midi_note_to_freq(note)).is_err() {
            tracing::warn!(note, "pitch queue full");
        }
        env_handle.note_on(note, if accent { 127 } else { 90 }, false)?;
        std::thread::sleep(step / 2);
        env_handle.note_off()?;
        std::thread::sleep(step / 2);

        tracing::trace!(step = i, note, accent, "step");
    }

    Ok(())
}
