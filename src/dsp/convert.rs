//! Unit conversions shared by the envelope and filter setters.

/// Decibels to linear amplitude: 0 dB → 1.0, -6.02 dB → 0.5.
#[inline]
pub fn db_to_amp(db: f32) -> f32 {
    const FACTOR: f32 = std::f32::consts::LN_10 / 20.0;
    (db * FACTOR).exp()
}

/// Linear amplitude to decibels. Zero and negative inputs map to -200 dB.
#[inline]
pub fn amp_to_db(amp: f32) -> f32 {
    const FACTOR: f32 = 20.0 / std::f32::consts::LN_10;
    amp.max(1e-10).ln() * FACTOR
}

/// Pitch offset in semitones to a frequency ratio: 12 → 2.0.
#[inline]
pub fn semitones_to_factor(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// MIDI note number to frequency in Hz (A4 = note 69 = 440 Hz).
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decibel_round_trip() {
        assert!((db_to_amp(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amp(-6.0206) - 0.5).abs() < 1e-4);
        assert!((amp_to_db(db_to_amp(-40.0)) + 40.0).abs() < 1e-3);
    }

    #[test]
    fn octave_is_twelve_semitones() {
        assert!((semitones_to_factor(12.0) - 2.0).abs() < 1e-6);
        assert!((semitones_to_factor(-12.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
    }
}
