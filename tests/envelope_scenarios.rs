use teebee_dsp::dsp::{AnalogEnvelope, EnvelopePhase, SampleRate};

fn advance(env: &mut AnalogEnvelope, samples: usize) -> f32 {
    let mut level = env.level();
    for _ in 0..samples {
        level = env.get_sample();
    }
    level
}

#[test]
fn full_note_cycle() {
    let mut env = AnalogEnvelope::adsr(SampleRate::CD, 10.0, 100.0, 0.5, 50.0);
    env.note_on(false, 60, 64);

    let after_attack_tau = advance(&mut env, 441);
    assert!((after_attack_tau - 0.632).abs() < 0.01, "attack: {after_attack_tau}");

    let held = advance(&mut env, 44_100 - 441);
    assert_eq!(env.phase(), EnvelopePhase::Sustain);
    assert!((held - 0.5).abs() < 1e-3, "sustain: {held}");

    env.note_off();
    let first_release = env.get_sample();
    assert!(first_release < held && first_release > 0.99 * held);

    let after_release_tau = advance(&mut env, 2_204);
    let expected = held * (-1.0f32).exp();
    assert!(
        (after_release_tau - expected).abs() < 0.01,
        "release: {after_release_tau}, expected {expected}"
    );

    advance(&mut env, 44_100);
    assert!(env.end_is_reached());
}

#[test]
fn release_during_decay_starts_from_current_level() {
    let mut env = AnalogEnvelope::adsr(SampleRate::CD, 10.0, 100.0, 0.5, 50.0);
    env.note_on(false, 60, 64);

    // 50 ms in: past the attack, still falling toward sustain
    let held = advance(&mut env, 2_205);
    assert_eq!(env.phase(), EnvelopePhase::Decay);
    assert!(held > 0.55 && held < 0.632, "decay: {held}");

    env.note_off();
    assert_eq!(env.phase(), EnvelopePhase::Release);
    let first_release = env.get_sample();
    assert!(first_release < held && first_release > 0.99 * held);

    let after_release_tau = advance(&mut env, 2_204);
    let expected = held * (-1.0f32).exp();
    assert!(
        (after_release_tau - expected).abs() < 0.01,
        "release: {after_release_tau}, expected {expected}"
    );
}

#[test]
fn output_stays_between_levels_for_random_gating() {
    let mut env = AnalogEnvelope::adsr(SampleRate::CD, 3.0, 40.0, 0.3, 25.0);
    env.set_start_level(0.1);
    env.set_peak_level(0.9);
    env.set_end_level(0.05);

    env.note_on(false, 60, 64);

    let (low, high) = (0.05f32, 0.9f32);
    let mut seed = 0x2545_f491u32;
    for n in 0..50_000 {
        // xorshift gate pattern
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        if seed % 997 == 0 {
            env.note_on(seed % 2 == 0, 60, 64);
        } else if seed % 991 == 0 {
            env.note_off();
        }

        let y = env.get_sample();
        assert!(
            y >= low - 1e-6 && y <= high + 1e-6,
            "sample {n} escaped [{low}, {high}]: {y}"
        );
    }
}
