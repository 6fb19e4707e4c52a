use teebee_dsp::dsp::{FilterMode, SampleRate, TeeBeeFilter};

fn impulse_response(filter: &mut TeeBeeFilter, len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| filter.get_sample(if n == 0 { 1.0 } else { 0.0 }))
        .collect()
}

#[test]
fn lowpass24_impulse_rings_briefly_then_settles() {
    let mut filter = TeeBeeFilter::with_mode(FilterMode::Lowpass24, SampleRate::CD);
    filter.set_cutoff(1000.0);
    filter.set_resonance(50.0);

    let response = impulse_response(&mut filter, 4_000);
    assert!(response[0].is_finite());

    let (peak_index, peak) = response
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |best, (i, &x)| if x.abs() > best.1 { (i, x.abs()) } else { best });
    assert!(peak_index < 50, "peak at sample {peak_index}");
    assert!(peak > 0.0);

    let tail = response[2_000..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    assert!(tail < 0.01 * peak, "still ringing at {tail} (peak {peak})");
}

#[test]
fn every_mode_is_stable_under_a_swept_cutoff() {
    let rate = SampleRate::CD;
    for mode in FilterMode::ALL {
        let mut filter = TeeBeeFilter::with_mode(mode, rate);
        filter.set_resonance(100.0);

        for n in 0..20_000 {
            let sweep = (n as f32 / 20_000.0 * std::f32::consts::TAU).sin();
            filter.set_cutoff(2_000.0 * (3.0 * sweep).exp2());
            let saw = 2.0 * (n as f32 * 110.0 / rate.hz()).fract() - 1.0;
            let y = filter.get_sample(saw);
            assert!(y.is_finite() && y.abs() < 200.0, "{mode} blew up at sample {n}: {y}");
        }
    }
}

#[test]
fn sample_rate_change_keeps_cutoff_in_hz() {
    let mut filter = TeeBeeFilter::with_mode(FilterMode::Lowpass24, SampleRate::CD);
    filter.set_cutoff(1500.0);
    let at_cd = filter.coefficients();

    let rate = SampleRate::new(88_200.0).unwrap();
    filter.set_sample_rate(rate);
    assert_eq!(filter.cutoff(), 1500.0);
    assert_ne!(filter.coefficients(), at_cd);

    let fresh = {
        let mut f = TeeBeeFilter::with_mode(FilterMode::Lowpass24, rate);
        f.set_cutoff(1500.0);
        f.coefficients()
    };
    assert_eq!(filter.coefficients(), fresh);
}
