use rtrb::{Consumer, Producer, RingBuffer};

use super::CONTROL_QUEUE_SIZE;
use crate::{
    dsp::envelope::AnalogEnvelope,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeMessage {
    NoteOn { key: u8, velocity: u8, legato: bool },
    NoteOff,
    Attack(f32),
    Decay(f32),
    Sustain(f32),
    Release(f32),
    TimeScale(f32),
}

/// Control-thread end of a [`SharedEnvelope`].
pub struct EnvelopeHandle {
    tx: Producer<EnvelopeMessage>,
}

impl EnvelopeHandle {
    /// A legato note-on keeps the current level instead of jumping to the
    /// start level.
    pub fn note_on(&mut self, key: u8, velocity: u8, legato: bool) -> Result<()> {
        self.send(EnvelopeMessage::NoteOn { key, velocity, legato })
    }

    pub fn note_off(&mut self) -> Result<()> {
        self.send(EnvelopeMessage::NoteOff)
    }

    pub fn set_attack(&mut self, ms: f32) -> Result<()> {
        self.send(EnvelopeMessage::Attack(ms))
    }

    pub fn set_decay(&mut self, ms: f32) -> Result<()> {
        self.send(EnvelopeMessage::Decay(ms))
    }

    pub fn set_sustain(&mut self, level: f32) -> Result<()> {
        self.send(EnvelopeMessage::Sustain(level))
    }

    pub fn set_release(&mut self, ms: f32) -> Result<()> {
        self.send(EnvelopeMessage::Release(ms))
    }

    pub fn set_time_scale(&mut self, scale: f32) -> Result<()> {
        self.send(EnvelopeMessage::TimeScale(scale))
    }

    fn send(&mut self, msg: EnvelopeMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            tracing::warn!(?msg, "envelope control queue full");
            Error::QueueFull("envelope")
        })
    }
}

/// Audio-thread end: an [`AnalogEnvelope`] driven by an [`EnvelopeHandle`].
pub struct SharedEnvelope {
    env: AnalogEnvelope,
    rx: Consumer<EnvelopeMessage>,
}

impl SharedEnvelope {
    pub fn new(env: AnalogEnvelope) -> (Self, EnvelopeHandle) {
        let (tx, rx) = RingBuffer::<EnvelopeMessage>::new(CONTROL_QUEUE_SIZE);
        (Self { env, rx }, EnvelopeHandle { tx })
    }

    pub fn envelope(&self) -> &AnalogEnvelope {
        &self.env
    }

    /// True until a released note has faded under the end floor.
    pub fn is_active(&self) -> bool {
        !self.env.end_is_reached()
    }

    pub fn apply_pending(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                EnvelopeMessage::NoteOn { key, velocity, legato } => {
                    self.env.note_on(legato, key, velocity)
                }
                EnvelopeMessage::NoteOff => self.env.note_off(),
                EnvelopeMessage::Attack(ms) => self.env.set_attack(ms),
                EnvelopeMessage::Decay(ms) => self.env.set_decay(ms),
                EnvelopeMessage::Sustain(level) => self.env.set_sustain_level(level),
                EnvelopeMessage::Release(ms) => self.env.set_release(ms),
                EnvelopeMessage::TimeScale(scale) => self.env.set_time_scale(scale),
            }
        }
    }

    /// Renders envelope values into `out` after applying pending messages.
    pub fn render(&mut self, out: &mut [f32]) {
        self.apply_pending();
        self.env.render(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{EnvelopePhase, SampleRate};

    fn shared() -> (SharedEnvelope, EnvelopeHandle) {
        SharedEnvelope::new(AnalogEnvelope::adsr(SampleRate::CD, 1.0, 20.0, 0.5, 5.0))
    }

    #[test]
    fn note_on_starts_with_the_next_block() {
        let (mut shared, mut handle) = shared();
        assert!(!shared.is_active());

        handle.note_on(60, 100, false).unwrap();
        let mut block = [0.0; 64];
        shared.render(&mut block);

        assert!(shared.is_active());
        assert!(shared.envelope().is_note_on());
        assert_eq!(shared.envelope().velocity(), 100);
        assert!(block[0] > 0.0, "first sample of the block is already attacking");
    }

    #[test]
    fn parameter_messages_reach_the_envelope() {
        let (mut shared, mut handle) = shared();
        handle.set_attack(12.0).unwrap();
        handle.set_decay(80.0).unwrap();
        handle.set_sustain(0.25).unwrap();
        handle.set_release(300.0).unwrap();
        handle.set_time_scale(2.0).unwrap();
        shared.apply_pending();

        let env = shared.envelope();
        assert!((env.attack() - 12.0).abs() < 1e-3);
        assert!((env.decay() - 80.0).abs() < 1e-3);
        assert_eq!(env.sustain_level(), 0.25);
        assert!((env.release() - 300.0).abs() < 1e-3);
        assert_eq!(env.time_scale(), 2.0);
    }

    #[test]
    fn note_off_releases_until_inactive() {
        let (mut shared, mut handle) = shared();
        handle.note_on(48, 64, false).unwrap();
        let mut block = [0.0; 512];
        shared.render(&mut block);

        handle.note_off().unwrap();
        shared.render(&mut block);
        assert_eq!(shared.envelope().phase(), EnvelopePhase::Release);

        for _ in 0..20 {
            shared.render(&mut block);
        }
        assert!(!shared.is_active());
    }

    #[test]
    fn full_queue_is_reported() {
        let (_shared, mut handle) = shared();
        for _ in 0..CONTROL_QUEUE_SIZE {
            handle.note_off().unwrap();
        }
        assert_eq!(handle.note_off(), Err(Error::QueueFull("envelope")));
    }
}
