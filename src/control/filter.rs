use rtrb::{Consumer, Producer, RingBuffer};

use super::CONTROL_QUEUE_SIZE;
use crate::{
    dsp::filter::{FilterMode, TeeBeeFilter},
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterMessage {
    Cutoff(f32),
    Resonance(f32),
    Drive(f32),
    Mode(FilterMode),
    FeedbackHighpass(f32),
    Reset,
}

/// Control-thread end of a [`SharedFilter`].
pub struct FilterHandle {
    tx: Producer<FilterMessage>,
}

impl FilterHandle {
    pub fn set_cutoff(&mut self, hz: f32) -> Result<()> {
        self.send(FilterMessage::Cutoff(hz))
    }

    pub fn set_resonance(&mut self, percent: f32) -> Result<()> {
        self.send(FilterMessage::Resonance(percent))
    }

    pub fn set_drive(&mut self, db: f32) -> Result<()> {
        self.send(FilterMessage::Drive(db))
    }

    pub fn set_mode(&mut self, mode: FilterMode) -> Result<()> {
        self.send(FilterMessage::Mode(mode))
    }

    pub fn set_feedback_highpass_cutoff(&mut self, hz: f32) -> Result<()> {
        self.send(FilterMessage::FeedbackHighpass(hz))
    }

    pub fn reset(&mut self) -> Result<()> {
        self.send(FilterMessage::Reset)
    }

    fn send(&mut self, msg: FilterMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            tracing::warn!(?msg, "filter control queue full");
            Error::QueueFull("filter")
        })
    }
}

/// Audio-thread end: a [`TeeBeeFilter`] fed by a [`FilterHandle`].
pub struct SharedFilter {
    filter: TeeBeeFilter,
    rx: Consumer<FilterMessage>,
}

impl SharedFilter {
    pub fn new(filter: TeeBeeFilter) -> (Self, FilterHandle) {
        let (tx, rx) = RingBuffer::<FilterMessage>::new(CONTROL_QUEUE_SIZE);
        (Self { filter, rx }, FilterHandle { tx })
    }

    pub fn filter(&self) -> &TeeBeeFilter {
        &self.filter
    }

    /// Applies every pending message. Cutoff and resonance changes are
    /// staged, so the coefficients are recomputed once per batch.
    pub fn apply_pending(&mut self) {
        let mut staged = false;
        while let Ok(msg) = self.rx.pop() {
            match msg {
                FilterMessage::Cutoff(hz) => {
                    self.filter.stage_cutoff(hz);
                    staged = true;
                }
                FilterMessage::Resonance(percent) => {
                    self.filter.stage_resonance(percent);
                    staged = true;
                }
                FilterMessage::Drive(db) => self.filter.set_drive(db),
                FilterMessage::Mode(mode) => {
                    self.filter.set_mode(mode);
                    staged = false;
                }
                FilterMessage::FeedbackHighpass(hz) => self.filter.set_feedback_highpass_cutoff(hz),
                FilterMessage::Reset => self.filter.reset(),
            }
        }
        if staged {
            self.filter.update_coefficients();
        }
    }

    /// Filters `buffer` in place after applying pending messages.
    pub fn render(&mut self, buffer: &mut [f32]) {
        self.apply_pending();
        self.filter.render(buffer);
    }
}
