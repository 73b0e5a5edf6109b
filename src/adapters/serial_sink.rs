//! Serial log protocol sink.
//!
//! Writes the line-oriented diagnostic protocol read by bench tools and the
//! regression harness. Every line ends in CRLF.
//!
//! ```text
//! 2021-01-15 01:48:25
//! CO2 bubbler turned on after 1000 ms
//! Set pH target changed from 1234 to 1235
//! ```
//!
//! Events outside the protocol are ignored here; pair this sink with
//! [`LogEventSink`](super::log_sink::LogEventSink) to see them.

use core::fmt::Write;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct SerialEventSink<W: Write> {
    out: W,
}

impl<W: Write> SerialEventSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &AppEvent) -> core::fmt::Result {
        match event {
            AppEvent::SolenoidChanged { on, elapsed_ms, at } => {
                write!(self.out, "{}\r\n", at.format("%Y-%m-%d %H:%M:%S"))?;
                write!(
                    self.out,
                    "CO2 bubbler turned {} after {} ms\r\n",
                    if *on { "on" } else { "off" },
                    elapsed_ms
                )
            }
            AppEvent::LabelDrift {
                label,
                old_sum,
                new_sum,
            } => write!(
                self.out,
                "{} changed from {} to {}\r\n",
                label, old_sum, new_sum
            ),
            _ => Ok(()),
        }
    }
}

impl<W: Write> EventSink for SerialEventSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        if self.write_event(event).is_err() {
            warn!("Serial log: write failed");
        }
    }
}

/// Forwards every event to two sinks.
pub struct TeeSink<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: EventSink, B: EventSink> EventSink for TeeSink<A, B> {
    fn emit(&mut self, event: &AppEvent) {
        self.first.emit(event);
        self.second.emit(event);
    }
}
