//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [started] timer=3 label="delay" in=5000ms
//! [paused] timer=3 label="delay" remaining=4000ms reason="will_background"
//! [resumed] timer=3 label="delay" in=4000ms
//! [fired] timer=3 label="delay" fires=1
//! [retired] timer=3 label="delay" fires=1
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn timer(e: &Event) -> String {
    match (e.timer, e.label.as_deref()) {
        (Some(id), Some(label)) => format!("timer={id} label={label:?}"),
        (Some(id), None) => format!("timer={id}"),
        (None, _) => "timer=?".to_string(),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TimerStarted => {
                println!("[started] {} in={:?}ms", timer(e), e.delay_ms);
            }
            EventKind::TimerPaused => {
                println!(
                    "[paused] {} remaining={:?}ms reason={:?}",
                    timer(e),
                    e.delay_ms,
                    e.reason
                );
            }
            EventKind::TimerResumed => {
                println!("[resumed] {} in={:?}ms", timer(e), e.delay_ms);
            }
            EventKind::TimerFired => {
                println!("[fired] {} fires={:?}", timer(e), e.fires);
            }
            EventKind::TimerRetired => {
                println!("[retired] {} fires={:?}", timer(e), e.fires);
            }
            EventKind::TimerInvalidated => {
                println!("[invalidated] {} reason={:?}", timer(e), e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.label, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.label.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
