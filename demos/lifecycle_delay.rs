//! # Example: lifecycle_delay
//!
//! Demonstrates a [`Delay`] that stops counting while the host is in the background,
//! next to a repeating [`PausableTimer`] that is paused and resumed by hand.
//!
//! Shows how to:
//! - Attach the built-in [`LogWriter`] to a [`Scheduler`].
//! - Drive everything from synchronous code with an [`EventLoop`].
//! - Feed foreground/background transitions through a [`LifecycleBus`].
//!
//! ## Flow
//! ```text
//! t=0s    Delay(3s) starts, heartbeat(1s) starts
//! t=1s    will_background  ──► delay paused (2s left), heartbeat keeps ticking
//! t=2s    heartbeat.pause()
//! t=4s    did_foreground   ──► delay resumed
//!         heartbeat.resume()
//! t=6s    delay fires (3s of foreground time)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example lifecycle_delay --features logging
//! ```

use std::{rc::Rc, sync::Arc, time::Duration};

use pausable_timer::{
    Config, Delay, EventLoop, LifecycleBus, LogWriter, PausableTimer, RuntimeError, Scheduler,
    Subscribe,
};
use tokio::time::sleep;

fn main() -> Result<(), RuntimeError> {
    let cfg = Config::default();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let scheduler = Scheduler::builder(cfg.clone()).with_subscribers(subs).build();
    let event_loop = EventLoop::new(scheduler)?;
    let lifecycle = LifecycleBus::from_config(&cfg);

    let delay = Delay::new(
        event_loop.scheduler(),
        Rc::new(lifecycle.clone()),
        Duration::from_secs(3),
        || println!(">> delay elapsed"),
    );

    let heartbeat = PausableTimer::labeled(
        event_loop.scheduler(),
        "heartbeat",
        Duration::from_secs(1),
        true,
        |t| println!(">> heartbeat #{}", t.fire_count()),
    );
    heartbeat.start();

    event_loop.block_on(async {
        sleep(Duration::from_secs(1)).await;
        println!("-- app goes to background");
        lifecycle.will_background();

        sleep(Duration::from_secs(1)).await;
        heartbeat.pause();

        sleep(Duration::from_secs(2)).await;
        println!("-- app back in foreground");
        lifecycle.did_foreground();
        heartbeat.resume();

        sleep(Duration::from_millis(2500)).await;
    });

    println!("delay valid: {}", delay.is_valid());
    heartbeat.invalidate();
    // Give subscriber workers a moment to flush.
    event_loop.run_for(Duration::from_millis(50));
    Ok(())
}
