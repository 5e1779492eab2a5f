// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Termination watchdog.
//!
//! A single-shot timer that forces the current stream to end when frames stop
//! arriving after end of input was signaled. The timer runs on its own thread
//! but never touches relay state: when it expires it posts
//! [`Command::WatchdogExpired`] back onto the relay's command queue, tagged
//! with the generation it was armed with.
//!
//! Every restart or cancellation bumps or clears the armed generation on the
//! owning thread, so an expiry that was already in flight when the timer was
//! replaced is recognized as stale and ignored.

use std::{
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, trace};

use crate::{Result, relay::command::Command};

/// Control messages for the timer thread.
enum TimerControl {
    /// Replaces any pending deadline.
    Arm { generation: u64, deadline: Instant },
    /// Drops the pending deadline, if any.
    Cancel,
    /// Stops the timer thread.
    Shutdown,
}

/// Handle to the timer thread.
struct TimerThread {
    tx: Sender<TimerControl>,
    join: Option<JoinHandle<()>>,
}

/// Owning-thread side of the termination watchdog.
pub(crate) struct Watchdog {
    timeout: Duration,
    next_generation: u64,
    armed: Option<u64>,
    timer: Option<TimerThread>,
}

impl Watchdog {
    /// Starts the timer thread. Expiries are delivered through `expired_tx`.
    pub(crate) fn spawn(
        timeout: Duration,
        thread_name: String,
        expired_tx: Sender<Command>,
    ) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let join = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || timer_main(rx, expired_tx))?;
        Ok(Self {
            timeout,
            next_generation: 0,
            armed: None,
            timer: Some(TimerThread {
                tx,
                join: Some(join),
            }),
        })
    }

    /// A watchdog without a timer thread. Arming only records the generation;
    /// tests deliver expiries by hand.
    #[cfg(test)]
    pub(crate) fn detached(timeout: Duration) -> Self {
        Self {
            timeout,
            next_generation: 0,
            armed: None,
            timer: None,
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    #[cfg(test)]
    pub(crate) fn armed_generation(&self) -> Option<u64> {
        self.armed
    }

    /// Cancels any pending deadline and arms a new one `timeout` from now.
    pub(crate) fn restart(&mut self) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.armed = Some(generation);
        debug!(
            generation,
            timeout_ms = self.timeout.as_millis() as u64,
            "Watchdog armed"
        );
        if let Some(timer) = &self.timer {
            let deadline = Instant::now() + self.timeout;
            // A closed timer channel means shutdown already ran.
            let _ = timer.tx.send(TimerControl::Arm {
                generation,
                deadline,
            });
        }
        generation
    }

    /// Disarms the watchdog. Returns `true` if a deadline was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        let Some(generation) = self.armed.take() else {
            return false;
        };
        debug!(generation, "Watchdog cancelled");
        if let Some(timer) = &self.timer {
            let _ = timer.tx.send(TimerControl::Cancel);
        }
        true
    }

    /// Consumes an expiry. Returns `true` only if `generation` is the one
    /// currently armed, in which case the watchdog is disarmed.
    pub(crate) fn take_expired(&mut self, generation: u64) -> bool {
        if self.armed == Some(generation) {
            self.armed = None;
            true
        } else {
            trace!(generation, armed = ?self.armed, "Ignoring stale watchdog expiry");
            false
        }
    }

    /// Stops the timer thread and waits for it to exit. Idempotent.
    pub(crate) fn shutdown(&mut self) {
        self.armed = None;
        let Some(mut timer) = self.timer.take() else {
            return;
        };
        let _ = timer.tx.send(TimerControl::Shutdown);
        if let Some(join) = timer.join.take()
            && join.join().is_err()
        {
            error!("Watchdog timer thread panicked");
        }
        debug!("Watchdog timer stopped");
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn timer_main(rx: Receiver<TimerControl>, expired_tx: Sender<Command>) {
    let mut pending: Option<(u64, Instant)> = None;

    loop {
        let deadline_rx = match pending {
            Some((_, deadline)) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        crossbeam_channel::select_biased! {
            recv(rx) -> msg => {
                match msg {
                    Ok(TimerControl::Arm { generation, deadline }) => {
                        pending = Some((generation, deadline));
                    }
                    Ok(TimerControl::Cancel) => pending = None,
                    Ok(TimerControl::Shutdown) | Err(_) => break,
                }
            }
            recv(deadline_rx) -> _ => {
                if let Some((generation, _)) = pending.take()
                    && expired_tx.send(Command::WatchdogExpired { generation }).is_err()
                {
                    break;
                }
            }
        }
    }
}
