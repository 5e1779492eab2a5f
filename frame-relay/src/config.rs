// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration for a [`crate::FrameRelay`].
//!
//! The watchdog timeout is the only setting that changes relay behavior. A
//! longer timeout tolerates slow producers at the cost of detecting a truly
//! ended stream later. The remaining settings only affect naming in thread
//! lists and log output.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default watchdog timeout for hardware decoders, in milliseconds.
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u64 = 500;

/// Default watchdog timeout for emulated or software decoders, in milliseconds.
///
/// Emulated decoders are much slower and may be back-pressured by slow GPU
/// work, so they get a far longer grace period before a stream is forced to end.
pub const DEFAULT_EMULATOR_WATCHDOG_TIMEOUT_MS: u64 = 10_000;

/// Default prefix for the names of the threads a relay spawns.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "frame-relay";

/// Settings for one relay instance.
///
/// Deserializes with every field optional, so a configuration file only needs
/// to name the values it overrides:
///
/// ```
/// use frame_relay::config::RelayConfig;
///
/// let config: RelayConfig = serde_json::from_str(r#"{"watchdog_timeout_ms": 2000}"#).unwrap();
/// assert_eq!(config.watchdog_timeout().as_millis(), 2000);
/// assert_eq!(config.thread_name_prefix, "frame-relay");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Identifier attached to thread names and log spans.
    pub id: Uuid,

    /// Time after end-of-input without any new arrival before the stream is
    /// forcibly ended.
    pub watchdog_timeout_ms: u64,

    /// Watchdog timeout used by [`RelayConfig::for_emulator`].
    pub emulator_watchdog_timeout_ms: u64,

    /// Prefix for the owning thread and watchdog thread names.
    pub thread_name_prefix: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            id: Uuid::new_v4(),
            watchdog_timeout_ms: DEFAULT_WATCHDOG_TIMEOUT_MS,
            emulator_watchdog_timeout_ms: DEFAULT_EMULATOR_WATCHDOG_TIMEOUT_MS,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_owned(),
        }
    }
}

impl RelayConfig {
    /// Returns a default configuration using the longer emulator timeout.
    pub fn for_emulator() -> Self {
        let config = RelayConfig::default();
        RelayConfig {
            watchdog_timeout_ms: config.emulator_watchdog_timeout_ms,
            ..config
        }
    }

    /// Returns a copy of this configuration with a different watchdog timeout.
    pub fn with_watchdog_timeout(mut self, timeout: Duration) -> Self {
        self.watchdog_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// The watchdog timeout as a [`Duration`].
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    /// Name of the owning thread that applies every state transition.
    pub(crate) fn relay_thread_name(&self) -> String {
        format!("{}-{}", self.thread_name_prefix, self.short_id())
    }

    /// Name of the timer thread backing the termination watchdog.
    pub(crate) fn watchdog_thread_name(&self) -> String {
        format!("{}-watchdog-{}", self.thread_name_prefix, self.short_id())
    }

    // Eight hex digits are enough to tell relays apart in a thread list.
    fn short_id(&self) -> String {
        let simple = self.id.simple().to_string();
        simple[..8].to_owned()
    }
}
