//! Operator confirmation with a bounded wait
//!
//! Polls the console a fixed number of times, sleeping between polls, and
//! gives up with [`Answer::Timeout`] when nobody responds. Time and input
//! are injected so the wait can be exercised without real time passing.

use serde::{Deserialize, Serialize};
use thermolog_hal::{Console, DelayNs};

/// Times to poll for a response before assuming "no"
pub const MAX_TRIES: u8 = 5;

/// Wait between polls in milliseconds
pub const POLL_INTERVAL_MS: u32 = 1000;

/// Operator response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Answer {
    /// `y` or `Y`
    Yes,
    /// Any other input
    No,
    /// Nothing arrived within the polling budget
    Timeout,
}

impl Answer {
    /// Interpret a single input byte
    pub fn from_byte(byte: u8) -> Self {
        if byte.eq_ignore_ascii_case(&b'y') {
            Answer::Yes
        } else {
            Answer::No
        }
    }

    /// Only an explicit yes is affirmative
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }

    /// Character echoed back to the operator
    pub fn echo(self) -> char {
        match self {
            Answer::Yes => 'y',
            Answer::No | Answer::Timeout => 'n',
        }
    }
}

/// Polling budget for a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfirmPolicy {
    /// Maximum number of polls (0 answers immediately with a timeout)
    pub max_tries: u8,
    /// Wait between consecutive polls
    pub poll_interval_ms: u32,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            max_tries: MAX_TRIES,
            poll_interval_ms: POLL_INTERVAL_MS,
        }
    }
}

impl ConfirmPolicy {
    /// Longest time `await_answer` can block, in milliseconds
    pub fn max_wait_ms(&self) -> u32 {
        u32::from(self.max_tries.saturating_sub(1)).saturating_mul(self.poll_interval_ms)
    }
}

/// Wait for a yes/no answer on `console`
///
/// The first available byte decides the answer; everything else buffered
/// behind it is discarded so stale keystrokes cannot answer a later prompt.
pub fn await_answer<C, D>(console: &mut C, delay: &mut D, policy: &ConfirmPolicy) -> Answer
where
    C: Console + ?Sized,
    D: DelayNs + ?Sized,
{
    for attempt in 0..policy.max_tries {
        if attempt > 0 {
            delay.delay_ms(policy.poll_interval_ms);
        }

        if console.has_input() {
            let answer = console.read_byte().map_or(Answer::No, Answer::from_byte);
            console.drain_input();
            debug!("confirmation answered on poll {}", attempt + 1);
            return answer;
        }
    }

    Answer::Timeout
}
