//! Persistent record log
//!
//! A fixed-capacity ring of records laid out contiguously on raw storage.
//! Empty slots hold a reserved sentinel record; the first sentinel found
//! scanning from the base address marks where writing resumes after a
//! power cycle.

pub mod circular;
pub mod confirm;

pub use circular::CircularStore;
pub use confirm::{Answer, ConfirmPolicy, MAX_TRIES, POLL_INTERVAL_MS};

use thermolog_hal::StorageError;

/// Lifecycle of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreState {
    /// Built, no I/O performed yet
    Constructed,
    /// Initialized; accepts writes
    Ready,
    /// Initialization failed; must not be used
    Failed(InitError),
}

/// What `init` found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitOutcome {
    /// No records were present
    Empty,
    /// Existing records were kept; writing resumes after them
    Kept {
        /// Records found before the first empty slot
        records: usize,
    },
    /// Existing records were wiped at the operator's request
    Cleared,
}

/// Errors from store initialization
///
/// Any of these leaves the store in [`StoreState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The region does not fit in the medium
    TooLarge,
    /// The region is empty or not a whole number of records
    Misaligned,
    /// The medium failed during the recovery scan or wipe
    Storage(StorageError),
}

impl From<StorageError> for InitError {
    fn from(e: StorageError) -> Self {
        InitError::Storage(e)
    }
}

/// Errors from writing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    /// `init` has not completed successfully
    NotReady,
    /// The record is byte-identical to the sentinel and would read back as empty
    Sentinel,
    /// The medium rejected the write; the cursor did not advance
    Storage(StorageError),
}

impl From<StorageError> for WriteError {
    fn from(e: StorageError) -> Self {
        WriteError::Storage(e)
    }
}

/// Decoded view of one record position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<T> {
    /// Holds the sentinel
    Empty,
    /// Holds a written record
    Occupied(T),
}

impl<T> Slot<T> {
    /// Check whether the slot holds a record
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    /// Get the record, if any
    pub fn value(self) -> Option<T> {
        match self {
            Slot::Occupied(v) => Some(v),
            Slot::Empty => None,
        }
    }
}
