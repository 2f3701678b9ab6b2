//! Circular record store
//!
//! Records of type `T` are written back to back from `base_address`,
//! wrapping to the start and overwriting the oldest record once the region
//! is full. Nothing but the records themselves is persisted: after a power
//! cycle the write cursor is recovered by scanning for the first sentinel.
//!
//! # Layout
//!
//! ```text
//! base_address                                  base_address + capacity_bytes
//! │                                                                         │
//! ▼                                                                         ▼
//! ┌────────┬────────┬────────┬──────────┬──────────┬───────────────────────┐
//! │ rec 0  │ rec 1  │ rec 2  │ sentinel │ sentinel │ ...                   │
//! └────────┴────────┴────────┴──────────┴──────────┴───────────────────────┘
//!                              ▲
//!                              └── cursor (next write)
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──init──► Ready   (empty, kept, or cleared)
//!      │
//!      └───────init──► Failed  (too large, misaligned, medium error)
//! ```

use thermolog_hal::{Console, DelayNs, RawStorage, StorageError};

use super::confirm::{self, ConfirmPolicy};
use super::{InitError, InitOutcome, Slot, StoreState, WriteError};
use crate::record::Record;

/// Records cleared per progress dot
const RECORDS_PER_DOT: usize = 8;

/// Fixed-capacity ring of records on raw storage
///
/// The store owns its medium exclusively. Use [`CircularStore::release`]
/// to get it back, e.g. to simulate a power cycle.
pub struct CircularStore<T: Record, S: RawStorage> {
    storage: S,
    /// First byte owned by this store
    base_address: usize,
    /// Bytes reserved for records
    capacity_bytes: usize,
    /// Address of the next write
    cursor: usize,
    /// Value marking a never-written slot
    sentinel: T,
    /// Every slot holds a record
    full: bool,
    state: StoreState,
    policy: ConfirmPolicy,
}

impl<T: Record, S: RawStorage> CircularStore<T, S> {
    /// Create a store for `record_count` records starting at address 0
    ///
    /// Performs no I/O and cannot fail; the size is checked by
    /// [`CircularStore::init`].
    pub fn new(storage: S, record_count: usize, sentinel: T) -> Self {
        Self::with_region(storage, 0, record_count.saturating_mul(T::SIZE), sentinel)
    }

    /// Create a store over an explicit byte region
    ///
    /// `capacity_bytes` must be a whole number of records or `init` fails
    /// with [`InitError::Misaligned`].
    pub fn with_region(storage: S, base_address: usize, capacity_bytes: usize, sentinel: T) -> Self {
        Self {
            storage,
            base_address,
            capacity_bytes,
            cursor: base_address,
            sentinel,
            full: false,
            state: StoreState::Constructed,
            policy: ConfirmPolicy::default(),
        }
    }

    /// Move the region to start at `base_address`
    ///
    /// A `Ready` store goes back to `Constructed` and must be initialized
    /// again over the new region. A `Failed` store stays failed.
    pub fn with_base_address(mut self, base_address: usize) -> Self {
        self.base_address = base_address;
        self.cursor = base_address;
        self.full = false;
        if self.state == StoreState::Ready {
            self.state = StoreState::Constructed;
        }
        self
    }

    /// Override the polling budget of the clear prompt
    ///
    /// Only affects a later `init`.
    pub fn with_policy(mut self, policy: ConfirmPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Address of the next write
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the next write, counted in records from the base address
    pub fn cursor_index(&self) -> usize {
        (self.cursor - self.base_address) / T::SIZE
    }

    pub fn base_address(&self) -> usize {
        self.base_address
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Number of record slots
    pub fn record_count(&self) -> usize {
        self.capacity_bytes / T::SIZE
    }

    pub fn sentinel(&self) -> T {
        self.sentinel
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn policy(&self) -> &ConfirmPolicy {
        &self.policy
    }

    /// Check whether every slot holds a record
    ///
    /// Becomes true when the recovery scan finds no empty slot or when
    /// writing wraps around; a clear resets it.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Borrow the medium
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store and return the medium
    pub fn release(self) -> S {
        self.storage
    }

    /// One past the last byte owned by this store
    fn end(&self) -> usize {
        self.base_address.saturating_add(self.capacity_bytes)
    }

    /// Check the region against the medium
    fn validate(&self) -> Result<(), InitError> {
        let end = self
            .base_address
            .checked_add(self.capacity_bytes)
            .ok_or(InitError::TooLarge)?;
        if end > self.storage.capacity() {
            return Err(InitError::TooLarge);
        }
        if T::SIZE == 0 || self.capacity_bytes == 0 || self.capacity_bytes % T::SIZE != 0 {
            return Err(InitError::Misaligned);
        }
        Ok(())
    }

    fn read_bytes(&mut self, address: usize) -> Result<T::Bytes, StorageError> {
        let mut bytes = T::Bytes::default();
        self.storage.read(address, bytes.as_mut())?;
        Ok(bytes)
    }

    /// Recover the cursor and offer to wipe existing records
    ///
    /// Existing records are echoed to `console` as they are scanned. If any
    /// are found the operator is asked whether to clear them; silence
    /// within the polling budget keeps them. Fails with
    /// [`InitError::TooLarge`] before touching the medium if the region
    /// does not fit, after which the store stays [`StoreState::Failed`].
    pub fn init<C, D>(&mut self, console: &mut C, delay: &mut D) -> Result<InitOutcome, InitError>
    where
        C: Console + ?Sized,
        D: DelayNs + ?Sized,
    {
        if let StoreState::Failed(e) = self.state {
            return Err(e);
        }

        let result = self
            .validate()
            .and_then(|()| self.recover_and_confirm(console, delay));

        match result {
            Ok(outcome) => {
                self.state = StoreState::Ready;
                info!(
                    "storage ready: {} of {} records, cursor at {}",
                    self.cursor_index(),
                    self.record_count(),
                    self.cursor
                );
                Ok(outcome)
            }
            Err(e) => {
                self.state = StoreState::Failed(e);
                warn!("storage init failed: {}", e);
                Err(e)
            }
        }
    }

    fn recover_and_confirm<C, D>(&mut self, console: &mut C, delay: &mut D) -> Result<InitOutcome, InitError>
    where
        C: Console + ?Sized,
        D: DelayNs + ?Sized,
    {
        self.cursor = self.scan(console)?;
        self.full = self.cursor == self.end();

        // Only offer chance to clear if data was found
        if self.cursor == self.base_address {
            let _ = console.write_str("No data found\n");
            return Ok(InitOutcome::Empty);
        }

        let records = self.cursor_index();
        let _ = console.write_str("Clear storage? [y/n] ");
        let answer = confirm::await_answer(console, delay, &self.policy);
        let _ = writeln!(console, "{}", answer.echo());

        if !answer.is_yes() {
            debug!("keeping {} records", records);
            return Ok(InitOutcome::Kept { records });
        }

        let _ = console.write_str("\nClearing storage");
        self.wipe_with(|index| {
            if index % RECORDS_PER_DOT == 0 {
                let _ = console.write_str(".");
            }
        })?;
        let _ = console.write_str("\nStorage cleared\n");

        Ok(InitOutcome::Cleared)
    }

    /// Find the first sentinel, echoing every record before it
    fn scan<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<usize, StorageError> {
        let sentinel = self.sentinel.to_bytes();
        let end = self.end();
        let mut address = self.base_address;

        let _ = console.write_str("Checking storage data\n");
        while address < end {
            let bytes = self.read_bytes(address)?;
            if bytes == sentinel {
                break;
            }
            let _ = write!(console, "{:.4},", T::from_bytes(&bytes));
            address += T::SIZE;
        }
        let _ = console.write_str("\n");

        Ok(address)
    }

    /// Append a record, overwriting the oldest once full
    ///
    /// The cursor only advances after the medium accepted the write.
    pub fn write(&mut self, data: &T) -> Result<(), WriteError> {
        if self.state != StoreState::Ready {
            return Err(WriteError::NotReady);
        }

        let bytes = data.to_bytes();
        if bytes == self.sentinel.to_bytes() {
            return Err(WriteError::Sentinel);
        }

        // A recovered full log leaves the cursor on the upper bound
        if self.cursor >= self.end() {
            self.cursor = self.base_address;
        }

        self.storage.write(self.cursor, bytes.as_ref())?;

        self.cursor += T::SIZE;
        if self.cursor >= self.end() {
            self.cursor = self.base_address;
            self.full = true;
        }

        Ok(())
    }

    /// Overwrite every slot with the sentinel and rewind the cursor
    ///
    /// Idempotent. Fails with [`StorageError::OutOfBounds`] if the region
    /// does not fit the medium, or if the store has failed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        if matches!(self.state, StoreState::Failed(_)) || self.validate().is_err() {
            return Err(StorageError::OutOfBounds);
        }
        self.wipe_with(|_| {})
    }

    /// Write the sentinel to every slot, reporting each index as it goes
    fn wipe_with<F: FnMut(usize)>(&mut self, mut on_record: F) -> Result<(), StorageError> {
        let sentinel = self.sentinel.to_bytes();

        for index in 0..self.record_count() {
            let address = self.base_address + index * T::SIZE;
            self.storage.write(address, sentinel.as_ref())?;
            on_record(index);
        }

        self.cursor = self.base_address;
        self.full = false;
        info!("storage cleared: {} records", self.record_count());
        Ok(())
    }

    /// Read the slot at `index`
    pub fn slot(&mut self, index: usize) -> Result<Slot<T>, StorageError> {
        if index >= self.record_count() {
            return Err(StorageError::OutOfBounds);
        }

        let bytes = self.read_bytes(self.base_address + index * T::SIZE)?;
        if bytes == self.sentinel.to_bytes() {
            Ok(Slot::Empty)
        } else {
            Ok(Slot::Occupied(T::from_bytes(&bytes)))
        }
    }

    /// Visit stored records from oldest to newest
    ///
    /// Record age is not persisted. On a full log recovered after a power
    /// cycle the records from before the power cycle are visited in slot
    /// order, followed by any written since, newest last. Returns the
    /// number of records visited.
    pub fn for_each_record<F: FnMut(T)>(&mut self, mut f: F) -> Result<usize, StorageError> {
        let count = self.record_count();
        let (start, len) = if self.full {
            // Right after recovery the cursor rests on the upper bound
            (self.cursor_index() % count.max(1), count)
        } else {
            (0, self.cursor_index())
        };

        let mut visited = 0;
        for offset in 0..len {
            if let Slot::Occupied(value) = self.slot((start + offset) % count)? {
                f(value);
                visited += 1;
            }
        }

        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermolog_hal::{BufferedConsole, RamStorage};

    type TestConsole = BufferedConsole<16, 512>;

    /// Delay that returns immediately
    #[derive(Default)]
    struct NoDelay {
        calls: usize,
    }

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {
            self.calls += 1;
        }
    }

    /// Four `f32` records on a zeroed medium with sentinel 0.0
    fn store_of_four() -> CircularStore<f32, RamStorage<16>> {
        CircularStore::new(RamStorage::filled(0), 4, 0.0)
    }

    fn ready(store: &mut CircularStore<f32, RamStorage<16>>) {
        let outcome = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert!(outcome.is_ok());
    }

    fn contents(store: &mut CircularStore<f32, RamStorage<16>>) -> [Slot<f32>; 4] {
        [
            store.slot(0).unwrap(),
            store.slot(1).unwrap(),
            store.slot(2).unwrap(),
            store.slot(3).unwrap(),
        ]
    }

    /// Simulate a power cycle: rebuild the store over the same medium
    fn power_cycle(store: CircularStore<f32, RamStorage<16>>) -> CircularStore<f32, RamStorage<16>> {
        CircularStore::new(store.release(), 4, 0.0)
    }

    #[test]
    fn test_new_performs_no_io() {
        let store = store_of_four();
        assert_eq!(store.state(), StoreState::Constructed);
        assert_eq!(store.capacity_bytes(), 16);
        assert_eq!(store.record_count(), 4);
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_exact_fit_succeeds() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<16>::filled(0), 4, 0.0);
        ready(&mut store);
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[test]
    fn test_one_byte_over_is_too_large() {
        let mut store: CircularStore<f32, _> =
            CircularStore::with_region(RamStorage::<16>::filled(0), 0, 17, 0.0);
        let mut console = TestConsole::new();

        let result = store.init(&mut console, &mut NoDelay::default());
        assert_eq!(result, Err(InitError::TooLarge));
        assert_eq!(store.state(), StoreState::Failed(InitError::TooLarge));
        // No scan, no prompt
        assert_eq!(console.output(), "");
    }

    #[test]
    fn test_record_count_too_large() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<16>::filled(0), 5, 0.0);
        let result = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert_eq!(result, Err(InitError::TooLarge));
    }

    #[test]
    fn test_base_address_counts_against_capacity() {
        let mut store: CircularStore<f32, _> =
            CircularStore::new(RamStorage::<16>::filled(0), 4, 0.0).with_base_address(4);
        let result = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert_eq!(result, Err(InitError::TooLarge));
    }

    #[test]
    fn test_misaligned_region() {
        let mut store: CircularStore<f32, _> =
            CircularStore::with_region(RamStorage::<16>::filled(0), 0, 10, 0.0);
        let result = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert_eq!(result, Err(InitError::Misaligned));
    }

    #[test]
    fn test_zero_records() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<16>::filled(0), 0, 0.0);
        let result = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert_eq!(result, Err(InitError::Misaligned));
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<16>::filled(0), 5, 0.0);
        assert!(store.init(&mut TestConsole::new(), &mut NoDelay::default()).is_err());

        assert_eq!(
            store.init(&mut TestConsole::new(), &mut NoDelay::default()),
            Err(InitError::TooLarge)
        );
        assert_eq!(store.write(&1.0), Err(WriteError::NotReady));
        assert_eq!(store.clear(), Err(StorageError::OutOfBounds));
    }

    #[test]
    fn test_write_before_init() {
        let mut store = store_of_four();
        assert_eq!(store.write(&1.0), Err(WriteError::NotReady));
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_empty_medium_skips_prompt() {
        let mut store = store_of_four();
        let mut console = TestConsole::new();
        console.push_input("y");
        let mut delay = NoDelay::default();

        assert_eq!(store.init(&mut console, &mut delay), Ok(InitOutcome::Empty));
        assert_eq!(store.cursor(), 0);
        assert_eq!(console.output(), "Checking storage data\n\nNo data found\n");
        // The pending answer was never consumed
        assert_eq!(console.pending_input(), 1);
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn test_recovers_cursor_after_power_cycle() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&21.5).unwrap();
        store.write(&22.25).unwrap();

        let mut store = power_cycle(store);
        let mut console = TestConsole::new();
        let outcome = store.init(&mut console, &mut NoDelay::default());

        assert_eq!(outcome, Ok(InitOutcome::Kept { records: 2 }));
        assert_eq!(store.cursor(), 8);
        assert_eq!(store.cursor_index(), 2);
        assert!(!store.is_full());
    }

    #[test]
    fn test_transcript_on_decline() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&21.5).unwrap();
        store.write(&-3.0).unwrap();

        let mut store = power_cycle(store);
        let mut console = TestConsole::new();
        console.push_input("n\r\n");
        store.init(&mut console, &mut NoDelay::default()).unwrap();

        assert_eq!(
            console.output(),
            "Checking storage data\n21.5000,-3.0000,\nClear storage? [y/n] n\n"
        );
        assert_eq!(console.pending_input(), 0);
    }

    #[test]
    fn test_decline_leaves_data_untouched() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();
        store.write(&2.0).unwrap();

        let before: [u8; 16] = store.storage().as_bytes().try_into().unwrap();
        let writes = store.storage().write_count();

        let mut store = power_cycle(store);
        let mut console = TestConsole::new();
        console.push_input("N");
        store.init(&mut console, &mut NoDelay::default()).unwrap();

        assert_eq!(store.storage().as_bytes(), &before);
        assert_eq!(store.storage().write_count(), writes);
        assert_eq!(store.cursor_index(), 2);
    }

    #[test]
    fn test_timeout_keeps_data() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();

        let mut store = power_cycle(store);
        let mut console = TestConsole::new();
        let mut delay = NoDelay::default();

        let outcome = store.init(&mut console, &mut delay);
        assert_eq!(outcome, Ok(InitOutcome::Kept { records: 1 }));
        assert_eq!(store.cursor_index(), 1);
        assert_eq!(delay.calls, usize::from(confirm::MAX_TRIES) - 1);
        assert!(console.output().ends_with("Clear storage? [y/n] n\n"));
    }

    #[test]
    fn test_confirm_clears() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();
        store.write(&2.0).unwrap();
        store.write(&3.0).unwrap();

        let mut store = power_cycle(store);
        let mut console = TestConsole::new();
        console.push_input("Yes please");

        let outcome = store.init(&mut console, &mut NoDelay::default());
        assert_eq!(outcome, Ok(InitOutcome::Cleared));
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.state(), StoreState::Ready);
        assert!(store.storage().as_bytes().iter().all(|&b| b == 0));
        assert!(console
            .output()
            .ends_with("Clear storage? [y/n] y\n\nClearing storage.\nStorage cleared\n"));
        assert_eq!(console.pending_input(), 0);
    }

    #[test]
    fn test_clear_progress_dots() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<80>::new(), 20, 0.0);
        let mut console = BufferedConsole::<4, 1024>::new();
        console.push_input("y");

        // An erased EEPROM reads back as NaN records, not sentinels
        let outcome = store.init(&mut console, &mut NoDelay::default());
        assert_eq!(outcome, Ok(InitOutcome::Cleared));
        assert!(console.output().contains("NaN,"));
        // Records 0, 8 and 16
        assert!(console.output().contains("Clearing storage...\nStorage cleared"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();
        store.write(&2.0).unwrap();

        store.clear().unwrap();
        let once: [u8; 16] = store.storage().as_bytes().try_into().unwrap();
        let cursor_once = store.cursor();

        store.clear().unwrap();
        assert_eq!(store.storage().as_bytes(), &once);
        assert_eq!(store.cursor(), cursor_once);
        assert_eq!(cursor_once, 0);
        assert_eq!(contents(&mut store), [Slot::Empty; 4]);
    }

    #[test]
    fn test_sentinel_write_rejected() {
        let mut store = store_of_four();
        ready(&mut store);

        assert_eq!(store.write(&0.0), Err(WriteError::Sentinel));
        assert_eq!(store.cursor(), 0);
        // Negative zero is a distinct record
        assert_eq!(store.write(&-0.0), Ok(()));
        assert_eq!(store.cursor_index(), 1);
    }

    #[test]
    fn test_failed_write_does_not_advance() {
        let mut ram = RamStorage::<16>::filled(0);
        ram.set_write_protect(true);
        let mut store: CircularStore<f32, _> = CircularStore::new(ram, 4, 0.0);
        ready(&mut store);

        assert_eq!(
            store.write(&1.0),
            Err(WriteError::Storage(StorageError::Device))
        );
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn test_wrap_overwrites_oldest() {
        let mut store = store_of_four();
        ready(&mut store);
        for value in 1..=6 {
            store.write(&(value as f32)).unwrap();
        }

        assert!(store.is_full());
        assert_eq!(store.cursor_index(), 2);
        assert_eq!(
            contents(&mut store),
            [
                Slot::Occupied(5.0),
                Slot::Occupied(6.0),
                Slot::Occupied(3.0),
                Slot::Occupied(4.0)
            ]
        );

        // No sentinel left: recovery lands on the upper bound
        let mut store = power_cycle(store);
        let outcome = store.init(&mut TestConsole::new(), &mut NoDelay::default());
        assert_eq!(outcome, Ok(InitOutcome::Kept { records: 4 }));
        assert_eq!(store.cursor(), 16);
        assert!(store.is_full());

        // Next write wraps to the base address first
        store.write(&7.0).unwrap();
        assert_eq!(store.slot(0).unwrap(), Slot::Occupied(7.0));
        assert_eq!(store.cursor_index(), 1);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();
        store.write(&2.0).unwrap();

        let mut store = power_cycle(store);
        store.init(&mut TestConsole::new(), &mut NoDelay::default()).unwrap();
        assert_eq!(store.cursor_index(), 2);

        store.write(&3.0).unwrap();
        store.write(&4.0).unwrap();
        store.write(&5.0).unwrap();

        assert_eq!(
            contents(&mut store),
            [
                Slot::Occupied(5.0),
                Slot::Occupied(2.0),
                Slot::Occupied(3.0),
                Slot::Occupied(4.0)
            ]
        );
        assert_eq!(store.cursor_index(), 1);
    }

    #[test]
    fn test_region_at_offset() {
        let mut store: CircularStore<u16, _> =
            CircularStore::new(RamStorage::<16>::filled(0), 4, 0u16).with_base_address(8);
        store.init(&mut TestConsole::new(), &mut NoDelay::default()).unwrap();
        assert_eq!(store.cursor(), 8);

        for value in [10u16, 20, 30, 40, 50] {
            store.write(&value).unwrap();
        }

        let bytes = store.storage().as_bytes();
        // Nothing below the base address is touched
        assert!(bytes[..8].iter().all(|&b| b == 0));
        assert_eq!(&bytes[8..], &[50, 0, 20, 0, 30, 0, 40, 0]);
        assert_eq!(store.cursor(), 10);
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut store = store_of_four();
        assert_eq!(store.slot(4), Err(StorageError::OutOfBounds));
    }

    #[test]
    fn test_for_each_record_oldest_first() {
        let mut store = store_of_four();
        ready(&mut store);

        let mut seen = heapless::Vec::<f32, 8>::new();
        store.write(&1.0).unwrap();
        store.write(&2.0).unwrap();
        let n = store.for_each_record(|v| seen.push(v).unwrap()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen.as_slice(), &[1.0, 2.0]);

        for value in [3.0, 4.0, 5.0] {
            store.write(&value).unwrap();
        }
        seen.clear();
        store.for_each_record(|v| seen.push(v).unwrap()).unwrap();
        assert_eq!(seen.as_slice(), &[2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_for_each_record_after_recovering_full_log() {
        let mut store = store_of_four();
        ready(&mut store);
        for value in 1..=6 {
            store.write(&(value as f32)).unwrap();
        }

        let mut store = power_cycle(store);
        store.init(&mut TestConsole::new(), &mut NoDelay::default()).unwrap();

        // Ages are lost: slot order
        let mut seen = heapless::Vec::<f32, 8>::new();
        let n = store.for_each_record(|v| seen.push(v).unwrap()).unwrap();
        assert_eq!(n, 4);
        assert_eq!(seen.as_slice(), &[5.0, 6.0, 3.0, 4.0]);

        // New records come after the recovered ones
        store.write(&7.0).unwrap();
        seen.clear();
        store.for_each_record(|v| seen.push(v).unwrap()).unwrap();
        assert_eq!(seen.as_slice(), &[6.0, 3.0, 4.0, 7.0]);
    }

    /// Medium that fails reads or writes at and above a given address
    struct FaultyStorage {
        ram: RamStorage<16>,
        fail_reads_from: usize,
        fail_writes_from: usize,
    }

    impl FaultyStorage {
        fn new(ram: RamStorage<16>) -> Self {
            Self {
                ram,
                fail_reads_from: usize::MAX,
                fail_writes_from: usize::MAX,
            }
        }
    }

    impl RawStorage for FaultyStorage {
        fn capacity(&self) -> usize {
            RawStorage::capacity(&self.ram)
        }

        fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
            if address >= self.fail_reads_from {
                return Err(StorageError::Device);
            }
            RawStorage::read(&mut self.ram, address, buf)
        }

        fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
            if address >= self.fail_writes_from {
                return Err(StorageError::Device);
            }
            RawStorage::write(&mut self.ram, address, data)
        }
    }

    /// Four records 1.0..=4.0 on a zeroed medium
    fn full_medium() -> RamStorage<16> {
        let mut store = store_of_four();
        ready(&mut store);
        for value in 1..=4 {
            store.write(&(value as f32)).unwrap();
        }
        store.release()
    }

    #[test]
    fn test_read_error_during_scan_fails_init() {
        let mut medium = FaultyStorage::new(full_medium());
        medium.fail_reads_from = 8;
        let mut store: CircularStore<f32, _> = CircularStore::new(medium, 4, 0.0);
        let mut console = TestConsole::new();

        let result = store.init(&mut console, &mut NoDelay::default());
        assert_eq!(result, Err(InitError::Storage(StorageError::Device)));
        assert_eq!(
            store.state(),
            StoreState::Failed(InitError::Storage(StorageError::Device))
        );
        // Records before the bad address were echoed, no prompt was shown
        assert_eq!(console.output(), "Checking storage data\n1.0000,2.0000,");
        assert_eq!(store.write(&9.0), Err(WriteError::NotReady));
    }

    #[test]
    fn test_write_error_during_wipe_fails_init() {
        let mut medium = FaultyStorage::new(full_medium());
        medium.fail_writes_from = 8;
        let mut store: CircularStore<f32, _> = CircularStore::new(medium, 4, 0.0);
        let mut console = TestConsole::new();
        console.push_input("y");

        let result = store.init(&mut console, &mut NoDelay::default());
        assert_eq!(result, Err(InitError::Storage(StorageError::Device)));
        assert!(matches!(store.state(), StoreState::Failed(_)));
        assert_eq!(store.write(&9.0), Err(WriteError::NotReady));

        // Slots before the failure were wiped, the rest kept their records
        assert_eq!(store.slot(0), Ok(Slot::Empty));
        assert_eq!(store.slot(1), Ok(Slot::Empty));
        assert_eq!(store.slot(2), Ok(Slot::Occupied(3.0)));
        assert_eq!(store.slot(3), Ok(Slot::Occupied(4.0)));
    }

    #[test]
    fn test_moving_ready_store_requires_init() {
        let mut store = store_of_four();
        ready(&mut store);
        store.write(&1.0).unwrap();

        let mut store = store.with_base_address(0);
        assert_eq!(store.state(), StoreState::Constructed);
        assert_eq!(store.write(&2.0), Err(WriteError::NotReady));

        ready(&mut store);
        assert_eq!(store.cursor_index(), 1);
    }

    #[test]
    fn test_moving_failed_store_stays_failed() {
        let mut store: CircularStore<f32, _> = CircularStore::new(RamStorage::<16>::filled(0), 5, 0.0);
        assert!(store.init(&mut TestConsole::new(), &mut NoDelay::default()).is_err());

        let store = store.with_base_address(0);
        assert_eq!(store.state(), StoreState::Failed(InitError::TooLarge));
    }

    #[test]
    fn test_custom_policy_bounds_wait() {
        let mut store = store_of_four().with_policy(ConfirmPolicy {
            max_tries: 2,
            poll_interval_ms: 250,
        });
        ready(&mut store);
        store.write(&1.0).unwrap();

        let policy = *store.policy();
        let mut store = power_cycle(store).with_policy(policy);
        let mut delay = NoDelay::default();
        store.init(&mut TestConsole::new(), &mut delay).unwrap();
        assert_eq!(delay.calls, 1);
    }
}
