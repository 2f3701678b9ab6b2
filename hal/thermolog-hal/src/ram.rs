//! RAM-backed storage
//!
//! A fixed-size byte array standing in for an EEPROM. Used on the host for
//! tests and simulation, and on targets without non-volatile memory where a
//! log that does not survive reset is acceptable.

use crate::storage::{check_bounds, RawStorage, StorageError};

/// Value of an erased EEPROM cell
pub const ERASED_BYTE: u8 = 0xFF;

/// In-memory EEPROM of `N` bytes
///
/// Counts write operations so tests can reason about wear, and can be
/// write-protected to exercise error paths.
#[derive(Debug, Clone)]
pub struct RamStorage<const N: usize> {
    bytes: [u8; N],
    writes: usize,
    write_protect: bool,
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStorage<N> {
    /// Create storage in the erased state (all `0xFF`)
    pub fn new() -> Self {
        Self::filled(ERASED_BYTE)
    }

    /// Create storage with every byte set to `value`
    pub fn filled(value: u8) -> Self {
        Self {
            bytes: [value; N],
            writes: 0,
            write_protect: false,
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of successful write operations since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Reject all subsequent writes with [`StorageError::Device`]
    pub fn set_write_protect(&mut self, enabled: bool) {
        self.write_protect = enabled;
    }
}

impl<const N: usize> RawStorage for RamStorage<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(N, address, buf.len())?;
        buf.copy_from_slice(&self.bytes[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        check_bounds(N, address, data.len())?;
        if self.write_protect {
            return Err(StorageError::Device);
        }
        self.bytes[address..address + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

// `embedded-storage` view, so the same buffer can sit behind `EmbeddedStorage`
impl<const N: usize> embedded_storage::ReadStorage for RamStorage<N> {
    type Error = StorageError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        RawStorage::read(self, offset as usize, bytes)
    }

    fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> embedded_storage::Storage for RamStorage<N> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        RawStorage::write(self, offset as usize, bytes)
    }
}
