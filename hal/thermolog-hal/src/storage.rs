//! Raw storage abstractions
//!
//! Provides the byte-addressable view of non-volatile memory (EEPROM, FRAM,
//! emulated EEPROM) that the record log is laid out on. There is no key
//! space, wear leveling, or integrity checking at this level: the bytes
//! written are the bytes subsequently read back at that address.

/// Errors from raw storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Access falls outside `[0, capacity)`
    OutOfBounds,
    /// The device reported a failure
    Device,
}

/// Byte-addressable non-volatile storage
///
/// Addresses are absolute byte offsets from the start of the medium.
/// Implementations must reject any access that does not fit entirely
/// inside `[0, capacity())` with [`StorageError::OutOfBounds`] rather than
/// wrapping or truncating.
pub trait RawStorage {
    /// Total number of bytes available
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `address`
    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError>;
}

impl<T: RawStorage + ?Sized> RawStorage for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(address, buf)
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(address, data)
    }
}

/// Check that `[address, address + len)` lies inside a medium of `capacity` bytes
pub fn check_bounds(capacity: usize, address: usize, len: usize) -> Result<(), StorageError> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StorageError::OutOfBounds),
    }
}

/// Adapter for any `embedded-storage` device
///
/// Lets drivers that already implement [`embedded_storage::Storage`]
/// (I2C/SPI EEPROMs, emulated EEPROM on flash) back the record log.
/// Device errors collapse to [`StorageError::Device`].
pub struct EmbeddedStorage<S> {
    inner: S,
}

impl<S> EmbeddedStorage<S> {
    /// Wrap an `embedded-storage` device
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get the wrapped device for low-level access
    pub fn inner(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the adapter and return the wrapped device
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: embedded_storage::Storage> RawStorage for EmbeddedStorage<S> {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(self.capacity(), address, buf.len())?;
        let offset = u32::try_from(address).map_err(|_| StorageError::OutOfBounds)?;
        self.inner
            .read(offset, buf)
            .map_err(|_| StorageError::Device)
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        check_bounds(self.capacity(), address, data.len())?;
        let offset = u32::try_from(address).map_err(|_| StorageError::OutOfBounds)?;
        self.inner
            .write(offset, data)
            .map_err(|_| StorageError::Device)
    }
}
