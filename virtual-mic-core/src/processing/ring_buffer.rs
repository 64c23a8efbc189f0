use crate::models::error::DeviceError;

/// Fixed-capacity circular byte store with independent read/write cursors.
///
/// Has no synchronization of its own; the device context keeps it behind
/// its `parking_lot::Mutex` and only touches it while that guard is held.
///
/// One byte of capacity is permanently reserved so that
/// `write_cursor == read_cursor` always means "empty" and never "full".
/// A store of capacity `C` therefore holds at most `C - 1` bytes.
///
/// Overflow behavior: never overwrites unread data. Writes are truncated to
/// the free space and report how much was taken.
#[derive(Debug)]
pub struct RingStore {
    storage: Box<[u8]>,
    write_cursor: usize,
    read_cursor: usize,
}

impl RingStore {
    /// Allocate a zeroed store of `capacity` bytes.
    ///
    /// Allocation is fallible so an oversized request surfaces as
    /// `InsufficientResources` instead of aborting the process.
    pub fn with_capacity(capacity: usize) -> Result<Self, DeviceError> {
        if capacity < 2 {
            return Err(DeviceError::InvalidParameter(format!(
                "ring capacity must be at least 2 bytes, got {}",
                capacity
            )));
        }

        let mut storage = Vec::new();
        storage.try_reserve_exact(capacity).map_err(|e| {
            DeviceError::InsufficientResources(format!(
                "failed to allocate {} byte ring store: {}",
                capacity, e
            ))
        })?;
        storage.resize(capacity, 0);

        Ok(Self {
            storage: storage.into_boxed_slice(),
            write_cursor: 0,
            read_cursor: 0,
        })
    }

    /// Copy as much of `data` as fits.
    ///
    /// Returns the number of bytes actually stored, which may be less than
    /// `data.len()`. A non-empty write against a full store copies nothing
    /// and returns `BufferSaturated`.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        if data.is_empty() {
            return Ok(0);
        }

        let to_copy = data.len().min(self.free_space());
        if to_copy == 0 {
            return Err(DeviceError::BufferSaturated);
        }

        let capacity = self.capacity();
        let first = to_copy.min(capacity - self.write_cursor);
        let second = to_copy - first;

        self.storage[self.write_cursor..self.write_cursor + first].copy_from_slice(&data[..first]);
        if second > 0 {
            self.storage[..second].copy_from_slice(&data[first..to_copy]);
        }

        self.write_cursor = (self.write_cursor + to_copy) % capacity;
        Ok(to_copy)
    }

    /// Move up to `out.len()` unread bytes into `out`.
    ///
    /// Returns the number of bytes read; `0` when the store is empty, which
    /// is a normal condition rather than an error.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let to_copy = out.len().min(self.used_space());
        if to_copy == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let first = to_copy.min(capacity - self.read_cursor);
        let second = to_copy - first;

        out[..first].copy_from_slice(&self.storage[self.read_cursor..self.read_cursor + first]);
        if second > 0 {
            out[first..to_copy].copy_from_slice(&self.storage[..second]);
        }

        self.read_cursor = (self.read_cursor + to_copy) % capacity;
        to_copy
    }

    /// Bytes holding unread data.
    pub fn used_space(&self) -> usize {
        let capacity = self.capacity();
        (self.write_cursor + capacity - self.read_cursor) % capacity
    }

    /// Bytes that can still be written.
    pub fn free_space(&self) -> usize {
        self.capacity() - 1 - self.used_space()
    }

    pub fn is_empty(&self) -> bool {
        self.write_cursor == self.read_cursor
    }

    pub fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    /// Physical size of the storage, including the reserved byte.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Occupancy as an integer percentage of capacity, `0..=100`.
    pub fn occupancy_percent(&self) -> u32 {
        (self.used_space() * 100 / self.capacity()) as u32
    }

    #[cfg(test)]
    pub(crate) fn cursors(&self) -> (usize, usize) {
        (self.write_cursor, self.read_cursor)
    }
}
