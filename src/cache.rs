//! Write-behind cache
//!
//! Small writes (single registers, command words) are coalesced into bus
//! transactions of up to `N` bytes. USB-attached adapters pay a fixed cost per
//! transaction, so `N` should match the largest transfer the adapter handles
//! in one go.
//!
//! Anything that needs the chip to have seen earlier writes (a read, a
//! deselect, a power change) must [`flush`](WriteCache::flush) first.

use crate::{
    error::{Direction, Error},
    interface::Bus,
};

/// Cache capacity used by [`Transport`](crate::Transport) unless overridden.
pub const DEFAULT_CACHE_SIZE: usize = 128;

/// Fixed-capacity staging buffer for outgoing bytes.
#[derive(Debug, Default)]
pub struct WriteCache<const N: usize = DEFAULT_CACHE_SIZE> {
    buffer: heapless::Vec<u8, N>,
}

impl<const N: usize> WriteCache<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "write cache needs a non-zero capacity") };
        Self {
            buffer: heapless::Vec::new(),
        }
    }

    /// Number of bytes waiting to be sent.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes waiting to be sent.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops pending bytes without sending them.
    pub fn discard(&mut self) {
        self.buffer.clear();
    }

    /// Appends `data`, sending a full transaction each time the cache fills.
    ///
    /// Always accepts the whole slice and returns its length; a write larger
    /// than the capacity goes out as back-to-back full transactions with the
    /// remainder left staged.
    pub fn stage<B: Bus>(&mut self, bus: &mut B, mut data: &[u8]) -> Result<usize, Error<B::Error>> {
        let total = data.len();

        while !data.is_empty() {
            let room = N - self.buffer.len();
            let (chunk, rest) = data.split_at(room.min(data.len()));
            // chunk never exceeds the remaining capacity
            let _ = self.buffer.extend_from_slice(chunk);
            data = rest;

            if self.buffer.is_full() {
                self.flush(bus)?;
            }
        }

        Ok(total)
    }

    /// Sends pending bytes as a single bus write. Does nothing when empty.
    ///
    /// The cache is emptied even when the write fails: some of the bytes may
    /// already be on the wire and resending them would corrupt the stream.
    pub fn flush<B: Bus>(&mut self, bus: &mut B) -> Result<(), Error<B::Error>> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let requested = self.buffer.len();
        log::trace!("flushing {requested} cached bytes");
        let result = bus.write(&self.buffer);
        self.buffer.clear();

        Error::transfer(Direction::Write, requested, result).inspect_err(|e| {
            log::warn!("cache flush failed: {e:?}");
        })
    }
}
