#![no_std]

//! This crate provides a buffered, byte-order aware SPI transport for EVE
//! (Embedded Video Engine) display controllers.
//!
//! It sits between a display protocol layer, which knows about EVE registers,
//! display lists and co-processor commands, and a bus adapter that moves raw
//! bytes. The adapter is anything implementing [`interface::Bus`]; an
//! embedded-hal 1.0 backend is provided as [`interface::SpiBackend`].
//!
//! ## Transport discipline
//!
//! - Values go out in the chip's wire order (see [`wire`]).
//! - Writes are staged in a fixed-size [`cache::WriteCache`] and sent as large
//!   transactions. Reads, deselects and power changes flush it first.
//! - Chip-select and power are tracked separately. Power is switched by
//!   routing the select control to the power-down pin for a moment.
//! - Adapter failures come back as [`Error`] values. Nothing in here panics on
//!   a bus error or ends the process.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eve_transport::{interface::SpiBackend, Builder};
//!
//! let backend = SpiBackend::new(spi_bus, cs_pin, pd_pin, delay);
//! let mut eve = Builder::new(backend).clock_rate(20_000_000).build()?;
//!
//! eve.begin()?;
//! eve.init(true)?;
//! eve.power(true)?;
//! eve.delay(20);
//!
//! // read REG_ID
//! eve.select(true)?;
//! eve.send24(0x30_2000)?;
//! eve.send8(0)?; // dummy byte
//! let id = eve.receive8()?;
//! eve.select(false)?;
//! ```

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod _mock;

pub mod cache;
pub mod error;
pub mod interface;
pub mod wire;

mod builder;
pub use builder::*;

pub use error::{BuilderError, Direction, Error};

use cache::{WriteCache, DEFAULT_CACHE_SIZE};
use embedded_hal::spi::MODE_0;
use interface::{Bus, BusConfig, SelectPin};

/// Transport to one EVE chip over one adapter channel.
///
/// Owns the adapter, the write cache and the select/power state. Not meant to
/// be shared: drive each channel from a single owner.
pub struct Transport<B, const N: usize = DEFAULT_CACHE_SIZE>
where
    B: Bus,
{
    /// The bus adapter.
    bus: B,
    /// Options from the builder.
    options: TransportOptions,
    /// Bytes not yet sent.
    cache: WriteCache<N>,
    /// A channel has been opened by `begin`.
    open: bool,
    /// Chip-select is asserted.
    selected: bool,
    /// Power-down line is released (display on).
    powered: bool,
}

impl<B, const N: usize> Transport<B, N>
where
    B: Bus,
{
    /// Enumerates the adapter's channels and opens the configured one.
    ///
    /// Failures leave the transport closed, so the caller can pick another
    /// channel with [`set_channel`](Self::set_channel) and try again. Does
    /// nothing if a channel is already open.
    pub fn begin(&mut self) -> Result<(), Error<B::Error>> {
        if self.open {
            log::debug!("channel {} already open", self.options.channel);
            return Ok(());
        }

        let available = self.bus.channel_count().map_err(|e| {
            log::error!("channel enumeration failed: {e:?}");
            Error::OpenFailed(e)
        })?;

        for index in 0..available {
            match self.bus.channel_info(index) {
                Ok(Some(info)) => log::info!(
                    "channel {index}: VID/PID 0x{:04x}/0x{:04x}, serial {}, {}",
                    info.vendor_id,
                    info.product_id,
                    info.serial_number,
                    info.description
                ),
                Ok(None) => log::info!("channel {index}"),
                Err(e) => log::warn!("channel {index}: no details ({e:?})"),
            }
        }

        let channel = self.options.channel;
        if channel >= available {
            log::error!("not enough channels (wanted {channel}, found {available})");
            return Err(Error::ChannelUnavailable { channel, available });
        }

        self.bus.open(channel).map_err(|e| {
            log::error!("channel {channel} failed to open: {e:?}");
            Error::OpenFailed(e)
        })?;

        log::info!("channel {channel} open");
        self.open = true;
        Ok(())
    }

    /// Sets the channel for the next [`begin`](Self::begin).
    pub fn set_channel(&mut self, channel: u32) {
        self.options.channel = channel;
    }

    /// Applies bus timing.
    ///
    /// With `slow` set the clock is capped at the slow limit, which is what an
    /// EVE chip needs before its clock is configured. Pending bytes are
    /// dropped and the select/power state goes back to its startup values.
    pub fn init(&mut self, slow: bool) -> Result<(), Error<B::Error>> {
        self.ensure_open()?;

        let clock_rate = if slow {
            self.options.clock_rate.min(self.options.slow_clock_limit)
        } else {
            self.options.clock_rate
        };
        let config = BusConfig {
            clock_rate,
            latency_timer: self.options.latency_timer,
            mode: MODE_0,
            select: SelectPin::Chip,
        };

        self.bus.configure(&config).map_err(|e| {
            log::error!(
                "channel {} rejected bus configuration: {e:?}",
                self.options.channel
            );
            Error::ConfigFailed(e)
        })?;
        log::info!("bus configured at {clock_rate} Hz");

        self.cache.discard();
        self.selected = true;
        self.powered = false;
        Ok(())
    }

    /// Selects (`true`) or deselects the chip.
    ///
    /// Returns `false` when the chip already was in the requested state; no
    /// bus call is made in that case. Deselecting sends pending bytes first so
    /// they cannot end up in the next transaction.
    pub fn select(&mut self, enable: bool) -> Result<bool, Error<B::Error>> {
        self.ensure_open()?;

        if enable == self.selected {
            return Ok(false);
        }

        if !enable {
            self.cache.flush(&mut self.bus)?;
        }
        self.bus.set_select(enable).map_err(Error::Select)?;
        self.selected = enable;

        log::trace!("chip {}", if enable { "selected" } else { "deselected" });
        Ok(true)
    }

    /// Switches the display on (`true`) or holds it in power-down / reset.
    ///
    /// The select control is routed to the power-down pin, driven, and routed
    /// back. Chip-select itself is left alone. Afterwards the cache is always
    /// empty.
    pub fn power(&mut self, enable: bool) -> Result<(), Error<B::Error>> {
        self.ensure_open()?;
        self.cache.flush(&mut self.bus)?;

        self.bus
            .remap_select(SelectPin::PowerDown)
            .map_err(Error::Select)?;
        // power-down is active low: asserting the line powers down
        let toggled = self.bus.set_select(!enable);
        let restored = self.bus.remap_select(SelectPin::Chip);
        self.cache.discard();

        toggled.map_err(Error::Select)?;
        restored.map_err(Error::Select)?;

        self.powered = enable;
        log::debug!("display power {}", if enable { "on" } else { "off" });
        Ok(())
    }

    /// Pauses or resumes bus activity, after sending pending bytes.
    pub fn pause(&mut self, pause: bool) -> Result<(), Error<B::Error>> {
        self.ensure_open()?;
        self.cache.flush(&mut self.bus)?;
        self.bus.pause(pause).map_err(Error::ConfigFailed)
    }

    /// Blocks for at least `ms` milliseconds.
    pub fn delay(&mut self, ms: u32) {
        self.bus.delay_ms(ms);
    }

    pub fn send8(&mut self, value: u8) -> Result<(), Error<B::Error>> {
        self.send_buffer(&wire::encode_u8(value)).map(drop)
    }

    /// Sends a 16-bit value, least significant byte first.
    pub fn send16(&mut self, value: u16) -> Result<(), Error<B::Error>> {
        self.send_buffer(&wire::encode_u16(value)).map(drop)
    }

    /// Sends the low 24 bits of `value`, most significant byte first. This is
    /// the form of the memory address opening every EVE transaction.
    pub fn send24(&mut self, value: u32) -> Result<(), Error<B::Error>> {
        self.send_buffer(&wire::encode_u24_be(value)).map(drop)
    }

    /// Sends a 32-bit value, least significant byte first.
    pub fn send32(&mut self, value: u32) -> Result<(), Error<B::Error>> {
        self.send_buffer(&wire::encode_u32(value)).map(drop)
    }

    /// Stages `data` for sending and returns the number of bytes accepted,
    /// which is always `data.len()`.
    pub fn send_buffer(&mut self, data: &[u8]) -> Result<usize, Error<B::Error>> {
        self.ensure_open()?;
        self.cache.stage(&mut self.bus, data)
    }

    pub fn receive8(&mut self) -> Result<u8, Error<B::Error>> {
        let mut bytes = [0; 1];
        self.receive_buffer(&mut bytes)?;
        Ok(wire::decode_u8(bytes))
    }

    pub fn receive16(&mut self) -> Result<u16, Error<B::Error>> {
        let mut bytes = [0; 2];
        self.receive_buffer(&mut bytes)?;
        Ok(wire::decode_u16(bytes))
    }

    pub fn receive32(&mut self) -> Result<u32, Error<B::Error>> {
        let mut bytes = [0; 4];
        self.receive_buffer(&mut bytes)?;
        Ok(wire::decode_u32(bytes))
    }

    /// Fills `buf` from the bus after sending pending bytes. Returns
    /// `buf.len()`; a short read is an error.
    pub fn receive_buffer(&mut self, buf: &mut [u8]) -> Result<usize, Error<B::Error>> {
        self.ensure_open()?;
        self.cache.flush(&mut self.bus)?;

        let requested = buf.len();
        Error::transfer(error::Direction::Read, requested, self.bus.read(buf))
            .inspect_err(|e| log::warn!("bus read failed: {e:?}"))?;
        Ok(requested)
    }

    /// Exchanges one byte full-duplex after sending pending bytes.
    pub fn transfer(&mut self, value: u8) -> Result<u8, Error<B::Error>> {
        self.ensure_open()?;
        self.cache.flush(&mut self.bus)?;

        self.bus
            .transfer(value)
            .map_err(|e| Error::TransferFailed {
                direction: error::Direction::Duplex,
                requested: 1,
                actual: 0,
                source: Some(e),
            })
    }

    /// Sends whatever is waiting in the write cache.
    pub fn flush(&mut self) -> Result<(), Error<B::Error>> {
        self.ensure_open()?;
        self.cache.flush(&mut self.bus)
    }

    /// Sends pending bytes and closes the channel.
    ///
    /// The transport is closed afterwards even if the flush failed; the flush
    /// error is reported in preference to a close error.
    pub fn end(&mut self) -> Result<(), Error<B::Error>> {
        if !self.open {
            return Ok(());
        }

        let flushed = self.cache.flush(&mut self.bus);
        let closed = self.bus.close();
        self.open = false;
        log::info!("channel {} closed", self.options.channel);

        flushed?;
        closed.map_err(Error::CloseFailed)
    }

    /// Returns `true` while a channel is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns `true` if the chip is currently selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns `true` if the display was last switched on.
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Number of bytes waiting in the write cache.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Releases the bus adapter. Bytes still in the cache are dropped; call
    /// [`end`](Self::end) first to send them.
    pub fn release(self) -> B {
        self.bus
    }

    fn ensure_open(&self) -> Result<(), Error<B::Error>> {
        if self.open {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }
}
