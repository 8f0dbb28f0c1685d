//! Bus adapter contract.

mod spi;
pub use spi::*;

use embedded_hal::spi::Mode;

/// Description of an adapter channel, as reported during enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: heapless::String<16>,
    pub description: heapless::String<64>,
}

impl ChannelInfo {
    /// Creates channel information, truncating text that does not fit.
    pub fn new(vendor_id: u16, product_id: u16, serial_number: &str, description: &str) -> Self {
        Self {
            vendor_id,
            product_id,
            serial_number: truncated(serial_number),
            description: truncated(description),
        }
    }
}

fn truncated<const N: usize>(text: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Physical line driven by the select control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectPin {
    /// The chip-select line (active low).
    #[default]
    Chip,
    /// The power-down / reset line of the display controller.
    PowerDown,
}

/// Bus timing and pin assignment applied by [`Bus::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// SPI clock in Hz.
    pub clock_rate: u32,
    /// Adapter latency timer in ms.
    pub latency_timer: u8,
    /// SPI mode; EVE chips use mode 0.
    pub mode: Mode,
    /// Line the select control drives after configuration.
    pub select: SelectPin,
}

/// Capabilities a bus adapter provides to the transport.
///
/// Every call blocks until the adapter is done. Timeouts, bus arbitration and
/// reconnection are the adapter's business; the transport only sees the
/// returned `Result`.
pub trait Bus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Number of channels the adapter can open.
    fn channel_count(&mut self) -> Result<u32, Self::Error>;

    /// Describes channel `index`, if the adapter knows anything about it.
    fn channel_info(&mut self, _index: u32) -> Result<Option<ChannelInfo>, Self::Error> {
        Ok(None)
    }

    /// Opens a channel. Only one channel is open at a time.
    fn open(&mut self, channel: u32) -> Result<(), Self::Error>;

    /// Closes the open channel.
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies clock rate, mode and select assignment, and leaves the routed
    /// select line active.
    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error>;

    /// Writes `data` as one bus transaction and returns the number of bytes
    /// the adapter reports as sent.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Reads into `buf` and returns the number of bytes received.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Clocks one byte out while clocking one in.
    fn transfer(&mut self, value: u8) -> Result<u8, Self::Error>;

    /// Drives the currently routed select line; `true` is the active (low)
    /// level.
    fn set_select(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Routes the select control to another physical line.
    fn remap_select(&mut self, pin: SelectPin) -> Result<(), Self::Error>;

    /// Suspends or resumes bus activity.
    fn pause(&mut self, _pause: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Bus + ?Sized> Bus for &mut T {
    type Error = T::Error;

    fn channel_count(&mut self) -> Result<u32, Self::Error> {
        T::channel_count(self)
    }

    fn channel_info(&mut self, index: u32) -> Result<Option<ChannelInfo>, Self::Error> {
        T::channel_info(self, index)
    }

    fn open(&mut self, channel: u32) -> Result<(), Self::Error> {
        T::open(self, channel)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        T::close(self)
    }

    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        T::configure(self, config)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        T::write(self, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read(self, buf)
    }

    fn transfer(&mut self, value: u8) -> Result<u8, Self::Error> {
        T::transfer(self, value)
    }

    fn set_select(&mut self, active: bool) -> Result<(), Self::Error> {
        T::set_select(self, active)
    }

    fn remap_select(&mut self, pin: SelectPin) -> Result<(), Self::Error> {
        T::remap_select(self, pin)
    }

    fn pause(&mut self, pause: bool) -> Result<(), Self::Error> {
        T::pause(self, pause)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}
