//! [super::Transport] builder module

use crate::{
    cache::{WriteCache, DEFAULT_CACHE_SIZE},
    error::BuilderError,
    interface::Bus,
    Transport,
};

/// Clock ceiling used by [`Transport::init`] in slow mode. EVE chips accept
/// at most 11 MHz until their PLL is running.
pub const SLOW_CLOCK_LIMIT: u32 = 8_000_000;

/// Options the transport was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Adapter channel opened by [`Transport::begin`].
    pub channel: u32,
    /// SPI clock for normal operation, in Hz.
    pub clock_rate: u32,
    /// Clock ceiling applied by `init(true)`, in Hz.
    pub slow_clock_limit: u32,
    /// Adapter latency timer, in ms.
    pub latency_timer: u8,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            channel: 0,
            clock_rate: 30_000_000,
            slow_clock_limit: SLOW_CLOCK_LIMIT,
            latency_timer: 10,
        }
    }
}

/// Builder for [Transport] instances.
pub struct Builder<B> {
    bus: B,
    options: TransportOptions,
}

impl<B: Bus> Builder<B> {
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            options: TransportOptions::default(),
        }
    }

    #[must_use]
    pub fn channel(mut self, channel: u32) -> Self {
        self.options.channel = channel;
        self
    }

    #[must_use]
    pub fn clock_rate(mut self, hz: u32) -> Self {
        self.options.clock_rate = hz;
        self
    }

    #[must_use]
    pub fn slow_clock_limit(mut self, hz: u32) -> Self {
        self.options.slow_clock_limit = hz;
        self
    }

    #[must_use]
    pub fn latency_timer(mut self, ms: u8) -> Self {
        self.options.latency_timer = ms;
        self
    }

    /// Builds a transport with the default cache size.
    pub fn build(self) -> Result<Transport<B>, BuilderError> {
        self.build_with_cache::<DEFAULT_CACHE_SIZE>()
    }

    /// Builds a transport whose write cache holds `N` bytes.
    pub fn build_with_cache<const N: usize>(self) -> Result<Transport<B, N>, BuilderError> {
        if self.options.clock_rate == 0 || self.options.slow_clock_limit == 0 {
            return Err(BuilderError::InvalidClockRate);
        }
        if self.options.latency_timer == 0 {
            return Err(BuilderError::InvalidLatencyTimer);
        }

        Ok(Transport {
            bus: self.bus,
            options: self.options,
            cache: WriteCache::new(),
            open: false,
            // assume selected so the first deselect really drives the line
            selected: true,
            powered: false,
        })
    }
}
