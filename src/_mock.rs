//! Test doubles for the bus contract and for the embedded-hal traits.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, vec::Vec};

use embedded_hal::{delay::DelayNs, digital, spi};

use crate::interface::{Bus, BusConfig, ChannelInfo, SelectPin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(u32),
    Close,
    Configure(BusConfig),
    Write(Vec<u8>),
    Read(usize),
    Transfer(u8),
    Select(bool),
    Remap(SelectPin),
    Pause(bool),
    Delay(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Open,
    Close,
    Configure,
    Write,
    Read,
    Select,
}

/// Records every call and plays back canned read data.
#[derive(Debug, Default)]
pub struct MockBus {
    pub events: Vec<Event>,
    pub channels: u32,
    pub incoming: VecDeque<u8>,
    pub fail_open: bool,
    pub fail_close: bool,
    pub fail_configure: bool,
    pub fail_write: bool,
    pub fail_read: bool,
    pub fail_select: bool,
    /// Caps the count reported by `write`.
    pub short_write: Option<usize>,
    /// Caps the count reported by `read`.
    pub short_read: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            channels: 1,
            ..Self::default()
        }
    }

    pub fn with_incoming(bytes: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.incoming.extend(bytes.iter().copied());
        bus
    }

    /// Events without the open/configure preamble.
    pub fn traffic(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| !matches!(e, Event::Open(_) | Event::Configure(_)))
            .cloned()
            .collect()
    }

    /// Concatenation of every written transaction.
    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.len()),
                _ => None,
            })
            .collect()
    }
}

impl Bus for MockBus {
    type Error = MockError;

    fn channel_count(&mut self) -> Result<u32, Self::Error> {
        Ok(self.channels)
    }

    fn channel_info(&mut self, index: u32) -> Result<Option<ChannelInfo>, Self::Error> {
        if index >= self.channels {
            return Ok(None);
        }
        Ok(Some(ChannelInfo::new(0x0403, 0x6014, "MOCK", "mock channel")))
    }

    fn open(&mut self, channel: u32) -> Result<(), Self::Error> {
        if self.fail_open {
            return Err(MockError::Open);
        }
        self.events.push(Event::Open(channel));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        if self.fail_close {
            return Err(MockError::Close);
        }
        self.events.push(Event::Close);
        Ok(())
    }

    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        if self.fail_configure {
            return Err(MockError::Configure);
        }
        self.events.push(Event::Configure(*config));
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_write {
            return Err(MockError::Write);
        }
        self.events.push(Event::Write(data.to_vec()));
        Ok(self.short_write.map_or(data.len(), |cap| cap.min(data.len())))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_read {
            return Err(MockError::Read);
        }
        self.events.push(Event::Read(buf.len()));
        let count = self.short_read.map_or(buf.len(), |cap| cap.min(buf.len()));
        for b in buf.iter_mut().take(count) {
            *b = self.incoming.pop_front().unwrap_or(0);
        }
        Ok(count)
    }

    fn transfer(&mut self, value: u8) -> Result<u8, Self::Error> {
        self.events.push(Event::Transfer(value));
        Ok(self.incoming.pop_front().unwrap_or(0))
    }

    fn set_select(&mut self, active: bool) -> Result<(), Self::Error> {
        if self.fail_select {
            return Err(MockError::Select);
        }
        self.events.push(Event::Select(active));
        Ok(())
    }

    fn remap_select(&mut self, pin: SelectPin) -> Result<(), Self::Error> {
        self.events.push(Event::Remap(pin));
        Ok(())
    }

    fn pause(&mut self, pause: bool) -> Result<(), Self::Error> {
        self.events.push(Event::Pause(pause));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::Delay(ms));
    }
}

/// Shared log of what the embedded-hal doubles saw, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalEvent {
    Pin(&'static str, bool),
    SpiWrite(Vec<u8>),
    SpiRead(usize),
    SpiTransfer(Vec<u8>),
    SpiFlush,
    DelayNs(u32),
    DelayMs(u32),
}

pub type HalLog = Rc<RefCell<Vec<HalEvent>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalError;

impl spi::Error for HalError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for HalError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

pub struct MockSpi {
    pub log: HalLog,
    pub incoming: VecDeque<u8>,
}

impl spi::ErrorType for MockSpi {
    type Error = HalError;
}

impl spi::SpiBus for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::SpiRead(words.len()));
        for w in words.iter_mut() {
            *w = self.incoming.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::SpiWrite(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::SpiTransfer(write.to_vec()));
        for r in read.iter_mut() {
            *r = self.incoming.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::SpiTransfer(words.to_vec()));
        for w in words.iter_mut() {
            *w = self.incoming.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::SpiFlush);
        Ok(())
    }
}

pub struct MockPin {
    pub name: &'static str,
    pub log: HalLog,
}

impl digital::ErrorType for MockPin {
    type Error = HalError;
}

impl digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(HalEvent::Pin(self.name, true));
        Ok(())
    }
}

pub struct MockDelay {
    pub log: HalLog,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(HalEvent::DelayNs(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(HalEvent::DelayMs(ms));
    }
}
