use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use super::{Bus, BusConfig, SelectPin};

/// Spi backend error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiError<SPI, CS, PD> {
    Spi(SPI),
    Cs(CS),
    Pd(PD),
    /// Only channel 0 exists on a plain SPI bus.
    NoSuchChannel(u32),
    /// A data transfer was attempted while select was routed to the
    /// power-down line.
    SelectRemapped,
}

/// Backend for an embedded-hal SPI bus with host-driven chip-select.
///
/// The bus must already be set up for SPI mode 0; embedded-hal has no runtime
/// clock control, so [`Bus::configure`] only records the requested timing and
/// asserts chip-select, the state [`Transport::init`](crate::Transport::init)
/// assumes. The power-down line is left untouched.
///
/// Chip-select is driven by hand, not by an `SpiDevice`, so the transport can
/// keep the chip selected across several cache flushes. The power-down line is
/// reached the same way the FTDI MPSSE engine does it: by routing the select
/// control to the other pin.
pub struct SpiBackend<SPI, CS, PD, DLY> {
    spi: SPI,
    cs: CS,
    pd: PD,
    delay: DLY,
    routed: SelectPin,
    config: Option<BusConfig>,
}

impl<SPI, CS, PD, DLY> SpiBackend<SPI, CS, PD, DLY>
where
    SPI: SpiBus,
    CS: OutputPin,
    PD: OutputPin,
    DLY: DelayNs,
{
    /// Create new backend
    pub fn new(spi: SPI, cs: CS, pd: PD, delay: DLY) -> Self {
        Self {
            spi,
            cs,
            pd,
            delay,
            routed: SelectPin::Chip,
            config: None,
        }
    }

    /// Last configuration applied, if any.
    pub fn config(&self) -> Option<&BusConfig> {
        self.config.as_ref()
    }

    /// Release the SPI bus, pins and delay, deconstructing the backend
    pub fn release(self) -> (SPI, CS, PD, DLY) {
        (self.spi, self.cs, self.pd, self.delay)
    }

    fn ensure_data_routing(&self) -> Result<(), SpiError<SPI::Error, CS::Error, PD::Error>> {
        match self.routed {
            SelectPin::Chip => Ok(()),
            SelectPin::PowerDown => Err(SpiError::SelectRemapped),
        }
    }
}

impl<SPI, CS, PD, DLY> Bus for SpiBackend<SPI, CS, PD, DLY>
where
    SPI: SpiBus,
    CS: OutputPin,
    PD: OutputPin,
    DLY: DelayNs,
{
    type Error = SpiError<SPI::Error, CS::Error, PD::Error>;

    fn channel_count(&mut self) -> Result<u32, Self::Error> {
        Ok(1)
    }

    fn open(&mut self, channel: u32) -> Result<(), Self::Error> {
        if channel != 0 {
            return Err(SpiError::NoSuchChannel(channel));
        }
        Ok(())
    }

    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        log::debug!(
            "spi backend: {} Hz requested, mode {:?}",
            config.clock_rate,
            config.mode
        );
        // chip selected, matching the transport's startup state
        self.routed = config.select;
        self.set_select(true)?;
        self.config = Some(*config);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.ensure_data_routing()?;
        self.spi.write(data).map_err(SpiError::Spi)?;
        self.spi.flush().map_err(SpiError::Spi)?;
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.ensure_data_routing()?;
        self.spi.read(buf).map_err(SpiError::Spi)?;
        self.spi.flush().map_err(SpiError::Spi)?;
        Ok(buf.len())
    }

    fn transfer(&mut self, value: u8) -> Result<u8, Self::Error> {
        self.ensure_data_routing()?;
        let mut word = [value];
        self.spi.transfer_in_place(&mut word).map_err(SpiError::Spi)?;
        self.spi.flush().map_err(SpiError::Spi)?;
        Ok(word[0])
    }

    fn set_select(&mut self, active: bool) -> Result<(), Self::Error> {
        // both lines are active low
        match (self.routed, active) {
            (SelectPin::Chip, true) => self.cs.set_low().map_err(SpiError::Cs),
            (SelectPin::Chip, false) => self.cs.set_high().map_err(SpiError::Cs),
            (SelectPin::PowerDown, true) => self.pd.set_low().map_err(SpiError::Pd),
            (SelectPin::PowerDown, false) => self.pd.set_high().map_err(SpiError::Pd),
        }
    }

    fn remap_select(&mut self, pin: SelectPin) -> Result<(), Self::Error> {
        self.routed = pin;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
