//! Reset handling and staged device configuration.
//!
//! Nothing here touches the bus directly: configuration is queued as deferred
//! writes and lands during the first communication window the device opens
//! after reset. That first drained window is also what marks the device
//! initialized and unlocks the bulk frame read path.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::reg::{self, Register};
use crate::report::{AxisConfig, FRAME_BASE_ADDRESS};
use crate::{Error, Iqs550, DEFAULT_ADDRESS};

/// Width of each half of the reset pulse.
pub const RESET_PULSE_MS: u32 = 200;

/// Device power states. Each has its own report-rate register; the device
/// walks down the list as the surface stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PowerMode {
  Active,
  IdleTouch,
  Idle,
  LowPower1,
  LowPower2,
}

impl PowerMode {
  pub const ALL: [PowerMode; 5] = [
    PowerMode::Active,
    PowerMode::IdleTouch,
    PowerMode::Idle,
    PowerMode::LowPower1,
    PowerMode::LowPower2,
  ];

  pub(crate) const fn report_rate_register(self) -> Register {
    match self {
      PowerMode::Active => reg::ACTIVE_REPORT_RATE,
      PowerMode::IdleTouch => reg::IDLE_TOUCH_REPORT_RATE,
      PowerMode::Idle => reg::IDLE_REPORT_RATE,
      PowerMode::LowPower1 => reg::LP1_REPORT_RATE,
      PowerMode::LowPower2 => reg::LP2_REPORT_RATE,
    }
  }
}

/// Startup configuration staged through the write queue by
/// [`Iqs550::begin`].
///
/// ```no_run
/// use iqs550::{AxisConfig, Config, PowerMode};
///
/// let config = Config::new()
///   .with_resolution(1024, 768)
///   .with_axes(AxisConfig::new(false, true, false, true))
///   .with_max_fingers(2)
///   .with_report_rate(PowerMode::Active, 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Config {
  pub address: SevenBitAddress,
  pub resolution: Option<(u16, u16)>,
  pub axes: AxisConfig,
  pub max_fingers: Option<u8>,
  pub report_rates: [Option<u16>; 5],
}

impl Config {
  pub const fn new() -> Self {
    Self {
      address: DEFAULT_ADDRESS,
      resolution: None,
      axes: AxisConfig::disabled(),
      max_fingers: None,
      report_rates: [None; 5],
    }
  }

  /// Use a non-default bus address.
  pub const fn with_address(mut self, address: SevenBitAddress) -> Self {
    self.address = address;
    self
  }

  /// Report coordinates scaled to `x` × `y` pixels.
  pub const fn with_resolution(mut self, x: u16, y: u16) -> Self {
    self.resolution = Some((x, y));
    self
  }

  pub const fn with_axes(mut self, axes: AxisConfig) -> Self {
    self.axes = axes;
    self
  }

  /// Cap the number of simultaneous contacts the device tracks (1..=5).
  pub const fn with_max_fingers(mut self, fingers: u8) -> Self {
    self.max_fingers = Some(fingers);
    self
  }

  /// Report rate in milliseconds for one power mode.
  pub const fn with_report_rate(mut self, mode: PowerMode, ms: u16) -> Self {
    self.report_rates[mode as usize] = Some(ms);
    self
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

impl<I2C, RST> Iqs550<I2C, RST>
where
  I2C: I2c<SevenBitAddress>,
  RST: OutputPin,
{
  /// Pulse the RST pin to hardware-reset the controller. Blocks for the two
  /// documented 200 ms halves of the pulse.
  pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
    self.rst.set_low().map_err(|_| Error::Pin)?;
    delay.delay_ms(RESET_PULSE_MS);
    self.rst.set_high().map_err(|_| Error::Pin)?;
    delay.delay_ms(RESET_PULSE_MS);
    Ok(())
  }

  /// Reset the controller and stage its configuration.
  ///
  /// The staged writes drain during the first communication window, which
  /// also flips the device to initialized. Attaching the RDY interrupt (via
  /// [`crate::ReadyRegistry`]) and bus bring-up are the caller's business.
  pub fn begin(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
    self.reset(delay)?;
    self.stage_configuration()
  }

  fn stage_configuration(&mut self) -> Result<(), Error> {
    // The bulk frame is fetched with current-address reads; the read pointer
    // must land on the frame base before the first frame is trusted.
    self.queues.queue_write(reg::DEFAULT_READ_ADDRESS, FRAME_BASE_ADDRESS as i32)?;

    if let Some((x, y)) = self.config.resolution {
      self.queues.queue_write(reg::X_RESOLUTION, x as i32)?;
      self.queues.queue_write(reg::Y_RESOLUTION, y as i32)?;
    }

    self.queues.queue_write(reg::XY_CONFIG_0, self.config.axes.bits() as i32)?;

    if let Some(fingers) = self.config.max_fingers {
      self.queues.queue_write(reg::MAX_MULTI_TOUCHES, fingers as i32)?;
    }

    for mode in PowerMode::ALL {
      if let Some(ms) = self.config.report_rates[mode as usize] {
        self.queues.queue_write(mode.report_rate_register(), ms as i32)?;
      }
    }

    Ok(())
  }

  /// Queue a resolution change for the next communication window.
  pub fn set_resolution(&mut self, x: u16, y: u16) -> Result<(), Error> {
    self.queues.queue_write(reg::X_RESOLUTION, x as i32)?;
    self.queues.queue_write(reg::Y_RESOLUTION, y as i32)
  }

  /// Queue an axis orientation / palm rejection change.
  pub fn set_axis_config(&mut self, axes: AxisConfig) -> Result<(), Error> {
    self.queues.queue_write(reg::XY_CONFIG_0, axes.bits() as i32)
  }

  /// Queue a change to the maximum number of tracked contacts.
  pub fn set_max_fingers(&mut self, fingers: u8) -> Result<(), Error> {
    self.queues.queue_write(reg::MAX_MULTI_TOUCHES, fingers as i32)
  }

  /// Queue a report-rate change for one power mode.
  pub fn set_report_rate(&mut self, mode: PowerMode, ms: u16) -> Result<(), Error> {
    self.queues.queue_write(mode.report_rate_register(), ms as i32)
  }
}
