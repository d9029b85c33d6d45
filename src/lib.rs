#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Blocking, `no_std` driver for the Azoteq IQS550 (IQS5xx-B000) capacitive
//! multi-touch trackpad controller.
//!
//! The IQS550 tracks up to five simultaneous contacts and reports gestures,
//! system status and per-finger coordinates through a register map addressed
//! with 16-bit big-endian addresses. The controller only talks during
//! *communication windows* it opens itself (signaled on the RDY line); every
//! window must be terminated explicitly by writing the end-of-window command.
//! This crate exposes:
//!
//! - A typed register catalog with access-mode and encoding rules
//!   ([`reg`])
//! - Deferred read/write queues with synchronous completion callbacks,
//!   drained exactly once per communication window
//! - The bulk touch-frame decode: gesture flags, system flags and five
//!   finger slots with locally computed relative motion
//! - An edge-triggered readiness flag plus an application-owned dispatch
//!   registry for several controllers sharing one interrupt line
//! - `embedded-hal` 1.0 traits throughout, so the driver works across MCU
//!   families
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::i2c::I2c;
//! use iqs550::{Config, Iqs550, ReadyFlag, ReadyLine, ReadyRegistry};
//!
//! static READY: ReadyFlag = ReadyFlag::new();
//!
//! fn example<I2C, RST, RDY>(i2c: I2C, rst: RST, rdy: RDY, mut delay: impl DelayNs) -> Result<(), iqs550::Error>
//! where
//!   I2C: I2c,
//!   RST: OutputPin,
//!   RDY: InputPin,
//! {
//!   let config = Config::new().with_resolution(1024, 768);
//!   let mut trackpad = Iqs550::new(i2c, rst, &READY, config);
//!   trackpad.begin(&mut delay)?;
//!
//!   // Route the shared RDY interrupt through an application-owned registry;
//!   // call `registry.dispatch()` from the rising-edge handler.
//!   let mut registry: ReadyRegistry<RDY, 1> = ReadyRegistry::new();
//!   registry.register(ReadyLine::new(rdy, &READY))?;
//!
//!   loop {
//!     if trackpad.poll()? {
//!       for finger in trackpad.report().fingers() {
//!         if finger.is_active() { /* ... */ }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Queued commands run inside the device's next window; callbacks execute
//! synchronously during [`Iqs550::poll`], in queue order:
//!
//! ```no_run
//! # fn demo(trackpad: &mut iqs550::Iqs550<impl embedded_hal::i2c::I2c, impl embedded_hal::digital::OutputPin>) {
//! trackpad
//!   .queue_read(iqs550::reg::PRODUCT_NUMBER, |_queues, address, value| {
//!     // runs during poll(), after this window's bulk frame read
//!     let _ = (address, value);
//!   })
//!   .ok();
//! # }
//! ```

extern crate alloc;
#[cfg(test)]
extern crate std;

mod bus;
#[cfg(test)]
mod mock;
mod queue;
mod ready;
pub mod reg;
mod report;
mod setup;

use embedded_hal::i2c::{ErrorKind, SevenBitAddress};

pub use queue::{CommandQueues, ReadCallback, WriteCallback, QUEUE_DEPTH};
pub use ready::{ReadyFlag, ReadyLine, ReadyRegistry};
pub use reg::{Access, Encoding, Register};
pub use report::{AxisConfig, Finger, GestureFlags, MultiGestureFlags, SystemFlags, TouchReport, MAX_FINGERS};
pub use setup::{Config, PowerMode, RESET_PULSE_MS};

/// Factory-default bus address of the controller.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x74;

/// Errors surfaced by this driver.
///
/// One uniform, copyable code for direct calls and queued-command callbacks
/// alike; nothing in the driver panics on a failed operation. Transport
/// failures carry the portable [`ErrorKind`] classification of the underlying
/// bus error (`Overrun` is the device offering more bytes than were
/// requested; it is never silently truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Error {
  /// The bus transaction failed.
  Bus(ErrorKind),
  /// Read of a write-only register, or write of a read-only register. No
  /// transport call is attempted.
  AccessViolation,
  /// Register width this driver cannot transfer (only 1- and 2-byte
  /// registers exist on the device).
  UnsupportedWidth(u8),
  /// The RST pin could not be driven.
  Pin,
  /// A deferred-command queue (or the ready registry) is at capacity.
  QueueFull,
}

impl Error {
  pub(crate) fn bus<E: embedded_hal::i2c::Error>(error: E) -> Self {
    Self::Bus(error.kind())
  }
}

/// Driver handle for one IQS550 controller.
///
/// Owns the bus handle, the RST pin, the deferred-command queues and the
/// decoded touch state. The readiness flag lives outside the handle (in a
/// `static`) so the interrupt side can reach it; everything else happens in
/// the polling context. See the crate docs for the full bring-up sequence.
pub struct Iqs550<I2C, RST> {
  i2c: I2C,
  rst: RST,
  address: SevenBitAddress,
  ready: &'static ReadyFlag,
  config: Config,
  queues: CommandQueues,
  report: TouchReport,
  initialized: bool,
  updated: bool,
  high_water: u8,
}

impl<I2C, RST> Iqs550<I2C, RST> {
  /// Create a driver handle. Nothing is transmitted until the first
  /// communication window after [`Iqs550::begin`].
  pub fn new(i2c: I2C, rst: RST, ready: &'static ReadyFlag, config: Config) -> Self {
    Self {
      i2c,
      rst,
      address: config.address,
      ready,
      config,
      queues: CommandQueues::new(),
      report: TouchReport::idle(),
      initialized: false,
      updated: false,
      high_water: 0,
    }
  }

  /// The flag this device's RDY line asserts; hand it to a
  /// [`ReadyLine`] when wiring up interrupt dispatch.
  pub fn ready_flag(&self) -> &'static ReadyFlag {
    self.ready
  }

  /// Bus address this handle talks to.
  pub fn address(&self) -> SevenBitAddress {
    self.address
  }

  /// `true` once the first communication window has drained the staged
  /// writes; the bulk frame path is only trusted from then on.
  pub fn initialized(&self) -> bool {
    self.initialized
  }

  /// `true` when the last [`Iqs550::poll`] decoded a fresh touch frame.
  pub fn updated(&self) -> bool {
    self.updated
  }

  /// Decoded state of the most recent touch frame.
  pub fn report(&self) -> &TouchReport {
    &self.report
  }

  /// Direct access to the deferred-command queues.
  pub fn queues(&mut self) -> &mut CommandQueues {
    &mut self.queues
  }

  /// Queue a read of `register` for the next communication window; see
  /// [`CommandQueues::queue_read`].
  pub fn queue_read(
    &mut self,
    register: Register,
    callback: impl FnOnce(&mut CommandQueues, u16, Result<i32, Error>) + 'static,
  ) -> Result<(), Error> {
    self.queues.queue_read(register, callback)
  }

  /// Queue a write of `value` to `register` for the next communication
  /// window; see [`CommandQueues::queue_write`].
  pub fn queue_write(&mut self, register: Register, value: i32) -> Result<(), Error> {
    self.queues.queue_write(register, value)
  }

  /// Queue a write with a completion callback; see
  /// [`CommandQueues::queue_write_with`].
  pub fn queue_write_with(
    &mut self,
    register: Register,
    value: i32,
    callback: impl FnOnce(&mut CommandQueues, u16, Result<(), Error>) + 'static,
  ) -> Result<(), Error> {
    self.queues.queue_write_with(register, value, callback)
  }

  #[cfg(test)]
  pub(crate) fn bus(&self) -> &I2C {
    &self.i2c
  }

  #[cfg(test)]
  pub(crate) fn bus_mut(&mut self) -> &mut I2C {
    &mut self.i2c
  }

  #[cfg(test)]
  pub(crate) fn rst(&self) -> &RST {
    &self.rst
  }
}

impl<I2C, RST> Iqs550<I2C, RST>
where
  I2C: embedded_hal::i2c::I2c<SevenBitAddress>,
{
  /// Run one poll cycle if the readiness flag is asserted.
  ///
  /// Does nothing (and touches nothing on the bus) while the flag is clear.
  /// Otherwise the device has opened a communication window, and the cycle
  /// runs to completion within this call: drain the write queue, perform the
  /// mandatory bulk frame read and decode (once initialized), drain the read
  /// queue, close the window, clear the flag. Returns whether the touch
  /// state was updated.
  ///
  /// All per-command and per-frame errors are recovered locally (reported
  /// through callbacks or the log); only a failed window close is returned,
  /// since the device will not resume sensing until the close lands.
  /// Callers with several controllers on one bus must serialize their
  /// `poll` calls; a window must not overlap another device's window.
  pub fn poll(&mut self) -> Result<bool, Error> {
    if !self.ready.is_asserted() {
      return Ok(false);
    }

    self.updated = false;
    let was_initialized = self.initialized;

    // Writes land first so a staged default-read-address takes effect
    // before the current-address bulk read relies on it.
    self.drain_writes();

    if was_initialized {
      self.fetch_frame();
    }

    self.drain_reads();

    // The first drained window configures the device; its frame (if any)
    // predates that configuration and is not reported as an update.
    if !was_initialized {
      self.initialized = true;
    }

    let closed = self.close_window();
    self.ready.clear();

    match closed {
      Ok(()) => {
        log::trace!("window cycle complete, updated={}", self.updated);
        Ok(self.updated)
      }
      Err(error) => {
        log::warn!("window close failed: {:?}", error);
        Err(error)
      }
    }
  }

  /// Bulk-read and decode one touch frame. The read length is bounded by
  /// the high-water finger count so idle polls stay short; a frame that
  /// announces more fingers grows the next cycle's read.
  fn fetch_frame(&mut self) {
    let slots = self.high_water.clamp(1, MAX_FINGERS as u8) as usize;
    let mut buf = [0u8; report::frame_len(MAX_FINGERS)];
    let len = report::frame_len(slots);

    match self.current_address_read(&mut buf[..len]) {
      Ok(()) => {
        self.report.decode(&buf[..len]);
        let count = self.report.count();
        self.high_water = if count == 0 { 0 } else { self.high_water.max(count) };
        self.updated = true;
      }
      Err(error) => {
        // Stale finger/gesture state is retained; the cycle still drains
        // the queues and closes the window.
        log::warn!("touch frame read failed: {:?}", error);
      }
    }
  }

  fn drain_writes(&mut self) {
    while let Some(command) = self.queues.pop_write() {
      let result = self.write_register(command.register, command.value);
      if let Some(callback) = command.callback {
        callback(&mut self.queues, command.register.address, result);
      }
    }
  }

  fn drain_reads(&mut self) {
    while let Some(command) = self.queues.pop_read() {
      let result = self.read_register(command.register);
      (command.callback)(&mut self.queues, command.register.address, result);
    }
  }
}
