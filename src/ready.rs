//! Edge-triggered readiness signaling between interrupt context and the
//! polling context.
//!
//! The RDY line is the only thing the interrupt side ever touches: the
//! handler samples each registered device's pin and sets that device's flag.
//! No bus I/O, no allocation, one atomic store. The polling side observes
//! the flag without blocking; a rapid double assert before the poll runs
//! collapses into a single cycle.
//!
//! Several controllers may share one interrupt line. Instead of a hidden
//! global list of devices, the application owns a [`ReadyRegistry`] and calls
//! [`ReadyRegistry::dispatch`] from the shared handler; only the instances
//! whose pin is actually high get their flag set.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;

use crate::Error;

/// Single-word readiness flag shared between the interrupt handler and the
/// poll loop. Lives in a `static` so both sides can reach it.
pub struct ReadyFlag(AtomicBool);

impl ReadyFlag {
  pub const fn new() -> Self {
    Self(AtomicBool::new(false))
  }

  /// Signal that the device has opened a communication window. Interrupt
  /// safe: one atomic store.
  pub fn assert(&self) {
    self.0.store(true, Ordering::Release);
  }

  /// `true` while an assert is pending.
  pub fn is_asserted(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }

  /// Clear the pending assert. Called at the end of a poll cycle so asserts
  /// arriving mid-cycle fold into that cycle.
  pub(crate) fn clear(&self) {
    self.0.store(false, Ordering::Release);
  }
}

impl Default for ReadyFlag {
  fn default() -> Self {
    Self::new()
  }
}

/// One device's RDY pin paired with its flag.
pub struct ReadyLine<P> {
  pin: P,
  flag: &'static ReadyFlag,
}

impl<P: InputPin> ReadyLine<P> {
  pub fn new(pin: P, flag: &'static ReadyFlag) -> Self {
    Self { pin, flag }
  }

  /// Sample the pin and assert the flag when the device is raising the line.
  /// A pin read failure counts as not-ready; there is no error channel out
  /// of interrupt context.
  pub fn dispatch(&mut self) {
    if self.pin.is_high().unwrap_or(false) {
      self.flag.assert();
    }
  }
}

/// Application-owned registry for devices sharing one interrupt line.
pub struct ReadyRegistry<P, const N: usize> {
  lines: heapless::Vec<ReadyLine<P>, N>,
}

impl<P: InputPin, const N: usize> ReadyRegistry<P, N> {
  pub const fn new() -> Self {
    Self { lines: heapless::Vec::new() }
  }

  /// Add a device's line. Fails with [`Error::QueueFull`] past `N` entries.
  pub fn register(&mut self, line: ReadyLine<P>) -> Result<(), Error> {
    self.lines.push(line).map_err(|_| Error::QueueFull)
  }

  /// Test every registered line independently. Call from the shared
  /// interrupt handler.
  pub fn dispatch(&mut self) {
    for line in self.lines.iter_mut() {
      line.dispatch();
    }
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

impl<P: InputPin, const N: usize> Default for ReadyRegistry<P, N> {
  fn default() -> Self {
    Self::new()
  }
}
