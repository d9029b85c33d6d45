//! Test doubles for the bus, the RST pin and the delay source.
//!
//! `MockBus` records every transaction it sees (the log doubles as the
//! transport call counter for the access-violation tests) and serves
//! scripted payloads (or injected error kinds) to read phases in order.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError(pub ErrorKind);

impl embedded_hal::i2c::Error for MockBusError {
  fn kind(&self) -> ErrorKind {
    self.0
  }
}

/// One recorded transaction, as the wire would see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
  Write { addr: u8, bytes: Vec<u8> },
  Read { addr: u8, len: usize },
  WriteRead { addr: u8, bytes: Vec<u8>, len: usize },
}

#[derive(Default)]
pub struct MockBus {
  log: Vec<BusOp>,
  reads: VecDeque<Result<Vec<u8>, ErrorKind>>,
  write_failure: Option<ErrorKind>,
}

impl MockBus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serve `bytes` to the next read phase (shorter payloads are
  /// zero-padded to the requested length).
  pub fn expect_read(&mut self, bytes: &[u8]) {
    self.reads.push_back(Ok(bytes.to_vec()));
  }

  /// Fail the next read phase with `kind`.
  pub fn expect_read_error(&mut self, kind: ErrorKind) {
    self.reads.push_back(Err(kind));
  }

  /// Fail every write-only transaction with `kind` from now on.
  pub fn fail_writes(&mut self, kind: ErrorKind) {
    self.write_failure = Some(kind);
  }

  pub fn ops(&self) -> &[BusOp] {
    &self.log
  }

  pub fn clear_log(&mut self) {
    self.log.clear();
  }

  fn serve(&mut self, buf: &mut [u8]) -> Result<(), MockBusError> {
    match self.reads.pop_front() {
      Some(Ok(bytes)) => {
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        buf[n..].fill(0);
        Ok(())
      }
      Some(Err(kind)) => Err(MockBusError(kind)),
      // Unscripted reads see an all-zero wire.
      None => {
        buf.fill(0);
        Ok(())
      }
    }
  }
}

impl ErrorType for MockBus {
  type Error = MockBusError;
}

impl I2c for MockBus {
  fn transaction(&mut self, address: SevenBitAddress, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
    match operations {
      [Operation::Write(bytes)] => {
        self.log.push(BusOp::Write { addr: address, bytes: bytes.to_vec() });
        match self.write_failure {
          Some(kind) => Err(MockBusError(kind)),
          None => Ok(()),
        }
      }
      [Operation::Read(buf)] => {
        self.log.push(BusOp::Read { addr: address, len: buf.len() });
        self.serve(buf)
      }
      [Operation::Write(bytes), Operation::Read(buf)] => {
        self.log.push(BusOp::WriteRead { addr: address, bytes: bytes.to_vec(), len: buf.len() });
        self.serve(buf)
      }
      other => panic!("unexpected transaction shape ({} operations)", other.len()),
    }
  }
}

/// Records the level transitions driven onto the RST pin.
#[derive(Default)]
pub struct MockPin {
  transitions: Vec<bool>,
}

impl MockPin {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn transitions(&self) -> &[bool] {
    &self.transitions
  }
}

impl embedded_hal::digital::ErrorType for MockPin {
  type Error = Infallible;
}

impl OutputPin for MockPin {
  fn set_low(&mut self) -> Result<(), Self::Error> {
    self.transitions.push(false);
    Ok(())
  }

  fn set_high(&mut self) -> Result<(), Self::Error> {
    self.transitions.push(true);
    Ok(())
  }
}

/// Accumulates requested delays instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
  elapsed_ns: u64,
}

impl MockDelay {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn total_ms(&self) -> u32 {
    (self.elapsed_ns / 1_000_000) as u32
  }
}

impl DelayNs for MockDelay {
  fn delay_ns(&mut self, ns: u32) {
    self.elapsed_ns += ns as u64;
  }
}
