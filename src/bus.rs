//! Raw bus transfers and the access-checked register accessor.
//!
//! The IQS5xx addressing phase is a 2-byte big-endian register address. Reads
//! keep the bus with a repeated start between the addressing and data phases;
//! writes release it with a stop. A communication window stays open until the
//! end-of-window command is written to the sentinel address, so every window
//! must finish with [`Iqs550::close_window`] no matter what happened inside
//! it.

use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::reg::{Encoding, Register};
use crate::{Error, Iqs550};

/// Writing one byte (any value) to this address ends the communication
/// window; RDY drops and the device resumes its own sensing cycle.
pub(crate) const END_WINDOW_ADDRESS: u16 = 0xEEEE;

impl<I2C, RST> Iqs550<I2C, RST>
where
  I2C: I2c<SevenBitAddress>,
{
  /// Address `register_addr` with a repeated start, then read `buf.len()`
  /// bytes.
  pub(crate) fn addressed_read(&mut self, register_addr: u16, buf: &mut [u8]) -> Result<(), Error> {
    self.i2c.write_read(self.address, &register_addr.to_be_bytes(), buf).map_err(Error::bus)
  }

  /// Address `register_addr` and write `data`, releasing the bus on
  /// completion. `data` is at most 2 bytes; widths are validated upstream.
  pub(crate) fn addressed_write(&mut self, register_addr: u16, data: &[u8]) -> Result<(), Error> {
    debug_assert!(data.len() <= 2);
    let mut frame = [0u8; 4];
    frame[..2].copy_from_slice(&register_addr.to_be_bytes());
    frame[2..2 + data.len()].copy_from_slice(data);
    self.i2c.write(self.address, &frame[..2 + data.len()]).map_err(Error::bus)
  }

  /// Read from the register pointer the device currently holds, skipping the
  /// addressing phase. Garbage until the default read address has been
  /// configured (staged during [`Iqs550::begin`]).
  pub(crate) fn current_address_read(&mut self, buf: &mut [u8]) -> Result<(), Error> {
    self.i2c.read(self.address, buf).map_err(Error::bus)
  }

  /// Terminate the communication window with a stop. Required exactly once
  /// per window regardless of other traffic; without it the device never
  /// resumes its sensing cycle. [`Iqs550::poll`](crate::Iqs550::poll) sends
  /// it automatically; call this only when driving a window by hand with
  /// [`Iqs550::read_register`] / [`Iqs550::write_register`].
  pub fn close_window(&mut self) -> Result<(), Error> {
    let [hi, lo] = END_WINDOW_ADDRESS.to_be_bytes();
    self.i2c.write(self.address, &[hi, lo, 0x00]).map_err(Error::bus)
  }

  /// Read one register and decode its value.
  ///
  /// Fails with [`Error::AccessViolation`], without touching the bus, when
  /// the register is write-only. Must be called inside an open communication
  /// window.
  pub fn read_register(&mut self, register: Register) -> Result<i32, Error> {
    if !register.access.readable() {
      return Err(Error::AccessViolation);
    }
    // Signed is a 16-bit encoding; any other width on it is malformed.
    if register.width == 0 || register.width > 2 || (register.encoding == Encoding::Signed && register.width != 2) {
      return Err(Error::UnsupportedWidth(register.width));
    }
    let mut buf = [0u8; 2];
    let data = &mut buf[..register.width as usize];
    self.addressed_read(register.address, data)?;
    Ok(register.decode(data))
  }

  /// Encode `value` per the register's width and write it.
  ///
  /// Fails with [`Error::AccessViolation`], without touching the bus, when
  /// the register is read-only, and with [`Error::UnsupportedWidth`] for any
  /// width other than 1 or 2 bytes. Must be called inside an open
  /// communication window.
  pub fn write_register(&mut self, register: Register, value: i32) -> Result<(), Error> {
    if !register.access.writable() {
      return Err(Error::AccessViolation);
    }
    match register.width {
      1 => self.addressed_write(register.address, &[value as u8]),
      2 => self.addressed_write(register.address, &(value as u16).to_be_bytes()),
      w => Err(Error::UnsupportedWidth(w)),
    }
  }
}

#[cfg(test)]
mod tests {
  use alloc::vec;

  use crate::mock::{BusOp, MockBus, MockPin};
  use crate::{reg, Config, Error, Iqs550, ReadyFlag};

  fn device(bus: MockBus) -> Iqs550<MockBus, MockPin> {
    static READY: ReadyFlag = ReadyFlag::new();
    Iqs550::new(bus, MockPin::new(), &READY, Config::new())
  }

  #[test]
  fn write_is_big_endian_address_then_data() {
    let mut pad = device(MockBus::new());
    pad.write_register(reg::X_RESOLUTION, 0x1234).expect("write");
    assert_eq!(pad.bus().ops(), &[BusOp::Write { addr: 0x74, bytes: vec![0x06, 0x6E, 0x12, 0x34] }]);
  }

  #[test]
  fn signed_write_of_minus_one_is_all_ones_on_the_wire() {
    let mut pad = device(MockBus::new());
    pad.write_register(reg::Register::ad_hoc(0x0100, 2, reg::Encoding::Signed), -1).expect("write");
    assert_eq!(pad.bus().ops(), &[BusOp::Write { addr: 0x74, bytes: vec![0x01, 0x00, 0xFF, 0xFF] }]);
  }

  #[test]
  fn single_byte_write_uses_low_byte() {
    let mut pad = device(MockBus::new());
    pad.write_register(reg::MAX_MULTI_TOUCHES, 0x0203).expect("write");
    assert_eq!(pad.bus().ops(), &[BusOp::Write { addr: 0x74, bytes: vec![0x06, 0x6A, 0x03] }]);
  }

  #[test]
  fn read_round_trips_the_written_value() {
    let mut bus = MockBus::new();
    bus.expect_read(&[0x12, 0x34]);
    let mut pad = device(bus);
    assert_eq!(pad.read_register(reg::X_RESOLUTION).expect("read"), 0x1234);
    assert_eq!(
      pad.bus().ops(),
      &[BusOp::WriteRead { addr: 0x74, bytes: vec![0x06, 0x6E], len: 2 }],
      "read addresses the register with a repeated start"
    );
  }

  #[test]
  fn signed_read_decodes_wire_value() {
    let mut bus = MockBus::new();
    bus.expect_read(&[0xFF, 0xFF]);
    let mut pad = device(bus);
    assert_eq!(pad.read_register(reg::FINGER_1_RELATIVE_X).expect("read"), -1);
  }

  #[test]
  fn read_of_write_only_register_makes_no_transport_call() {
    let mut pad = device(MockBus::new());
    assert_eq!(pad.read_register(reg::SYSTEM_CONTROL_0), Err(Error::AccessViolation));
    assert!(pad.bus().ops().is_empty(), "no transaction may reach the bus");
  }

  #[test]
  fn write_of_read_only_register_makes_no_transport_call() {
    let mut pad = device(MockBus::new());
    assert_eq!(pad.write_register(reg::NUM_FINGERS, 1), Err(Error::AccessViolation));
    assert!(pad.bus().ops().is_empty());
  }

  #[test]
  fn unsupported_width_is_rejected_before_the_bus() {
    let mut pad = device(MockBus::new());
    let wide = reg::Register::ad_hoc(0x0100, 4, reg::Encoding::Unsigned);
    assert_eq!(pad.write_register(wide, 0), Err(Error::UnsupportedWidth(4)));
    assert_eq!(pad.read_register(reg::Register::UNKNOWN), Err(Error::UnsupportedWidth(0)));
    let narrow_signed = reg::Register::ad_hoc(0x0100, 1, reg::Encoding::Signed);
    assert_eq!(pad.read_register(narrow_signed), Err(Error::UnsupportedWidth(1)));
    assert!(pad.bus().ops().is_empty());
  }

  #[test]
  fn close_window_writes_the_sentinel() {
    let mut pad = device(MockBus::new());
    pad.close_window().expect("close");
    assert_eq!(pad.bus().ops(), &[BusOp::Write { addr: 0x74, bytes: vec![0xEE, 0xEE, 0x00] }]);
  }
}
