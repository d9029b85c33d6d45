//! Bitfield registers carried in the touch frame head, plus the XY config
//! bitfield used to orient the axes.

/// Single-finger gesture flags (register 0x000D, frame byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[packbits::pack(bytes = 1)]
pub struct GestureFlags {
  pub tap: bool,
  pub press_and_hold: bool,
  pub swipe_x_positive: bool,
  pub swipe_x_negative: bool,
  pub swipe_y_positive: bool,
  pub swipe_y_negative: bool,
}

impl GestureFlags {
  pub const fn none() -> Self {
    Self {
      tap: false,
      press_and_hold: false,
      swipe_x_positive: false,
      swipe_x_negative: false,
      swipe_y_positive: false,
      swipe_y_negative: false,
    }
  }

  /// `true` when any single-finger gesture fired this cycle.
  pub const fn any(&self) -> bool {
    self.tap
      || self.press_and_hold
      || self.swipe_x_positive
      || self.swipe_x_negative
      || self.swipe_y_positive
      || self.swipe_y_negative
  }
}

/// Multi-finger gesture flags (register 0x000E, frame byte 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[packbits::pack(bytes = 1)]
pub struct MultiGestureFlags {
  pub two_finger_tap: bool,
  pub scroll: bool,
  pub zoom: bool,
}

impl MultiGestureFlags {
  pub const fn none() -> Self {
    Self { two_finger_tap: false, scroll: false, zoom: false }
  }

  /// `true` when any multi-finger gesture fired this cycle.
  pub const fn any(&self) -> bool {
    self.two_finger_tap || self.scroll || self.zoom
  }
}

/// System status flags (register 0x0010, frame byte 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[packbits::pack(bytes = 1)]
pub struct SystemFlags {
  /// Finger movement was detected on the trackpad surface.
  pub movement: bool,
  /// A palm-sized contact is being rejected.
  pub palm_detect: bool,
  /// More simultaneous contacts than the device can track; the finger
  /// payload is unusable this cycle.
  pub too_many_fingers: bool,
  /// The previous cycle overran the configured report rate.
  pub report_rate_missed: bool,
  pub snap_toggle: bool,
  pub switch_state: bool,
}

impl SystemFlags {
  pub const fn none() -> Self {
    Self {
      movement: false,
      palm_detect: false,
      too_many_fingers: false,
      report_rate_missed: false,
      snap_toggle: false,
      switch_state: false,
    }
  }
}

/// Axis orientation and palm rejection config (register 0x0669).
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[packbits::pack(bytes = 1)]
pub struct AxisConfig {
  pub flip_x: bool,
  pub flip_y: bool,
  pub swap_axes: bool,
  pub palm_reject: bool,
}

impl AxisConfig {
  pub const fn new(flip_x: bool, flip_y: bool, swap_axes: bool, palm_reject: bool) -> Self {
    Self { flip_x, flip_y, swap_axes, palm_reject }
  }

  pub const fn disabled() -> Self {
    Self::new(false, false, false, false)
  }

  pub(crate) fn bits(self) -> u8 {
    let [bits]: [u8; 1] = self.try_into().unwrap_or([0]);
    bits
  }
}

impl Default for AxisConfig {
  fn default() -> Self {
    Self::disabled()
  }
}

pub(crate) fn gesture_flags(byte: u8) -> GestureFlags {
  GestureFlags::try_from([byte]).unwrap_or_else(|_| GestureFlags::none())
}

pub(crate) fn multi_gesture_flags(byte: u8) -> MultiGestureFlags {
  MultiGestureFlags::try_from([byte]).unwrap_or_else(|_| MultiGestureFlags::none())
}

pub(crate) fn system_flags(byte: u8) -> SystemFlags {
  SystemFlags::try_from([byte]).unwrap_or_else(|_| SystemFlags::none())
}
