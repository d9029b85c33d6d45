//! Deferred register commands.
//!
//! The device only accepts register traffic inside a communication window,
//! and windows open on the device's schedule. Client code therefore queues
//! its reads and writes at any time; [`Iqs550::poll`](crate::Iqs550::poll)
//! drains both queues exactly once per window, writes to empty first and
//! reads after the bulk frame, executing each command and its completion
//! callback synchronously, in enqueue order.
//!
//! Callbacks receive the queues again so a completion handler can schedule a
//! follow-up command; anything enqueued while a drain is running is executed
//! in the same drain pass.

use alloc::boxed::Box;

use heapless::Deque;

use crate::reg::{Encoding, Register};
use crate::Error;

/// Capacity of each direction's queue. Commands beyond this bounce with
/// [`Error::QueueFull`].
pub const QUEUE_DEPTH: usize = 16;

/// Completion callback of a queued read: `(queues, register address, decoded
/// value or error)`.
pub type ReadCallback = Box<dyn FnOnce(&mut CommandQueues, u16, Result<i32, Error>)>;

/// Completion callback of a queued write: `(queues, register address,
/// outcome)`.
pub type WriteCallback = Box<dyn FnOnce(&mut CommandQueues, u16, Result<(), Error>)>;

pub(crate) struct ReadCommand {
  pub register: Register,
  pub callback: ReadCallback,
}

pub(crate) struct WriteCommand {
  pub register: Register,
  pub value: i32,
  pub callback: Option<WriteCallback>,
}

/// The two per-device FIFO queues of deferred commands.
///
/// Each command is executed exactly once during a window drain, and its
/// callback is invoked exactly once, with the transport result, before the
/// next command is dequeued. Queue order is the only ordering guarantee.
#[derive(Default)]
pub struct CommandQueues {
  writes: Deque<WriteCommand, QUEUE_DEPTH>,
  reads: Deque<ReadCommand, QUEUE_DEPTH>,
}

impl CommandQueues {
  pub(crate) const fn new() -> Self {
    Self { writes: Deque::new(), reads: Deque::new() }
  }

  /// Queue a read of `register`. The callback runs during the next window
  /// drain, after the mandatory bulk frame read.
  pub fn queue_read(
    &mut self,
    register: Register,
    callback: impl FnOnce(&mut CommandQueues, u16, Result<i32, Error>) + 'static,
  ) -> Result<(), Error> {
    self
      .reads
      .push_back(ReadCommand { register, callback: Box::new(callback) })
      .map_err(|_| Error::QueueFull)
  }

  /// Queue a read of an address that is not in the catalog. The descriptor is
  /// resolved here, once; it never changes after enqueue.
  pub fn queue_read_at(
    &mut self,
    address: u16,
    width: u8,
    encoding: Encoding,
    callback: impl FnOnce(&mut CommandQueues, u16, Result<i32, Error>) + 'static,
  ) -> Result<(), Error> {
    self.queue_read(Register::ad_hoc(address, width, encoding), callback)
  }

  /// Queue a write of `value` to `register`, without completion notification.
  pub fn queue_write(&mut self, register: Register, value: i32) -> Result<(), Error> {
    self.writes.push_back(WriteCommand { register, value, callback: None }).map_err(|_| Error::QueueFull)
  }

  /// Queue a write of `value` to `register`; the callback runs right after
  /// the write lands (or fails), before the next queued command executes.
  pub fn queue_write_with(
    &mut self,
    register: Register,
    value: i32,
    callback: impl FnOnce(&mut CommandQueues, u16, Result<(), Error>) + 'static,
  ) -> Result<(), Error> {
    self
      .writes
      .push_back(WriteCommand { register, value, callback: Some(Box::new(callback)) })
      .map_err(|_| Error::QueueFull)
  }

  /// Queue a write to an address that is not in the catalog.
  pub fn queue_write_at(&mut self, address: u16, width: u8, value: i32) -> Result<(), Error> {
    self.queue_write(Register::ad_hoc(address, width, Encoding::Unsigned), value)
  }

  pub fn pending_writes(&self) -> usize {
    self.writes.len()
  }

  pub fn pending_reads(&self) -> usize {
    self.reads.len()
  }

  pub fn is_empty(&self) -> bool {
    self.writes.is_empty() && self.reads.is_empty()
  }

  pub(crate) fn pop_write(&mut self) -> Option<WriteCommand> {
    self.writes.pop_front()
  }

  pub(crate) fn pop_read(&mut self) -> Option<ReadCommand> {
    self.reads.pop_front()
  }
}
