//! Edge-event delivery from interrupt context.
//!
//! Button interrupts produce [`ToggleTarget`] values; the controller drains
//! them at the start of each poll. Every queue access is one short critical
//! section, so the handlers stay indivisible and the polling loop never
//! observes a half-applied toggle. This queue is the only value the crate
//! shares across contexts.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::mode::ToggleTarget;

/// Error returned when pushing onto a full queue; carries the event back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFullError(pub ToggleTarget);

/// Bounded queue of pending toggle events.
///
/// Construction is const and all access goes through critical sections, so
/// a `static` queue can be shared between interrupt handlers and the loop:
///
/// ```ignore
/// static EVENTS: EventQueue<4> = EventQueue::new();
///
/// // interrupt handler
/// let _ = EVENTS.sender().send(ToggleTarget::RedOnly);
///
/// // main loop
/// let controller = Controller::new(lamp, sink, dial, EVENTS.receiver(), &config, now);
/// ```
pub struct EventQueue<const N: usize> {
    inner: Mutex<RefCell<Deque<ToggleTarget, N>>>,
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for interrupt handlers. Copyable; producers may share it.
    pub const fn sender(&self) -> EventSender<'_, N> {
        EventSender { queue: self }
    }

    /// Handle for the polling loop.
    pub const fn receiver(&self) -> EventReceiver<'_, N> {
        EventReceiver { queue: self }
    }

    fn try_send(&self, event: ToggleTarget) -> Result<(), QueueFullError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(event).map_err(QueueFullError)
        })
    }

    fn try_receive(&self) -> Option<ToggleTarget> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle for an [`EventQueue`].
#[derive(Clone, Copy)]
pub struct EventSender<'a, const N: usize> {
    queue: &'a EventQueue<N>,
}

impl<const N: usize> EventSender<'_, N> {
    /// Push one event. Hands it back if the queue is full.
    pub fn send(&self, event: ToggleTarget) -> Result<(), QueueFullError> {
        self.queue.try_send(event)
    }
}

/// Consumer handle for an [`EventQueue`].
#[derive(Clone, Copy)]
pub struct EventReceiver<'a, const N: usize> {
    queue: &'a EventQueue<N>,
}

impl<const N: usize> EventReceiver<'_, N> {
    /// Pop the oldest pending event, if any.
    pub fn receive(&self) -> Option<ToggleTarget> {
        self.queue.try_receive()
    }
}
