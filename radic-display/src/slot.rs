//! Single-slot, latest-wins handoff between one producer side and one
//! consumer thread.
//!
//! Unlike a queue, a [`FrameSlot`] never holds more than one value: a new
//! send replaces whatever the consumer has not taken yet. The consumer
//! blocks in [`recv`](FrameSlot::recv) until a value arrives, it is woken
//! explicitly, or the slot is closed.

use parking_lot::{Condvar, Mutex};

/// Outcome of a blocking receive.
#[derive(Debug, PartialEq, Eq)]
pub enum Recv<T> {
    Value(T),
    /// Woken by [`FrameSlot::wake`] without a new value.
    Woken,
    Closed,
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    woken: bool,
    closed: bool,
}

#[derive(Debug)]
pub struct FrameSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                woken: false,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Store `value`, returning the displaced one. Once closed the value is
    /// handed back as `Err`.
    pub fn send(&self, value: T) -> Result<Option<T>, T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(value);
        }
        let displaced = state.value.replace(value);
        drop(state);
        self.ready.notify_one();
        Ok(displaced)
    }

    /// Store the value built by `f` from the displaced one. `f` runs under
    /// the slot lock and is not called once the slot is closed.
    pub fn send_with<F>(&self, f: F) -> bool
    where
        F: FnOnce(Option<T>) -> T,
    {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        let displaced = state.value.take();
        state.value = Some(f(displaced));
        drop(state);
        self.ready.notify_one();
        true
    }

    /// Wake the receiver without a value.
    pub fn wake(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.woken = true;
        drop(state);
        self.ready.notify_one();
    }

    /// Block until a value, a wake or close.
    ///
    /// Close wins over a pending value; spurious condvar wakeups loop.
    pub fn recv(&self) -> Recv<T> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Recv::Closed;
            }
            if let Some(value) = state.value.take() {
                state.woken = false;
                return Recv::Value(value);
            }
            if state.woken {
                state.woken = false;
                return Recv::Woken;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is pending.
    pub fn try_recv(&self) -> Option<Recv<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Some(Recv::Closed);
        }
        if let Some(value) = state.value.take() {
            state.woken = false;
            return Some(Recv::Value(value));
        }
        if state.woken {
            state.woken = false;
            return Some(Recv::Woken);
        }
        None
    }

    /// Close the slot, drop any pending value and wake the receiver.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.value = None;
        drop(state);
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_latest_value_wins() {
        let slot = FrameSlot::new();
        assert_eq!(slot.send(1), Ok(None));
        assert_eq!(slot.send(2), Ok(Some(1)));
        assert_eq!(slot.send(3), Ok(Some(2)));
        assert_eq!(slot.recv(), Recv::Value(3));
        assert!(!slot.has_pending());
    }

    #[test]
    fn test_send_with_merges() {
        let slot = FrameSlot::new();
        slot.send(vec![1]).unwrap();
        assert!(slot.send_with(|old| {
            let mut v = old.unwrap_or_default();
            v.push(2);
            v
        }));
        assert_eq!(slot.try_recv(), Some(Recv::Value(vec![1, 2])));
        assert_eq!(slot.try_recv(), None);
    }

    #[test]
    fn test_wake_without_value() {
        let slot: FrameSlot<u8> = FrameSlot::new();
        slot.wake();
        assert_eq!(slot.recv(), Recv::Woken);
        assert_eq!(slot.try_recv(), None);
    }

    #[test]
    fn test_close_rejects_and_wins() {
        let slot = FrameSlot::new();
        slot.send(1).unwrap();
        slot.close();
        assert_eq!(slot.recv(), Recv::Closed);
        assert_eq!(slot.send(2), Err(2));
        assert!(!slot.send_with(|_| 3));
        assert!(slot.is_closed());
    }

    #[test]
    fn test_close_unblocks_waiting_receiver() {
        let slot: Arc<FrameSlot<u32>> = Arc::new(FrameSlot::new());
        let receiver = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.recv())
        };
        thread::sleep(Duration::from_millis(20));
        slot.close();
        assert_eq!(receiver.join().unwrap(), Recv::Closed);
    }
}
