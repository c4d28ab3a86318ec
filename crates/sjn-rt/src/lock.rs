// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Readers-writers lock guarding the shared resource.
//!
//! Counts readers and a writer flag behind one mutex; blocked acquirers
//! sleep on a condvar. A writer waiting for readers to drain does not stop
//! new readers from joining the session (reader preference).

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::LockError;
use crate::request::Mode;

#[derive(Debug)]
struct LockState {
    active_readers: usize,
    writer_held: bool,
    interrupted: bool,
}

impl LockState {
    fn check(&self) {
        debug_assert!(
            !(self.writer_held && self.active_readers > 0),
            "writer and {} reader(s) hold the lock together",
            self.active_readers
        );
    }
}

/// Point-in-time view of the lock, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockSnapshot {
    pub active_readers: usize,
    pub writer_held: bool,
}

impl LockSnapshot {
    pub fn is_free(&self) -> bool {
        self.active_readers == 0 && !self.writer_held
    }
}

/// Shared for readers, exclusive for a writer, never both.
pub struct SharedResourceLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl SharedResourceLock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState {
                active_readers: 0,
                writer_held: false,
                interrupted: false,
            }),
            released: Condvar::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, LockState>) -> MutexGuard<'a, LockState> {
        self.released
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the read session. Waits only while a writer holds the lock.
    pub fn acquire_read(&self) -> Result<(), LockError> {
        self.acquire_gated(Mode::Read, || true).map(|_| ())
    }

    pub fn release_read(&self) -> Result<(), LockError> {
        let mut state = self.state();
        if state.active_readers == 0 {
            return Err(LockError::NotHeld(Mode::Read));
        }
        state.active_readers -= 1;
        let drained = state.active_readers == 0;
        drop(state);
        if drained {
            self.released.notify_all();
        }
        Ok(())
    }

    /// Take exclusive possession once no reader or writer is active.
    pub fn acquire_write(&self) -> Result<(), LockError> {
        self.acquire_gated(Mode::Write, || true).map(|_| ())
    }

    /// Acquire in `mode`, but only while `eligible` holds.
    ///
    /// `eligible` is checked before the first attempt and after every
    /// wake-up. Returns `Ok(false)` without taking the lock as soon as it
    /// fails. It runs under the lock's mutex, so it must not call back into
    /// this lock.
    pub fn acquire_gated<G: Fn() -> bool>(
        &self,
        mode: Mode,
        eligible: G,
    ) -> Result<bool, LockError> {
        let mut state = self.state();
        loop {
            if state.interrupted {
                return Err(LockError::Interrupted);
            }
            if !eligible() {
                return Ok(false);
            }
            let free = match mode {
                // The first reader in is what keeps writers out; later ones ride along.
                Mode::Read => !state.writer_held,
                Mode::Write => state.active_readers == 0 && !state.writer_held,
            };
            if free {
                break;
            }
            state = self.wait(state);
        }
        match mode {
            Mode::Read => state.active_readers += 1,
            Mode::Write => state.writer_held = true,
        }
        state.check();
        Ok(true)
    }

    pub fn release_write(&self) -> Result<(), LockError> {
        let mut state = self.state();
        if !state.writer_held {
            return Err(LockError::NotHeld(Mode::Write));
        }
        state.writer_held = false;
        drop(state);
        self.released.notify_all();
        Ok(())
    }

    pub fn acquire(&self, mode: Mode) -> Result<(), LockError> {
        match mode {
            Mode::Read => self.acquire_read(),
            Mode::Write => self.acquire_write(),
        }
    }

    pub fn release(&self, mode: Mode) -> Result<(), LockError> {
        match mode {
            Mode::Read => self.release_read(),
            Mode::Write => self.release_write(),
        }
    }

    /// Run `f` inside a read session. Released even if `f` unwinds.
    pub fn with_read<R, F: FnOnce() -> R>(&self, f: F) -> Result<R, LockError> {
        self.with(Mode::Read, f)
    }

    /// Run `f` with exclusive access. Released even if `f` unwinds.
    pub fn with_write<R, F: FnOnce() -> R>(&self, f: F) -> Result<R, LockError> {
        self.with(Mode::Write, f)
    }

    fn with<R, F: FnOnce() -> R>(&self, mode: Mode, f: F) -> Result<R, LockError> {
        self.acquire(mode)?;
        let _held = Held { lock: self, mode };
        Ok(f())
    }

    pub fn snapshot(&self) -> LockSnapshot {
        let state = self.state();
        LockSnapshot {
            active_readers: state.active_readers,
            writer_held: state.writer_held,
        }
    }

    /// Fail every pending and future acquisition. Holders may still release.
    pub fn shutdown(&self) {
        self.state().interrupted = true;
        self.released.notify_all();
    }
}

impl Default for SharedResourceLock {
    fn default() -> Self {
        Self::new()
    }
}

struct Held<'a> {
    lock: &'a SharedResourceLock,
    mode: Mode,
}

impl Drop for Held<'_> {
    fn drop(&mut self) {
        // Acquired by `with`, so the release cannot find the lock unheld.
        let _ = self.lock.release(self.mode);
    }
}
