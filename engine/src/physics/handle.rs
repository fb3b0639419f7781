//! Body handles and the allocator that hands them out.
//!
//! Handles are opaque, never reused while the allocator lives, and decoupled
//! from where a body is stored. The allocator is explicit state owned by
//! whoever creates bodies (usually [`crate::physics::world::PhysicsWorld`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a rigid body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Back-reference of a volume that is not owned by any body yet.
    pub const NONE: BodyHandle = BodyHandle(0);

    /// Wraps a raw handle value. Intended for callers that store handles
    /// externally (entity tables, network ids).
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw integer value of the handle.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for [`BodyHandle::NONE`].
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Monotonically increasing source of [`BodyHandle`]s, starting at 1.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u32,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    /// Creates an allocator whose first handle is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh handle and advances the counter.
    pub fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        handle
    }

    /// The handle the next call to [`Self::next_handle`] will return.
    pub fn peek(&self) -> BodyHandle {
        BodyHandle(self.next)
    }

    /// Sets the counter back to 1.
    ///
    /// Existing handles are not invalidated, so after a reset new bodies can
    /// collide with live ones. Only call this when no bodies from this
    /// allocator are alive (test setup, full world teardown).
    pub fn reset_counter(&mut self) {
        self.next = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_start_at_one_and_increase() {
        let mut handles = HandleAllocator::new();
        assert_eq!(handles.next_handle().raw(), 1);
        assert_eq!(handles.next_handle().raw(), 2);
        assert_eq!(handles.peek().raw(), 3);
    }

    #[test]
    fn test_reset_counter_restarts_at_one() {
        let mut handles = HandleAllocator::new();
        handles.next_handle();
        handles.next_handle();
        handles.reset_counter();
        assert_eq!(handles.next_handle(), BodyHandle::from_raw(1));
    }

    #[test]
    fn test_none_handle() {
        assert!(BodyHandle::NONE.is_none());
        assert!(!BodyHandle::from_raw(7).is_none());
        assert_eq!(BodyHandle::from_raw(7).to_string(), "body#7");
    }
}
