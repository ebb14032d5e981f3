/// Sequential id allocator.
///
/// Ids are never reused within one allocator, so a stale id can be detected
/// instead of silently aliasing a newer registration.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_raw(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Handle returned when registering an event listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl ListenerId {
    pub fn next(ids: &mut IdAllocator) -> Self {
        ListenerId(ids.next_raw())
    }
}
