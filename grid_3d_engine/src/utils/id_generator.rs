/// Hands out monotonically increasing `i32` identifiers.
///
/// Unlike a slot allocator, identifiers are never recycled: a deleted
/// scene node's ID stays retired for the lifetime of the generator, so
/// an ID held by a caller can never start naming a different node.
///
/// # Example
///
/// ```ignore
/// let mut ids = IdGenerator::new();
/// let a = ids.next_id();  // 0
/// let b = ids.next_id();  // 1
/// ```
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: i32,
}

impl IdGenerator {
    /// Create a generator whose first ID is 0
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next ID
    pub fn next_id(&mut self) -> i32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// ID that the next call to `next_id` will return
    pub fn peek(&self) -> i32 {
        self.next
    }

    /// Number of IDs handed out so far
    pub fn issued(&self) -> usize {
        self.next as usize
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "id_generator_tests.rs"]
mod tests;
