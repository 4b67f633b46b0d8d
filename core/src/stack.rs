use core::fmt;

use crate::values::Value;

/// The data stack.
///
/// Path evaluation pushes pending refinements here and argument fulfillment
/// pops them. The maximum size is only enforced in debug builds, to catch
/// runaway pushes during development.
pub struct DataStack {
    items: Vec<Value>,
    max_size: usize,
}

impl DataStack {
    /// Creates a new stack with the specified maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::with_capacity(max_size.min(64)),
            max_size,
        }
    }

    /// Pushes a value onto the stack.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if the stack is already at maximum capacity.
    #[inline]
    pub fn push(&mut self, value: Value) {
        debug_assert!(
            self.items.len() < self.max_size,
            "Stack overflow: attempted to push beyond maximum size of {}",
            self.max_size
        );
        self.items.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    #[inline]
    pub fn top(&self) -> Option<&Value> {
        self.items.last()
    }

    /// Stack pointer: the number of values on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.items.get(position)
    }

    /// Drops everything above `len`.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Values from `from` to the top, bottom first.
    pub fn above(&self, from: usize) -> &[Value] {
        self.items.get(from..).unwrap_or(&[])
    }
}

impl fmt::Debug for DataStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStack")
            .field("len", &self.items.len())
            .field("max_size", &self.max_size)
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = DataStack::new(10);
        stack.push(Value::integer(1));
        stack.push(Value::integer(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().and_then(|v| v.as_integer()), Some(2));
        assert_eq!(stack.top().and_then(|v| v.as_integer()), Some(1));
    }

    #[test]
    fn test_truncate_and_above() {
        let mut stack = DataStack::new(10);
        for i in 0..5 {
            stack.push(Value::integer(i));
        }
        let above: Vec<_> = stack.above(3).iter().filter_map(Value::as_integer).collect();
        assert_eq!(above, vec![3, 4]);
        stack.truncate(2);
        assert_eq!(stack.len(), 2);
        assert!(stack.above(5).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Stack overflow")]
    fn test_overflow_panics_in_debug() {
        let mut stack = DataStack::new(1);
        stack.push(Value::blank());
        stack.push(Value::blank());
    }
}
