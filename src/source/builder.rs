use crate::pipeline::Pipeline;
use crate::stream::{Element, Stream};

/// Accumulates values and turns them into a stream once.
///
/// ```
/// use ironstream::*;
///
/// # fn main() -> anyhow::Result<()> {
/// let p = Pipeline::default();
/// let mut b = StreamBuilder::new().add(1).add(2);
/// b.accept(3);
/// assert_eq!(b.build(&p).to_vec()?, vec![1, 2, 3]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StreamBuilder<T> {
    items: Vec<T>,
}

impl<T> Default for StreamBuilder<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Element> StreamBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, chaining style.
    #[must_use]
    pub fn add(mut self, value: T) -> Self {
        self.items.push(value);
        self
    }

    /// Append a value in place.
    pub fn accept(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the builder and open a source over its values.
    pub fn build(self, p: &Pipeline) -> Stream<T> {
        super::from_vec(p, self.items)
    }
}
