use crate::stream::{Element, Stream};

impl<T: Element> Stream<T> {
    fn assert_positional(&self, op: &str) {
        assert!(
            !(self.ordered && self.workers > 1),
            "{op}() on an order-preserving parallel stream; call unordered() first"
        );
    }

    /// Forward at most `n` items, then stop pulling.
    ///
    /// # Panics
    ///
    /// Panics when applied to an order-preserving parallel stream.
    pub fn limit(self, n: usize) -> Self {
        self.assert_positional("limit");
        self.chain_single("limit", move |w| {
            let mut taken = 0;
            while taken < n && w.next_request() {
                let Some(item) = w.pull() else {
                    break;
                };
                taken += 1;
                if !w.emit(item) {
                    break;
                }
            }
            Ok(())
        })
    }

    /// Discard the first `n` items and forward the rest.
    ///
    /// # Panics
    ///
    /// Panics when applied to an order-preserving parallel stream.
    pub fn skip(self, n: usize) -> Self {
        self.assert_positional("skip");
        self.chain_single("skip", move |w| {
            let mut skipped = 0;
            w.relay(|item| {
                if skipped < n {
                    skipped += 1;
                    None
                } else {
                    Some(item)
                }
            })
        })
    }
}
