use crate::stream::{Element, Stream};
use anyhow::Result;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, Ordering};

impl<T: Element> Stream<T> {
    /// Pull until some consumer sees an item for which `decide` holds.
    /// Every consumer checks the shared flag before each request.
    fn short_circuit<F>(self, decide: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Sync,
    {
        let found = AtomicBool::new(false);
        let n = self.workers;
        self.consume_seeded(vec![(); n], |c, ()| {
            while !found.load(Ordering::Acquire) {
                let Some(item) = c.pull() else {
                    break;
                };
                if decide(&item.value) {
                    found.store(true, Ordering::Release);
                }
            }
        })?;
        Ok(found.into_inner())
    }

    /// `true` if any item matches. `false` for an empty stream.
    pub fn any_match<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Sync,
    {
        self.short_circuit(predicate)
    }

    /// `true` if every item matches. `true` for an empty stream.
    pub fn all_match<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Sync,
    {
        Ok(!self.short_circuit(|v| !predicate(v))?)
    }

    /// `true` if no item matches. `true` for an empty stream.
    pub fn none_match<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool + Sync,
    {
        Ok(!self.short_circuit(predicate)?)
    }

    /// The first item in encounter order.
    ///
    /// A single consumer pulls one item. With one outstanding request, every
    /// parallel stage upstream serves it with one worker at a time, so items
    /// pass through in source order and the answer does not depend on
    /// scheduling. Stops after the first item, also on unbounded streams.
    pub fn find_first(self) -> Result<Option<T>> {
        let mut found = self.consume_seeded(vec![()], |c, ()| c.pull())?;
        Ok(found.pop().flatten().map(|item| item.value))
    }

    /// Any item, whichever a consumer sees first. Not deterministic on a
    /// parallel stream.
    pub fn find_any(self) -> Result<Option<T>> {
        let found = AtomicBool::new(false);
        let (slot, result) = bounded(1);
        let n = self.workers;
        self.consume_seeded(vec![(); n], |c, ()| {
            if found.load(Ordering::Acquire) {
                return;
            }
            if let Some(item) = c.pull() {
                if !found.swap(true, Ordering::AcqRel) {
                    let _ = slot.try_send(item.value);
                }
            }
        })?;
        Ok(result.try_recv().ok())
    }
}
