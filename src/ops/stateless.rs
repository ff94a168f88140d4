use crate::link::{OrderedItem, Puller};
use crate::pipeline::Pipeline;
use crate::stream::{Element, Stream};

impl<T: Element> Stream<T> {
    /// Fan out to [`Pipeline::parallelism`] workers. Subsequent per-item
    /// operators run one replica per worker. No-op on a parallel stream.
    pub fn parallel(self) -> Self {
        if self.parallel {
            return self;
        }
        let workers = self.pipeline.parallelism();
        self.chain_with("parallel", workers, true, |w| w.relay(Some))
    }

    /// Keep only the items matching `predicate`.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.chain("filter", move |w| {
            w.relay(|item| predicate(&item.value).then_some(item))
        })
    }

    /// Transform each item. Sequence numbers are kept.
    pub fn map<R, F>(self, f: F) -> Stream<R>
    where
        R: Element,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.chain("map", move |w| w.relay(|item| Some(item.map(&f))))
    }

    /// Run `action` on each item as it passes through.
    pub fn peek<F>(self, action: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.chain("peek", move |w| {
            w.relay(|item| {
                action(&item.value);
                Some(item)
            })
        })
    }

    /// Replace each item with the contents of the stream `f` returns.
    ///
    /// Nested items are renumbered so the output keeps a single increasing
    /// sequence: each nested stream starts right after the largest sequence
    /// number the previous one produced. Nested streams should be built on
    /// the same pipeline so a failure inside them aborts this one too.
    pub fn flat_map<R, F>(self, f: F) -> Stream<R>
    where
        R: Element,
        F: Fn(T) -> Stream<R> + Send + 'static,
    {
        self.chain_single("flat_map", move |w| {
            let mut nested: Option<(Pipeline, Puller<R>)> = None;
            let mut offset = 0u64;
            let mut high: Option<u64> = None;
            while w.next_request() {
                let out = loop {
                    if let Some((_, inner)) = nested.as_ref() {
                        if let Some(item) = w.pull_from(inner) {
                            high = high.max(Some(item.seq));
                            break Some(OrderedItem::new(offset + item.seq, item.value));
                        }
                        if let Some((inner_pipeline, _)) = nested.take() {
                            if let Some(err) = w.foreign_fault(&inner_pipeline) {
                                return Err(err.context("nested stream failed"));
                            }
                        }
                        if let Some(h) = high.take() {
                            offset += h + 1;
                        }
                    }
                    match w.pull() {
                        Some(item) => {
                            let stream = f(item.value);
                            nested = Some((stream.pipeline.clone(), stream.into_puller()));
                        }
                        None => break None,
                    }
                };
                let Some(item) = out else {
                    break;
                };
                if !w.emit(item) {
                    break;
                }
            }
            Ok(())
        })
    }
}
