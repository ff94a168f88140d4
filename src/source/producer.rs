use anyhow::Result;

/// Producer side of a source stage.
///
/// `produce` is called once per downstream request; `Ok(None)` ends the
/// stream and `Err` aborts the pipeline.
pub trait Producer<T>: Send + 'static {
    fn produce(&mut self) -> Result<Option<T>>;
}

/// Producer over any iterator.
pub struct IterProducer<I>(pub I);

impl<I> Producer<I::Item> for IterProducer<I>
where
    I: Iterator + Send + 'static,
{
    fn produce(&mut self) -> Result<Option<I::Item>> {
        Ok(self.0.next())
    }
}

/// Infinite producer calling a supplier for every item.
pub struct Generate<F>(pub F);

impl<T, F> Producer<T> for Generate<F>
where
    F: FnMut() -> T + Send + 'static,
{
    fn produce(&mut self) -> Result<Option<T>> {
        Ok(Some((self.0)()))
    }
}

/// `seed, step(seed), step(step(seed)), ...`
pub struct Iterate<T, F> {
    next: Option<T>,
    step: F,
}

impl<T, F> Iterate<T, F> {
    pub fn new(seed: T, step: F) -> Self {
        Self {
            next: Some(seed),
            step,
        }
    }
}

impl<T, F> Producer<T> for Iterate<T, F>
where
    T: Send + 'static,
    F: FnMut(&T) -> T + Send + 'static,
{
    fn produce(&mut self) -> Result<Option<T>> {
        let Some(current) = self.next.take() else {
            return Ok(None);
        };
        self.next = Some((self.step)(&current));
        Ok(Some(current))
    }
}

/// Like [`Iterate`], ending at the first value that fails `has_next`.
pub struct IterateWhile<T, P, F> {
    next: Option<T>,
    has_next: P,
    step: F,
}

impl<T, P, F> IterateWhile<T, P, F> {
    pub fn new(seed: T, has_next: P, step: F) -> Self {
        Self {
            next: Some(seed),
            has_next,
            step,
        }
    }
}

impl<T, P, F> Producer<T> for IterateWhile<T, P, F>
where
    T: Send + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
    F: FnMut(&T) -> T + Send + 'static,
{
    fn produce(&mut self) -> Result<Option<T>> {
        let Some(current) = self.next.take() else {
            return Ok(None);
        };
        if !(self.has_next)(&current) {
            return Ok(None);
        }
        self.next = Some((self.step)(&current));
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T>(mut p: impl Producer<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(v) = p.produce().unwrap() {
            out.push(v);
        }
        out
    }

    #[test]
    fn iterate_while_stops_before_failing_value() {
        let p = IterateWhile::new(1u32, |x: &u32| *x < 100, |x: &u32| x * 3);
        assert_eq!(drain(p), vec![1, 3, 9, 27, 81]);
    }

    #[test]
    fn iterate_applies_step_lazily() {
        let mut p = Iterate::new(String::from("a"), |s: &String| format!("{s}a"));
        assert_eq!(p.produce().unwrap().as_deref(), Some("a"));
        assert_eq!(p.produce().unwrap().as_deref(), Some("aa"));
    }
}
