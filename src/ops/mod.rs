//! Intermediate operators on [`Stream`](crate::Stream).
//!
//! Each operator appends one stage and returns the new stream handle:
//! - `stateless`: `parallel`, `filter`, `map`, `peek`, `flat_map`
//! - `ordered`: `sorted`, `sorted_by`, `distinct`
//! - `positional`: `limit`, `skip`

mod ordered;
mod positional;
mod stateless;
