//! Key-addressed query cache for backend reads.
//!
//! Each cached entry is addressed by a [`QueryKey`]: a resource name plus the
//! exact, canonicalized query parameters used to fetch it. The cache gives
//! the console the read-side semantics the original client had:
//!
//! - a value younger than the cache's stale window is served without a fetch;
//! - concurrent readers of one key share a single in-flight request and its
//!   outcome (de-duplication), errors included;
//! - a mutation invalidates a whole resource so the next read fetches fresh;
//! - background pollers keep hot keys warm on a fixed interval.
//!
//! Consistency is deliberately eventual. A poller refresh, an
//! invalidation-triggered refetch and a user-initiated refetch for the same
//! key may race; whichever response resolves last overwrites the entry.
//! There is no sequence-number guard — last response wins, by design.
//!
//! Fetches run on spawned tasks, so a reader that goes away mid-request
//! (a dropped connection) cannot leave an entry stuck in-flight.

pub mod cache;
pub mod key;

pub use cache::{QueryCache, QueryError};
pub use key::QueryKey;
