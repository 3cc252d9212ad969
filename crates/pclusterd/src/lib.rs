//! pclusterd library - exposes the poller for testing.

pub mod poller;

pub use poller::{next_sleep, PollSummary, RegionPoller};
