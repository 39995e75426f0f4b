//! Worker-pool fan-out/fan-in engine.
//!
//! This module contains the machinery that executes one traffic job's request
//! batch: a fixed set of worker lanes fed round-robin by the dispatcher, each
//! lane consumed by one worker task until the lane is closed and its drain is
//! acknowledged.
//!
//! ## Structure
//!
//! - [`manager`] - The [`LanePool`](manager::LanePool): lane creation,
//!   round-robin dispatch, ordered drain.
//! - [`worker`] - The per-lane worker loop.
//! - [`fetch`] - The [`Fetch`](fetch::Fetch) seam between the engine and the
//!   HTTP transport, and its production `reqwest` implementation.

pub mod fetch;
pub mod manager;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;
