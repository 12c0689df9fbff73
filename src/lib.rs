//! Simulation core for an autonomous excavation machine (“quarry”) operating in a
//! world of cubical blocks.
//!
//! The quarry builds and continuously self-repairs a rectangular frame, scans a
//! bounded volume in a deterministic order removing eligible material one cell at a
//! time, and spends a rate-limited internal energy budget to do both. It is
//! resumable after a full save/reload, and replicates a render-relevant subset of
//! its state to observers over a lossy periodic channel.
//!
//! This crate contains only the task/state-machine engine:
//!
//! * [`math`]: integer cell geometry ([`math::Volume`], [`math::Cube`]) and the
//!   continuous boxes used for collision ([`math::Aab`]).
//! * [`scan`]: the restartable cursor that visits every cell of the mining volume
//!   in one fixed order.
//! * [`power`]: the bounded energy reservoir and its withdrawal throttle.
//! * [`task`]: the three kinds of power-gated work the machine performs.
//! * [`quarry`]: the controller that wires all of the above together each step.
//! * [`world`]: the trait boundary to the block/world storage substrate, which
//!   this crate deliberately does not implement.
//! * [`save`]: the durable serialization of a controller's complete state.
//! * [`sync`]: the lossy replication snapshot and the observer-side
//!   interpolation state.
//!
//! The world substrate, energy transfer wiring, chunk keep-alive bookkeeping, and
//! all rendering are external collaborators; see [`world`] for the boundary.
//!
//! A single authoritative thread drives the controller one discrete step at a
//! time. Nothing in this crate blocks, and no type here is shared across threads
//! by the crate itself.

#![forbid(unsafe_code)]

pub mod math;
pub mod power;
pub mod quarry;
pub mod save;
pub mod scan;
pub mod sync;
pub mod task;
pub mod world;
