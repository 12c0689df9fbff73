//! Mathematical utilities: integer cell coordinates, axis-aligned boxes both
//! discrete ([`Volume`]) and continuous ([`Aab`]), and face directions.

mod aab;
pub use aab::*;
mod coord;
pub use coord::*;
mod cube;
pub use cube::Cube;
mod face;
pub use face::*;
mod volume;
pub use volume::*;
