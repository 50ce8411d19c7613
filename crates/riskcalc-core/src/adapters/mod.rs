//! Price source adapters.
//!
//! | Adapter | Provider | Use |
//! |---------|----------|-----|
//! | [`YahooSource`] | `yahoo` | Live daily closes from the v8 chart API |
//! | [`SyntheticSource`] | `synthetic` | Deterministic offline closes (`--mock`) |
//! | [`InMemorySource`] | `memory` | Fixtures for tests |

mod memory;
mod synthetic;
mod yahoo;

pub use memory::InMemorySource;
pub use synthetic::SyntheticSource;
pub use yahoo::{YahooAuth, YahooSource};
