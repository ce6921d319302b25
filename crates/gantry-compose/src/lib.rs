//! # gantry-compose
//!
//! Normalized deployment descriptor model and the loader that produces it.
//!
//! Handles:
//! - **Model**: services, networks, volumes and their nested configuration.
//! - **Loader**: reading and merging YAML descriptors into the model.
//! - **Interpolate**: `${VAR}`-style substitution over descriptor values.
//! - **Dotenv**: reading `.env` files for interpolation.
//! - **Units**: duration, byte-size, and port-spec parsers.

mod de;
pub mod dotenv;
pub mod interpolate;
pub mod loader;
pub mod model;
pub mod units;

pub use loader::{LoadOptions, load, load_from_str};
pub use model::Project;
