//! # Voxel World Entry Point
//!
//! Runs the headless streaming demo from the library's `run()` function.
//! Set `VOXEL_WORLD_CONFIG` to a JSON file to override the default world, and
//! `RUST_LOG` to change log verbosity.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
