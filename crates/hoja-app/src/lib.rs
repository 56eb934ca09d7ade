// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod grid;
pub mod ids;
pub mod log;
pub mod model;
pub mod state;
pub mod summary;

pub use grid::*;
pub use ids::*;
pub use log::*;
pub use model::*;
pub use state::*;
pub use summary::*;
