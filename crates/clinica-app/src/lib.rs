// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod backend;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod forms;
pub mod html;
pub mod ids;
pub mod model;
pub mod notify;
pub mod schema;
pub mod state;
pub mod stats;
pub mod view;

pub use backend::*;
pub use controller::*;
pub use debounce::*;
pub use error::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use notify::*;
pub use state::*;
pub use stats::*;
pub use view::*;
