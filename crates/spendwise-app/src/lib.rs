// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod browser;
pub mod calendar;
pub mod editor;
pub mod forms;
pub mod gateway;
pub mod grouping;
pub mod ids;
pub mod modal;
pub mod model;

pub use browser::*;
pub use calendar::*;
pub use editor::*;
pub use forms::*;
pub use gateway::*;
pub use grouping::*;
pub use ids::*;
pub use modal::*;
pub use model::*;
