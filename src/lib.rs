//! School Performance Panel - client core
//!
//! Session lifecycle, authenticated request pipeline and REST service clients
//! for the School Performance Panel front end, usable from the browser (WASM)
//! and from native tools.

pub mod core;
pub mod ui;
