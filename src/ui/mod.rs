//! Reactive bindings for the view layer

pub mod auth;
