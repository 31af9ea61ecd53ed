//! Authentication UI module
//!
//! This module provides the reactive authentication context
//! for the School Performance Panel views.

mod context;

pub use context::{AuthContext, AuthState, provide_auth_context, use_auth_context};
