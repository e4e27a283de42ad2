//! Tradegate - admin, key registration proxy and socket discovery endpoints
//!
//! This crate re-exports the pieces an embedding application needs.
//!
//! # Example
//!
//! ```ignore
//! use tradegate::{build_router, AppState};
//!
//! let app = build_router(Arc::new(state));
//! axum::serve(listener, app).await?;
//! ```

// Re-export server types
pub use tradegate_server::{build_router, AppState};
pub use tradegate_server::auth::{AuthState, SessionResolver};
pub use tradegate_server::proxy::RegistrationProxy;
pub use tradegate_server::store::{SessionStore, UserStore};

// Re-export core types that external applications may need
pub use tradegate_core::errors::GateError;
pub use tradegate_core::models::{Session, SessionIdentity, UserRecord};
pub use tradegate_core::protocol::{ErrorBody, SocketInfo, UsersResponse};
pub use tradegate_core::GateResult;
