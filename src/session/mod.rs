pub mod session_models;
pub mod session_store;

pub use session_models::{Session, User};
pub use session_store::SessionStore;
