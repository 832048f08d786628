pub mod auth_dto;
pub mod auth_service;

pub use auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
pub use auth_service::AuthService;
