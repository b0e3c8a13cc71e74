//! Records stored by the service and the request/response payloads built on them

pub mod slogan;
pub mod user;

pub use slogan::{CreateSloganRequest, Slogan, UserSlogansResponse};
pub use user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, RegisterResponse, User};
