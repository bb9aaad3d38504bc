pub mod admin;
pub mod attendance;
pub mod document;
pub mod leave;
pub mod role;
pub mod user;
