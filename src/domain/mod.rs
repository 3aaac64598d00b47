// Domain layer - Core editing-session logic

pub mod errors;
pub mod model;
pub mod rules;
pub mod session;
