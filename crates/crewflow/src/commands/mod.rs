pub mod apply;
pub mod plan;
pub mod rm;
pub mod status;
pub mod validate;
