pub mod apply;
pub mod destroy;
pub mod events;
pub mod plan;
pub mod show;
pub mod validate;
