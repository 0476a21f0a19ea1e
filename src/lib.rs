pub mod arena;
pub(crate) mod book;
pub mod engine;
pub(crate) mod level;
pub(crate) mod macros;
pub mod order;
pub mod transaction;
