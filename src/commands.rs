pub mod catalog;
pub mod expand;
pub mod flatten;
pub mod init;
pub mod migrate;
pub mod store;
pub mod tag;
