pub mod common;
pub mod devfile;
pub mod page;
pub mod persisted;
pub mod user;
pub mod user_context;

pub use common::*;
pub use devfile::*;
pub use page::*;
pub use persisted::*;
pub use user::*;
pub use user_context::*;
