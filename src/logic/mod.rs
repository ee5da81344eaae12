pub mod cascade;
pub mod content;
pub mod devfile_manager;
pub mod integrity;
pub mod user_devfile_manager;
pub mod workspace;

pub use cascade::*;
pub use content::{
    CachedFileContentProvider, ContentError, FileContentProvider, UrlFileContentProvider,
};
pub use devfile_manager::*;
pub use user_devfile_manager::*;
pub use workspace::*;
