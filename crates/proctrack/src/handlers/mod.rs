//! HTTP request handlers.

mod error;
mod health;
mod processes;
mod version;

pub use error::ApiError;
pub use health::{livez, root};
pub use processes::{create_process, delete_process, get_all, get_single};
pub use version::version;
