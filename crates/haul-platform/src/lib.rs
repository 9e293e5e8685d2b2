//! Platform helpers: locating the user's home and the per-application
//! directory beneath it.

pub mod dir;
mod error;

pub use dir::{app_dir_name, app_home, app_home_in, user_home};
pub use error::{Error, Result};
