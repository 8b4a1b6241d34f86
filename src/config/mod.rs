//! Configuration: file layout and operator settings

mod paths;
mod settings;

pub use paths::{Paths, BASE_DIR_ENV};
pub use settings::Settings;
