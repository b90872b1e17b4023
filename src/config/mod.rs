//! Project configuration loaded from `.wpstack.toml`.

pub mod settings;

pub use settings::Settings;
