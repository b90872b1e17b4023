//! One module per subcommand.

pub mod change_pin;
pub mod completions;
pub mod delete;
pub mod export;
pub mod get;
pub mod init;
pub mod list;
pub mod set;
pub mod status;
