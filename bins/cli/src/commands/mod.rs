//! CLI command handlers.

pub mod config;
pub mod defer;
pub mod divide;
pub mod printer;
pub mod student;

pub use config::{run_config_check, run_config_show};
pub use defer::{DeferCommandInput, run_defer};
pub use divide::run_divide;
pub use printer::run_printer;
pub use student::run_student;
