//! CLI command handlers.

pub mod check_env;
pub mod lookup;
pub mod show;
pub mod summary;
pub mod tables;
pub mod validate;

pub use check_env::run_check_env;
pub use lookup::run_lookup;
pub use show::run_show;
pub use summary::run_summary;
pub use tables::run_tables;
pub use validate::run_validate_request;
