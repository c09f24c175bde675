pub mod check_config;
pub mod run;
pub mod state_key;
