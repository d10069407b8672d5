mod config_error;
mod rig_setup_error;

pub use config_error::*;
pub use rig_setup_error::*;
