pub mod init;
pub mod load;

pub use init::init_command;
pub use load::{load_command, prepare_config};
