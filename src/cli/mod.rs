pub mod config_cmd;
pub mod input;
pub mod output;
pub mod preview_cmd;
pub mod renderer;
pub mod send_cmd;
