pub mod cmd_apply;
pub mod cmd_execute;
pub mod cmd_frame_rate;
pub mod cmd_get;
pub mod cmd_info;
pub mod cmd_set_gain;
pub mod common;
