pub mod errors;
pub mod events;
pub mod frame_info;
pub mod gop;
pub mod signal;
pub mod stream_center;
pub mod stream_source;
