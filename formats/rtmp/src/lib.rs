pub mod bandwidth;
pub mod chunk;
pub mod commands;
pub mod handshake;
pub mod jitter;
pub mod message;
pub mod protocol_control;
pub mod user_control;
