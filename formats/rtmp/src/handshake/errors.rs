use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("digest did not match any known schema")]
    Invalid,
    #[error("digest has unexpected length: {length}")]
    WrongLength { length: usize },
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("bad handshake version: {0}")]
    BadVersion(u8),
    #[error("digest error: {0}")]
    DigestError(#[from] DigestError),
    #[error("dh key exchange error: {0}")]
    KeyExchange(String),
}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
