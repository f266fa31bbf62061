use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid configuration: capacity {capacity} {reason}")]
    InvalidConfiguration { capacity: usize, reason: &'static str },
}
