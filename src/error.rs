use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Result type used by the fallible parts of this crate.
pub type PortFindResult<T> = Result<T, Box<dyn Error>>;

/// The configuration can not be used for a run.
///
/// These are caught before any clustering starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub msg: String,
}

impl ConfigError {
    pub(crate) fn new<S: Into<String>>(msg: S) -> Self {
        ConfigError { msg: msg.into() }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "invalid configuration: {}", self.msg)
    }
}

impl Error for ConfigError {}

/// A chunk of position data could not be loaded or used.
///
/// A bad chunk is skipped, it never stops a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkError {
    pub msg: String,
}

impl ChunkError {
    pub(crate) fn new<S: Into<String>>(msg: S) -> Self {
        ChunkError { msg: msg.into() }
    }
}

impl Display for ChunkError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "bad chunk: {}", self.msg)
    }
}

impl Error for ChunkError {}
