use std::fmt;
use std::fmt::Formatter;

#[derive(Debug)]
pub enum PvWattsError {
    Transport(String),
    Document(String),
}

impl fmt::Display for PvWattsError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PvWattsError::Transport(e) => write!(f, "PvWattsError::Transport: {}", e),
            PvWattsError::Document(e)  => write!(f, "PvWattsError::Document: {}", e),
        }
    }
}
impl From<reqwest::Error> for PvWattsError {
    fn from(e: reqwest::Error) -> Self {
        PvWattsError::Transport(e.to_string())
    }
}
impl From<serde_json::Error> for PvWattsError {
    fn from(e: serde_json::Error) -> Self {
        PvWattsError::Document(e.to_string())
    }
}
