use std::error::Error;
use std::fmt;
use std::io;

/// Errors surfaced by the engine's loading and resolution layers. The
/// solver itself is infallible; anything that can fail happens before the
/// search starts.
#[derive(Debug)]
pub enum EngineError {
    /// One or more character names could not be resolved against the
    /// catalog. Carries every offending name so a round's typos are
    /// reported together instead of one at a time.
    UnresolvedCharacters(Vec<String>),
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::UnresolvedCharacters(names) => {
                write!(f, "characters not found in the catalog: {}", names.join(", "))
            }
            EngineError::Io(e) => write!(f, "{}", e),
            EngineError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::UnresolvedCharacters(_) => None,
            EngineError::Io(e) => Some(e),
            EngineError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> EngineError {
        EngineError::Io(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> EngineError {
        EngineError::Parse(e)
    }
}
