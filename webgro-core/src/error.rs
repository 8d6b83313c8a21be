use std::fmt;

/// Subsystems that are installed and removed through the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Keyboard,
    Mouse,
    Timer,
    Sound,
    Graphics,
}

impl Subsystem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Timer => "timer",
            Self::Sound => "sound",
            Self::Graphics => "graphics",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration and resource errors. None of them are fatal: the caller may
/// ignore the error and continue with the subsystem left uninstalled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The subsystem was installed twice.
    AlreadyInstalled(Subsystem),
    /// Removal or use of a subsystem that was never installed.
    NotInstalled(Subsystem),
    /// The subsystem needs the drawing surface to exist first.
    GraphicsRequired(Subsystem),
    /// No element with the given id exists in the host document.
    ElementNotFound(String),
    /// The element with the given id is not a canvas.
    NotACanvas(String),
    /// The host refused to hand out a 2D drawing context.
    ContextUnavailable(String),
    /// Configuration could not be read or parsed.
    Config(String),
    /// Any other failure reported by the host environment.
    Host(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyInstalled(s) => write!(f, "{s} already installed"),
            Error::NotInstalled(s) => write!(f, "{s} not installed"),
            Error::GraphicsRequired(s) => {
                write!(f, "graphics must be set up before installing {s}")
            }
            Error::ElementNotFound(id) => write!(f, "can't find element with id {id}"),
            Error::NotACanvas(id) => write!(f, "element {id} is not a canvas"),
            Error::ContextUnavailable(id) => {
                write!(f, "canvas {id} did not provide a 2d context")
            }
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Error::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
