use polycut_complex::BoolOp;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing input or driving the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("coordinate buffer length {0} is not a multiple of 3")]
    RaggedCoordinates(usize),

    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("non-finite coordinate at position {0}")]
    NonFiniteCoordinate(usize),

    #[error("triangle index {index} out of range for {points} points")]
    IndexOutOfRange { index: u32, points: usize },

    #[error("cannot mesh fewer than 4 unique vertices (got {0})")]
    TooFewVertices(usize),

    #[error("no non-degenerate constraints in the input")]
    NoConstraints,

    #[error("invalid boolean opcode {0:?}")]
    InvalidOpcode(char),

    #[error("operator {0:?} needs a second input model")]
    MissingSecondInput(BoolOp),

    #[error("single-input repair takes no second model")]
    UnexpectedSecondInput,

    #[error("meshing backend: {0}")]
    Backend(String),

    #[error(transparent)]
    Complex(#[from] polycut_complex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
