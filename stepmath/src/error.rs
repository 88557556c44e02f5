use ariadne::Source;
use stepmath_error::Error as EngineError;
use stepmath_parser::parser::error::Error as ParseError;

/// Utility enum to package errors that can occur while parsing or rewriting.
#[derive(Debug)]
pub enum Error {
    /// An error that occurred while parsing input text.
    Parse(ParseError),

    /// An error that occurred while decoding markup or applying an operation.
    Engine(EngineError),
}

impl Error {
    /// Report this error to stderr.
    ///
    /// The `ariadne` crate's report type does not implement `Display`, so printing goes through
    /// its `eprint` method.
    pub fn report_to_stderr(&self, input: &str) {
        let result = match self {
            Self::Parse(err) => err
                .build_report("input")
                .eprint(("input", Source::from(input))),
            Self::Engine(err) => err
                .build_report("input")
                .eprint(("input", Source::from(input))),
        };
        if let Err(err) = result {
            eprintln!("failed to render error report: {}", err);
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}
