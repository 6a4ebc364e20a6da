use thiserror::Error;

/// Failures that abort a single load cycle. Nothing here is fatal to the
/// process; the menu loop reports the message and waits for the next choice.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV parse error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("input is not tabular: {0}")]
    NotTabular(String),
}
