use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Invalid range for field '{0}': start must be before end")]
    InvalidRange(String),
}
