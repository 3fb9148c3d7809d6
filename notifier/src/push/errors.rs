use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push endpoint answered {0}")]
    Status(u16),
}
