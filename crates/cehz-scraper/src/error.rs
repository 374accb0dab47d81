use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("portal login failed with status {status}")]
    LoginFailed { status: u16 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("report body is not valid {charset}")]
    Encoding { charset: String },

    #[error("invalid CSS selector \"{selector}\"")]
    Selector { selector: String },
}
