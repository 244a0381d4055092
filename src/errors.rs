use thiserror::Error;

/// Reasons a shortening form submission is rejected. The `Display` text is
/// shown inline under the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenError {
    #[error("Enter a URL.")]
    EmptyUrl,

    #[error("Invalid URL.")]
    InvalidUrl,

    #[error("Shortcode already exists.")]
    DuplicateCode,
}

/// Reasons a simulated redirect is refused. The `Display` text is raised as
/// an alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectError {
    #[error("Short URL not found!")]
    NotFound,

    #[error("Short URL expired!")]
    Expired,
}
