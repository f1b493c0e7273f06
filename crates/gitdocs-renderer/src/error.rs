/// Error returned by the renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source bytes are not valid UTF-8.
    #[error("Markdown source is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// Document has no top-level heading to use as a title.
    #[error("No h1 heading found")]
    NoHeading,
}
