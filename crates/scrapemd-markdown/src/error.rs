use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConvertError {
    #[error("Invalid CSS selector `{selector}`: {message}")]
    #[diagnostic(
        code(scrapemd_markdown::selector),
        help("The selector used to locate the content container could not be compiled.")
    )]
    InvalidSelector { selector: String, message: String },
}

impl ConvertError {
    pub(crate) fn invalid_selector(selector: &str, message: impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            message: message.to_string(),
        }
    }
}
