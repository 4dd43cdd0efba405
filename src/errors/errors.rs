use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A syntax error produced by the lexer or the parser.
///
/// Unlike semantic diagnostics, a syntax error stops the parse of the unit
/// it was found in.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::ExpectedExplicitValue => "ExpectedExplicitValue",
            ErrorImpl::DefinitionNotAllowedHere { .. } => "DefinitionNotAllowedHere",
            ErrorImpl::IllegalParameterOrder => "IllegalParameterOrder",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("Block comment is never closed"))
            }
            ErrorImpl::ExpectedExplicitValue => ErrorTip::Suggestion(String::from(
                "Constants must be initialised where they are defined",
            )),
            ErrorImpl::DefinitionNotAllowedHere { kind } => ErrorTip::Suggestion(format!(
                "A {} definition may only appear at the top level or in a class body",
                kind
            )),
            ErrorImpl::IllegalParameterOrder => ErrorTip::Suggestion(String::from(
                "Required parameters must come before optional ones, and the rest parameter last",
            )),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("expected explicit value in constant definition")]
    ExpectedExplicitValue,
    #[error("{kind} definition not allowed here")]
    DefinitionNotAllowedHere { kind: String },
    #[error("illegal parameter order")]
    IllegalParameterOrder,
}
