// Channel binding expression parser

pub mod ast;
pub mod encoding;
pub mod lexer;

// Public API re-exports
pub use ast::{Binding, EncodingExpr};
pub use encoding::{parse_encoding, EncodingParseError};
