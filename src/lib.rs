pub mod ast;
pub mod bit_io;
pub mod error;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod span;
pub mod tokenizer;

pub use error::Error;

/// Load-time settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Reject THE JUMP REGISTER on the right-hand side of EQUALS instead of
    /// warning about it.
    pub strict: bool,
}

/// Tokenizes and parses `source`. Nothing is executed unless the whole
/// program loads.
pub fn load(source: &str, config: &Config) -> Result<ast::Program, Error> {
    let tokens = tokenizer::tokens(source)?;
    Ok(parser::program(&tokens, config)?)
}
