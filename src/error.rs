use crate::{interpreter::ExecutionError, parser::ParseError, tokenizer::TokenError};

/// Typed misuse of bits and addresses. Raised while loading when the shape of
/// the program already gives it away, otherwise while running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOperation {
    #[error("used multi-bit literal {0} where a single bit is required")]
    MultiBitLiteral(usize),
    #[error("used THE JUMP REGISTER on right-hand side of EQUALS command")]
    JumpRegisterOnRightHandSide,
    #[error("used literal {0} where an addressable expression is required")]
    LiteralNotAddressable(usize),
    #[error("accessed uninitialised variable {0}")]
    UninitialisedVariable(usize),
    #[error("tried to take the address of address variable {0}")]
    AddressOfAddressVariable(usize),
    #[error("tried to place an address in bit variable {0}")]
    AddressIntoBitVariable(usize),
    #[error("tried to place an address in {0}")]
    AddressIntoNonVariable(String),
    #[error("tried to use address {0} as a bit")]
    AddressAsBit(usize),
    #[error("tried to dereference {0}, which does not hold an address")]
    NotAnAddress(String),
    #[error("{0} has no address")]
    NotAddressable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
