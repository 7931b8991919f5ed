use std::cell::{Cell, RefCell};

use crate::{
    ast::{Command, Expression, Goto, Line, Operand, Program},
    error::InvalidOperation,
    span::Span,
    tokenizer::{Token, TokenType},
    Config,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Encountered unexpected token {token} while parsing {context}")]
    UnexpectedToken { token: Token, context: String },
    #[error("Unexpected end of program while parsing {0}")]
    UnexpectedEndOfProgram(String),
    #[error("Multiple gotos on line {0} cover one condition")]
    DuplicateGoto(usize),
    #[error("Invalid operation on line {line}: {operation}")]
    InvalidOperation {
        line: usize,
        operation: InvalidOperation,
    },
    #[error("Literal at {0} does not fit in {} bits", usize::BITS)]
    LiteralOverflow(Span),
    #[error("Expression on line {0} is nested more than {} levels deep", MAX_NESTING)]
    NestingTooDeep(usize),
}

/// Bounds the recursion of both parsing and evaluating a single expression.
pub const MAX_NESTING: usize = 256;

/// Findings that do not stop the program from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    JumpRegisterOnRightHandSide(usize),
    LineRedefined(usize),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::JumpRegisterOnRightHandSide(line) => write!(
                f,
                "THE JUMP REGISTER on right-hand side of EQUALS command on line {}",
                line
            ),
            Warning::LineRedefined(line) => {
                write!(f, "line {} is defined more than once, the last one wins", line)
            }
        }
    }
}

#[derive(Debug)]
struct ParseContext {
    stack: RefCell<Vec<&'static str>>,
    line: Cell<usize>,
}

impl ParseContext {
    fn new() -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            line: Cell::new(0),
        }
    }

    fn push(&self, name: &'static str) -> ParseContextGuard {
        self.stack.borrow_mut().push(name);
        ParseContextGuard::new(self)
    }

    fn pop(&self) {
        self.stack.borrow_mut().pop();
    }

    fn check_nesting(&self) -> Result<(), ParseError> {
        if self.stack.borrow().len() > MAX_NESTING {
            return Err(ParseError::NestingTooDeep(self.line.get()));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.stack.borrow().join(" > ")
    }

    /// An error for whatever sits at the front of `tokens`.
    fn unexpected(&self, tokens: &[Token]) -> ParseError {
        match tokens.first() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.clone(),
                context: self.describe(),
            },
            None => ParseError::UnexpectedEndOfProgram(self.describe()),
        }
    }

    fn invalid(&self, operation: InvalidOperation) -> ParseError {
        ParseError::InvalidOperation {
            line: self.line.get(),
            operation,
        }
    }
}

struct ParseContextGuard<'a> {
    context: &'a ParseContext,
}

impl<'a> ParseContextGuard<'a> {
    fn new(context: &'a ParseContext) -> Self {
        Self { context }
    }
}

impl<'a> Drop for ParseContextGuard<'a> {
    fn drop(&mut self) {
        self.context.pop();
    }
}

pub fn program(tokens: &[Token], config: &Config) -> Result<Program, ParseError> {
    let context = ParseContext::new();
    let mut program = Program::default();
    let mut tokens = tokens;

    while !tokens.is_empty() {
        let (line, rest) = line(&context, tokens, config, &mut program.warnings)?;
        tokens = rest;

        let number = line.number;
        if program.lines.insert(number, line).is_some() {
            program.warnings.push(Warning::LineRedefined(number));
        }
    }

    Ok(program)
}

fn consume<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
    token_type: TokenType,
) -> Result<&'a [Token], ParseError> {
    match tokens.first() {
        Some(token) if token.token_type == token_type => Ok(&tokens[1..]),
        _ => Err(context.unexpected(tokens)),
    }
}

fn line<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
    config: &Config,
    warnings: &mut Vec<Warning>,
) -> Result<(Line, &'a [Token]), ParseError> {
    let _guard = context.push("line");

    let (number, tokens) = {
        let _guard = context.push("line number");
        let tokens = consume(context, tokens, TokenType::LineNumber)?;
        let (number, tokens) = literal(context, tokens)?;
        (number, consume(context, tokens, TokenType::Code)?)
    };
    context.line.set(number);

    let (command, tokens) = command(context, tokens, config, warnings)?;
    let (goto, tokens) = gotos(context, tokens)?;

    Ok((
        Line {
            number,
            command,
            goto,
        },
        tokens,
    ))
}

/// Binary digits, most significant first.
fn literal<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
) -> Result<(usize, &'a [Token]), ParseError> {
    let _guard = context.push("literal number");
    let digits = tokens
        .iter()
        .take_while(|token| token.token_type.digit().is_some())
        .count();
    if digits == 0 {
        return Err(context.unexpected(tokens));
    }

    let mut value: usize = 0;
    for token in &tokens[..digits] {
        let bit = token.token_type.digit() == Some(true);
        value = value
            .checked_mul(2)
            .and_then(|value| value.checked_add(bit as usize))
            .ok_or_else(|| {
                ParseError::LiteralOverflow(tokens[0].span + tokens[digits - 1].span)
            })?;
    }

    Ok((value, &tokens[digits..]))
}

fn command<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
    config: &Config,
    warnings: &mut Vec<Warning>,
) -> Result<(Command, &'a [Token]), ParseError> {
    match tokens.first().map(Token::token_type) {
        Some(TokenType::Read) => Ok((Command::Read, &tokens[1..])),
        Some(TokenType::Print) => {
            let _guard = context.push("print command");
            let (operand, tokens) = expression(context, &tokens[1..])?;
            Ok((Command::Print(single_bit(context, operand)?), tokens))
        }
        Some(_) => equals(context, tokens, config, warnings),
        None => {
            let _guard = context.push("command");
            Err(context.unexpected(tokens))
        }
    }
}

fn equals<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
    config: &Config,
    warnings: &mut Vec<Warning>,
) -> Result<(Command, &'a [Token]), ParseError> {
    let _guard = context.push("equals command");
    let (target, tokens) = expression(context, tokens)?;
    let tokens = consume(context, tokens, TokenType::Equals)?;
    let target = match target {
        Operand::Expression(expr) => *expr,
        Operand::Literal(value) => {
            return Err(context.invalid(InvalidOperation::LiteralNotAddressable(value)))
        }
    };

    let (value, tokens) = expression(context, tokens)?;
    let value = single_bit(context, value)?;
    if value.is_jump_register() {
        if config.strict {
            return Err(context.invalid(InvalidOperation::JumpRegisterOnRightHandSide));
        }
        warnings.push(Warning::JumpRegisterOnRightHandSide(context.line.get()));
    }

    Ok((Command::Equals(target, value), tokens))
}

fn single_bit(context: &ParseContext, operand: Operand) -> Result<Operand, ParseError> {
    match operand {
        Operand::Literal(value) if value > 1 => {
            Err(context.invalid(InvalidOperation::MultiBitLiteral(value)))
        }
        operand => Ok(operand),
    }
}

/// NAND chains associate to the right: `A NAND B NAND C` is `A NAND (B NAND C)`.
fn expression<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
) -> Result<(Operand, &'a [Token]), ParseError> {
    let _guard = context.push("expression");
    context.check_nesting()?;
    let (left, tokens) = primary(context, tokens)?;

    match tokens.first().map(Token::token_type) {
        Some(TokenType::Nand) => {
            let (right, tokens) = expression(context, &tokens[1..])?;
            Ok((Expression::Nand(left, right).into(), tokens))
        }
        _ => Ok((left, tokens)),
    }
}

fn primary<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
) -> Result<(Operand, &'a [Token]), ParseError> {
    match tokens.first().map(Token::token_type) {
        Some(TokenType::Zero | TokenType::One) => {
            let (value, tokens) = literal(context, tokens)?;
            Ok((Operand::Literal(value), tokens))
        }
        Some(TokenType::TheJumpRegister) => Ok((Expression::JumpRegister.into(), &tokens[1..])),
        Some(TokenType::Variable) => {
            let (index, tokens) = literal(context, &tokens[1..])?;
            Ok((Expression::Variable(index).into(), tokens))
        }
        Some(TokenType::TheValueAt) => prefix(context, &tokens[1..], Expression::ValueAt),
        Some(TokenType::TheValueBeyond) => prefix(context, &tokens[1..], Expression::ValueBeyond),
        Some(TokenType::TheAddressOf) => prefix(context, &tokens[1..], Expression::AddressOf),
        Some(TokenType::OpenParenthesis) => {
            let _guard = context.push("parentheses");
            let (inner, tokens) = expression(context, &tokens[1..])?;
            let tokens = consume(context, tokens, TokenType::CloseParenthesis)?;
            Ok((inner, tokens))
        }
        _ => Err(context.unexpected(tokens)),
    }
}

fn prefix<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
    operator: fn(Box<Expression>) -> Expression,
) -> Result<(Operand, &'a [Token]), ParseError> {
    let (operand, tokens) = expression(context, tokens)?;
    match operand {
        Operand::Expression(expr) => Ok((operator(expr).into(), tokens)),
        Operand::Literal(value) => {
            Err(context.invalid(InvalidOperation::LiteralNotAddressable(value)))
        }
    }
}

fn gotos<'a>(
    context: &ParseContext,
    tokens: &'a [Token],
) -> Result<(Goto, &'a [Token]), ParseError> {
    let _guard = context.push("goto");
    let duplicate = || ParseError::DuplicateGoto(context.line.get());
    let mut goto = Goto::Halt;
    let mut tokens = tokens;

    loop {
        match tokens.first().map(Token::token_type) {
            None | Some(TokenType::LineNumber) => return Ok((goto, tokens)),
            Some(TokenType::Goto) => {}
            Some(_) => return Err(context.unexpected(tokens)),
        }

        let (destination, rest) = literal(context, &tokens[1..])?;
        tokens = rest;

        if tokens.first().map(Token::token_type) != Some(&TokenType::IfTheJumpRegisterIs) {
            if goto != Goto::Halt {
                return Err(duplicate());
            }
            goto = Goto::Unconditional(destination);
            continue;
        }

        let condition = match tokens.get(1).map(|token| token.token_type.digit()) {
            Some(Some(condition)) => condition,
            _ => return Err(context.unexpected(&tokens[1..])),
        };
        tokens = &tokens[2..];

        let (mut if_zero, mut if_one) = match goto {
            Goto::Halt => (None, None),
            Goto::Conditional { if_zero, if_one } => (if_zero, if_one),
            Goto::Unconditional(_) => return Err(duplicate()),
        };
        let slot = if condition { &mut if_one } else { &mut if_zero };
        if slot.is_some() {
            return Err(duplicate());
        }
        *slot = Some(destination);
        goto = Goto::Conditional { if_zero, if_one };
    }
}
