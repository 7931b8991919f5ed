use std::fmt::Display;

use rustc_hash::FxHashMap;

/// A loaded program: the sparse line table plus anything the parser had to say
/// about it without rejecting it.
#[derive(Debug, Default)]
pub struct Program {
    pub lines: FxHashMap<usize, Line>,
    pub warnings: Vec<crate::parser::Warning>,
}

impl Program {
    pub fn line(&self, number: usize) -> Option<&Line> {
        self.lines.get(&number)
    }

    /// Execution starts at the lowest defined line number.
    pub fn first_line(&self) -> Option<&Line> {
        self.lines.keys().min().and_then(|number| self.line(*number))
    }

    pub fn sorted_lines(&self) -> Vec<&Line> {
        let mut lines: Vec<_> = self.lines.values().collect();
        lines.sort_by_key(|line| line.number);
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub command: Command,
    pub goto: Goto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Read,
    Print(Operand),
    Equals(Expression, Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Goto {
    #[default]
    Halt,
    Unconditional(usize),
    Conditional {
        if_zero: Option<usize>,
        if_one: Option<usize>,
    },
}

impl Goto {
    /// Where control goes after this line, `None` when the program halts.
    pub fn destination(&self, jump_register: bool) -> Option<usize> {
        match self {
            Goto::Halt => None,
            Goto::Unconditional(destination) => Some(*destination),
            Goto::Conditional { if_zero, if_one } => {
                if jump_register {
                    *if_one
                } else {
                    *if_zero
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    JumpRegister,
    Variable(usize),
    ValueAt(Box<Expression>),
    ValueBeyond(Box<Expression>),
    AddressOf(Box<Expression>),
    Nand(Operand, Operand),
}

/// Either side of a NAND, the right-hand side of EQUALS, or the operand of PRINT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(usize),
    Expression(Box<Expression>),
}

impl Operand {
    pub fn is_jump_register(&self) -> bool {
        matches!(self, Operand::Expression(expr) if **expr == Expression::JumpRegister)
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expression(Box::new(expr))
    }
}

pub struct LiteralWords(pub usize);

impl Display for LiteralWords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = (usize::BITS - self.0.leading_zeros()).max(1);
        for bit in (0..width).rev() {
            if bit != width - 1 {
                write!(f, " ")?;
            }
            let digit = if (self.0 >> bit) & 1 == 1 { "ONE" } else { "ZERO" };
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.sorted_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LINE NUMBER {} CODE {}",
            LiteralWords(self.number),
            self.command
        )?;
        if self.goto != Goto::Halt {
            write!(f, " {}", self.goto)?;
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Read => write!(f, "READ"),
            Command::Print(operand) => write!(f, "PRINT {}", operand),
            Command::Equals(target, value) => write!(f, "{} EQUALS {}", target, value),
        }
    }
}

impl Display for Goto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goto::Halt => Ok(()),
            Goto::Unconditional(destination) => write!(f, "GOTO {}", LiteralWords(*destination)),
            Goto::Conditional { if_zero, if_one } => {
                let mut separator = "";
                for (value, destination) in [("ZERO", if_zero), ("ONE", if_one)] {
                    if let Some(destination) = destination {
                        write!(
                            f,
                            "{separator}GOTO {} IF THE JUMP REGISTER IS {value}",
                            LiteralWords(*destination)
                        )?;
                        separator = " ";
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::JumpRegister => write!(f, "THE JUMP REGISTER"),
            Expression::Variable(index) => write!(f, "VARIABLE {}", LiteralWords(*index)),
            Expression::ValueAt(expr) => write!(f, "THE VALUE AT {}", expr),
            Expression::ValueBeyond(expr) => write!(f, "THE VALUE BEYOND {}", expr),
            Expression::AddressOf(expr) => write!(f, "THE ADDRESS OF {}", expr),
            Expression::Nand(left, right) => {
                // A prefix operator or NAND on the left would swallow the right operand.
                let grouped = matches!(
                    left,
                    Operand::Expression(expr) if !matches!(
                        **expr,
                        Expression::JumpRegister | Expression::Variable(_)
                    )
                );
                if grouped {
                    write!(f, "OPEN PARENTHESIS {} CLOSE PARENTHESIS", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " NAND {}", right)
            }
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", LiteralWords(*value)),
            Operand::Expression(expr) => write!(f, "{}", expr),
        }
    }
}
