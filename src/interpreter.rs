use std::{
    cell::RefCell,
    fmt::Debug,
    io::{Read, Write},
    rc::Rc,
};

use crate::{
    ast::{Command, Expression, Line, Operand, Program},
    bit_io,
    error::InvalidOperation,
    memory::{Memory, Value},
};

/// One run of a program. Owns everything a program can change: memory,
/// variables and the jump register.
pub struct Interpreter {
    memory: Memory,
    jump_register: bool,
    stdin: Rc<RefCell<dyn Read>>,
    stdout: Rc<RefCell<dyn Write>>,
}

impl Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("memory", &self.memory)
            .field("jump_register", &self.jump_register)
            .finish()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(
            Rc::new(RefCell::new(std::io::stdin())),
            Rc::new(RefCell::new(std::io::stdout())),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Error executing line {}: {kind}\n    {current_line}", .current_line.number)]
    Execution {
        kind: ExecutionErrorKind,
        current_line: Line,
    },
    #[error("Program has no lines to execute")]
    EmptyProgram,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionErrorKind {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] InvalidOperation),
    #[error("Jumped to undefined line {0}")]
    UndefinedLine(usize),
    #[error("Input closed while waiting for READ")]
    InputClosed,
}

impl Interpreter {
    pub fn new(stdin: Rc<RefCell<dyn Read>>, stdout: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            memory: Memory::new(),
            jump_register: false,
            stdin,
            stdout,
        }
    }

    pub fn jump_register(&self) -> bool {
        self.jump_register
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Runs from the lowest numbered line until a line has no goto for the
    /// current jump register. Programs that never get there never return.
    pub fn interpret(&mut self, program: &Program) -> Result<(), ExecutionError> {
        let mut current = program.first_line().ok_or(ExecutionError::EmptyProgram)?;

        loop {
            #[cfg(feature = "trace")]
            eprintln!(
                "{:>8} [{}] {}",
                current.number, self.jump_register as u8, current
            );

            match self.step(program, current) {
                Ok(Some(next)) => current = next,
                Ok(None) => return Ok(()),
                Err(kind) => {
                    return Err(ExecutionError::Execution {
                        kind,
                        current_line: current.clone(),
                    })
                }
            }
        }
    }

    fn step<'p>(
        &mut self,
        program: &'p Program,
        line: &Line,
    ) -> Result<Option<&'p Line>, ExecutionErrorKind> {
        self.execute(&line.command)?;

        match line.goto.destination(self.jump_register) {
            Some(number) => program
                .line(number)
                .map(Some)
                .ok_or(ExecutionErrorKind::UndefinedLine(number)),
            None => Ok(None),
        }
    }

    fn execute(&mut self, command: &Command) -> Result<(), ExecutionErrorKind> {
        match command {
            Command::Read => {
                let bit = bit_io::read_bit(&mut *self.stdin.borrow_mut())?
                    .ok_or(ExecutionErrorKind::InputClosed)?;
                self.jump_register = bit;
            }
            Command::Print(operand) => {
                let bit = self.operand_bit(operand)?;
                bit_io::write_bit(&mut *self.stdout.borrow_mut(), bit)?;
            }
            Command::Equals(target, value) => self.assign(target, value)?,
        }

        Ok(())
    }

    fn assign(&mut self, target: &Expression, value: &Operand) -> Result<(), InvalidOperation> {
        match (target, self.operand_value(value)?) {
            (Expression::Variable(index), Value::Address(address)) => {
                self.memory.bind_address(*index, address)
            }
            (target, Value::Address(_)) => Err(InvalidOperation::AddressIntoNonVariable(
                target.to_string(),
            )),
            (Expression::JumpRegister, Value::Bit(bit)) => {
                self.jump_register = bit;
                Ok(())
            }
            (target, Value::Bit(bit)) => {
                let address = self.address(target)?;
                self.memory.write(address, bit);
                Ok(())
            }
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, InvalidOperation> {
        match expression {
            Expression::JumpRegister => Ok(Value::Bit(self.jump_register)),
            Expression::Variable(index) => self.memory.variable_value(*index),
            Expression::ValueAt(_) | Expression::ValueBeyond(_) => {
                let address = self.address(expression)?;
                Ok(Value::Bit(self.memory.read(address)))
            }
            Expression::AddressOf(inner) => Ok(Value::Address(self.address(inner)?)),
            Expression::Nand(left, right) => {
                // The right operand is not evaluated at all when the left is zero.
                if !self.operand_bit(left)? {
                    return Ok(Value::Bit(true));
                }
                Ok(Value::Bit(!self.operand_bit(right)?))
            }
        }
    }

    /// The memory cell an expression names.
    fn address(&mut self, expression: &Expression) -> Result<usize, InvalidOperation> {
        match expression {
            Expression::Variable(index) => self.memory.address_of_variable(*index),
            Expression::ValueAt(pointer) => self.pointer(pointer),
            Expression::ValueBeyond(pointer) => Ok(self.pointer(pointer)? + 1),
            _ => Err(InvalidOperation::NotAddressable(expression.to_string())),
        }
    }

    fn pointer(&mut self, expression: &Expression) -> Result<usize, InvalidOperation> {
        match self.evaluate(expression)? {
            Value::Address(address) => Ok(address),
            Value::Bit(_) => Err(InvalidOperation::NotAnAddress(expression.to_string())),
        }
    }

    fn operand_value(&mut self, operand: &Operand) -> Result<Value, InvalidOperation> {
        match operand {
            Operand::Literal(value) => Ok(Value::Bit(*value != 0)),
            Operand::Expression(expression) => self.evaluate(expression),
        }
    }

    fn operand_bit(&mut self, operand: &Operand) -> Result<bool, InvalidOperation> {
        match self.operand_value(operand)? {
            Value::Bit(bit) => Ok(bit),
            Value::Address(address) => Err(InvalidOperation::AddressAsBit(address)),
        }
    }
}
