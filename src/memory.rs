use crate::error::InvalidOperation;

/// What an expression evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bit(bool),
    Address(usize),
}

/// A variable is bound on first use and keeps its kind for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variable {
    #[default]
    Unset,
    /// Names the memory cell at this index.
    Bit(usize),
    /// Holds this memory index as its value.
    Address(usize),
}

/// The bit memory and the variable table. Both only ever grow, and a cell
/// handed out to a variable is never reused.
#[derive(Debug, Default, Clone)]
pub struct Memory {
    bits: Vec<bool>,
    variables: Vec<Variable>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn variable(&self, index: usize) -> Variable {
        self.variables.get(index).copied().unwrap_or_default()
    }

    fn variable_mut(&mut self, index: usize) -> &mut Variable {
        if index >= self.variables.len() {
            self.variables.resize(index + 1, Variable::Unset);
        }
        &mut self.variables[index]
    }

    pub fn read(&mut self, address: usize) -> bool {
        *self.cell(address)
    }

    pub fn write(&mut self, address: usize, bit: bool) {
        *self.cell(address) = bit;
    }

    fn cell(&mut self, address: usize) -> &mut bool {
        if address >= self.bits.len() {
            self.bits.resize(address + 1, false);
        }
        &mut self.bits[address]
    }

    /// The cell a bit variable names. An unset variable gets the next fresh cell.
    pub fn address_of_variable(&mut self, index: usize) -> Result<usize, InvalidOperation> {
        match self.variable(index) {
            Variable::Unset => {
                let next = self.bits.len();
                *self.variable_mut(index) = Variable::Bit(next);
                self.bits.push(false);
                Ok(next)
            }
            Variable::Bit(address) => Ok(address),
            Variable::Address(_) => Err(InvalidOperation::AddressOfAddressVariable(index)),
        }
    }

    /// A bit variable reads its cell. An address variable reads as the address
    /// itself, not what it points at.
    pub fn variable_value(&mut self, index: usize) -> Result<Value, InvalidOperation> {
        match self.variable(index) {
            Variable::Unset => Err(InvalidOperation::UninitialisedVariable(index)),
            Variable::Bit(address) => Ok(Value::Bit(self.read(address))),
            Variable::Address(address) => Ok(Value::Address(address)),
        }
    }

    /// Makes `index` an address variable holding `address`. Rebinding an
    /// address variable is fine, turning a bit variable into one is not.
    pub fn bind_address(&mut self, index: usize, address: usize) -> Result<(), InvalidOperation> {
        let variable = self.variable_mut(index);
        if let Variable::Bit(_) = variable {
            return Err(InvalidOperation::AddressIntoBitVariable(index));
        }
        *variable = Variable::Address(address);
        Ok(())
    }
}
