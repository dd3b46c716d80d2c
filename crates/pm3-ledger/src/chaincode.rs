//! # Chaincode and Dispatch Tables
//!
//! A chaincode registers its operations in an explicit table of
//! [`Operation`] entries: name, read-only/read-write mode, the registry
//! permission it requires, and the handler. The table is plain data, so it
//! can be listed, tested and audited without running anything.

use serde::Serialize;

use pm3_model::Permission;

use crate::error::ContractError;
use crate::stub::{ChaincodeStub, ReadOnlyStub};

/// Whether an operation may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "ro",
            Self::ReadWrite => "rw",
        }
    }
}

/// Handler signature shared by every dispatch entry.
pub type Handler<C> = fn(&C, &mut dyn ChaincodeStub, &[String]) -> Result<Vec<u8>, ContractError>;

/// One row of a dispatch table.
pub struct Operation<C> {
    pub name: &'static str,
    pub mode: Mode,
    pub permission: Option<Permission>,
    pub handler: Handler<C>,
}

impl<C> Operation<C> {
    /// A read-only entry.
    pub const fn read(name: &'static str, permission: Option<Permission>, handler: Handler<C>) -> Self {
        Self {
            name,
            mode: Mode::ReadOnly,
            permission,
            handler,
        }
    }

    /// A read-write entry.
    pub const fn write(name: &'static str, permission: Option<Permission>, handler: Handler<C>) -> Self {
        Self {
            name,
            mode: Mode::ReadWrite,
            permission,
            handler,
        }
    }

    /// Table metadata without the handler.
    pub fn info(&self) -> OperationInfo {
        OperationInfo {
            name: self.name,
            mode: self.mode,
            permission: self.permission,
        }
    }

    /// Run the handler, wrapping the stub in a [`ReadOnlyStub`] for
    /// read-only entries.
    pub fn run(
        &self,
        contract: &C,
        stub: &mut dyn ChaincodeStub,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        match self.mode {
            Mode::ReadOnly => (self.handler)(contract, &mut ReadOnlyStub::new(stub), args),
            Mode::ReadWrite => (self.handler)(contract, stub, args),
        }
    }
}

/// Inspectable description of a dispatch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationInfo {
    pub name: &'static str,
    pub mode: Mode,
    pub permission: Option<Permission>,
}

/// Find `function` in `table`.
pub fn lookup<'t, C>(
    chaincode: &str,
    table: &'t [Operation<C>],
    function: &str,
) -> Result<&'t Operation<C>, ContractError> {
    table
        .iter()
        .find(|op| op.name == function)
        .ok_or_else(|| ContractError::UnknownFunction {
            chaincode: chaincode.to_string(),
            function: function.to_string(),
        })
}

/// Positional argument `index`, named `name` in error messages.
pub fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, ContractError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ContractError::InvalidInput(format!("missing argument {name}")))
}

/// Optional positional argument; absent and empty are the same.
pub fn opt_arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// A deployed contract.
pub trait Chaincode: Send + Sync {
    /// Installed name, used for cross-contract calls.
    fn name(&self) -> &str;

    /// The dispatch table, without handlers.
    fn operations(&self) -> Vec<OperationInfo>;

    /// Execute `function` within the transaction behind `stub`.
    fn invoke(
        &self,
        stub: &mut dyn ChaincodeStub,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>;

    /// Declared mode of `function`, if the chaincode has it.
    fn mode_of(&self, function: &str) -> Option<Mode> {
        self.operations()
            .into_iter()
            .find(|op| op.name == function)
            .map(|op| op.mode)
    }
}
