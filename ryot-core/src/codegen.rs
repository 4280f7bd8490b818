//! Lowers the AST into a linear instruction stream plus the contract ABI.
//!
//! Expressions are emitted in post-order: operands first, then the opcode
//! that consumes them. Declarations are bracketed by a header opcode and a
//! matching `END <tag>`.

use std::collections::HashSet;

use log::{debug, trace};

use crate::abi::{AbiFunction, StateMutability};
use crate::ast::{Expr, Identifier, Param, Program, Statement};
use crate::error::CoreError;
use crate::opcode::{Instruction, Opcode, Operand};

/// Hands out jump label ids, starting at 1, unique within one generator.
#[derive(Debug, Default)]
pub struct LabelArena {
    last: u64,
}

impl LabelArena {
    pub fn allocate(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// Name resolution and state-access bookkeeping for the function being
/// lowered. Contract-level code (field initializers) uses an empty scope.
#[derive(Debug, Default)]
struct FunctionScope {
    params: Vec<String>,
    locals: HashSet<String>,
    reads_state: bool,
    writes_state: bool,
}

impl FunctionScope {
    fn new(params: &[Param]) -> Self {
        FunctionScope {
            params: params.iter().map(|param| param.name.clone()).collect(),
            ..FunctionScope::default()
        }
    }

    fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param == name)
    }

    fn mutability(&self) -> StateMutability {
        StateMutability::from_access(self.reads_state, self.writes_state)
    }
}

#[derive(Debug, Default)]
pub struct Generator {
    instructions: Vec<Instruction>,
    abi: Vec<AbiFunction>,
    contract_name: Option<String>,
    labels: LabelArena,
    in_interface: bool,
}

impl Generator {
    pub fn new() -> Self {
        Generator::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn abi(&self) -> &[AbiFunction] {
        &self.abi
    }

    /// Name of the first class seen.
    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    pub fn into_parts(self) -> (Vec<Instruction>, Vec<AbiFunction>, Option<String>) {
        (self.instructions, self.abi, self.contract_name)
    }

    pub fn generate(&mut self, program: &Program) -> Result<(), CoreError> {
        let mut scope = FunctionScope::default();
        for statement in &program.statements {
            self.statement(statement, &mut scope)?;
        }
        debug!(
            "generated {} instructions and {} ABI entries",
            self.instructions.len(),
            self.abi.len()
        );
        Ok(())
    }

    fn emit(&mut self, opcode: Opcode, args: Vec<Operand>) {
        let instruction = Instruction::new(opcode, args);
        trace!("emit {}", instruction.rendered);
        self.instructions.push(instruction);
    }

    fn statement(&mut self, statement: &Statement, scope: &mut FunctionScope) -> Result<(), CoreError> {
        match statement {
            Statement::Pragma { version, .. } => {
                self.emit(Opcode::Meta, vec![version.as_str().into()]);
            }
            Statement::Class {
                name,
                is_interface,
                body,
                ..
            } => {
                if self.contract_name.is_none() {
                    self.contract_name = Some(name.clone());
                }
                self.in_interface = *is_interface;
                self.emit(
                    Opcode::Contract,
                    vec![name.as_str().into(), (*is_interface).into()],
                );
                let mut class_scope = FunctionScope::default();
                for member in body {
                    self.statement(member, &mut class_scope)?;
                }
                self.end("CONTRACT");
                self.in_interface = false;
            }
            Statement::Enum { name, values, .. } => {
                self.emit(Opcode::Enum, vec![name.as_str().into()]);
                for value in values {
                    self.emit(Opcode::ConstStr, vec![value.as_str().into()]);
                }
                self.end("ENUM");
            }
            Statement::Struct { name, fields, .. } => {
                self.emit(Opcode::Struct, vec![name.as_str().into()]);
                for field in fields {
                    self.emit(
                        Opcode::Field,
                        vec![field.name.as_str().into(), field.type_name.as_str().into()],
                    );
                }
                self.end("STRUCT");
            }
            Statement::Storage {
                name,
                keys,
                value_type,
                ..
            } => {
                self.emit(Opcode::Store, vec![name.as_str().into()]);
                for key in keys {
                    self.emit(Opcode::ConstStr, vec![key.type_name.as_str().into()]);
                }
                self.emit(Opcode::ConstStr, vec![value_type.as_str().into()]);
                self.end("STORAGE");
            }
            Statement::Field {
                name,
                type_name,
                value,
                ..
            } => {
                self.emit(Opcode::Store, vec![name.as_str().into()]);
                match value {
                    Some(expr) => self.expr(expr, scope)?,
                    None => self.zero_value(type_name),
                }
                self.end("STORE");
            }
            Statement::Func {
                name,
                public,
                params,
                return_type,
                body,
                ..
            } => self.function(name, *public, params, return_type, body)?,
            Statement::Return { value, .. } => {
                if let Some(expr) = value {
                    self.expr(expr, scope)?;
                }
                self.emit(Opcode::Return, vec![]);
            }
            Statement::Delete { name, keys, .. } => {
                self.keys(keys, scope)?;
                scope.writes_state = true;
                let keys = count("key", keys.len())?;
                self.emit(Opcode::Delete, vec![name.as_str().into(), keys.into()]);
            }
            Statement::New {
                name, keys, value, ..
            } => {
                self.keys(keys, scope)?;
                self.expr(value, scope)?;
                scope.writes_state = true;
                let keys = count("key", keys.len())?;
                self.emit(Opcode::SStore, vec![name.as_str().into(), keys.into()]);
            }
            Statement::Expression { expr, .. } => self.expr(expr, scope)?,
        }
        Ok(())
    }

    fn function(
        &mut self,
        name: &str,
        public: bool,
        params: &[Param],
        return_type: &str,
        body: &[Statement],
    ) -> Result<(), CoreError> {
        let entry = AbiFunction::function(
            name,
            public,
            params.iter().map(|param| param.type_name.as_str()),
            return_type,
        );
        let abi_index = self.abi.len();
        self.abi.push(entry);

        self.emit(Opcode::Func, vec![name.into(), return_type.into()]);
        let mut scope = FunctionScope::new(params);
        for statement in body {
            self.statement(statement, &mut scope)?;
        }
        self.end("FUNC");

        if !self.in_interface {
            self.abi[abi_index].state_mutability = Some(scope.mutability());
        }
        debug!("lowered func {name} ({:?})", scope.mutability());
        Ok(())
    }

    fn expr(&mut self, expr: &Expr, scope: &mut FunctionScope) -> Result<(), CoreError> {
        match expr {
            Expr::Identifier(ident) => self.identifier(ident, scope)?,
            Expr::Integer { value, .. } => self.emit(Opcode::Const, vec![(*value).into()]),
            Expr::String { value, .. } => self.emit(Opcode::ConstStr, vec![value.as_str().into()]),
            Expr::Boolean { value, .. } => self.emit(Opcode::ConstBool, vec![(*value).into()]),
            Expr::Address { value, .. } => self.emit(Opcode::Address, vec![value.as_str().into()]),
            Expr::Hash { value, .. } => self.emit(Opcode::Hash, vec![value.as_str().into()]),
            Expr::Array { elements, .. } => {
                for element in elements {
                    self.expr(element, scope)?;
                }
                let len = count("array element", elements.len())?;
                self.emit(Opcode::Array, vec![len.into()]);
            }
            Expr::Const {
                type_name,
                name,
                value,
                ..
            } => {
                self.expr(value, scope)?;
                scope.locals.insert(name.clone());
                self.emit(
                    Opcode::MStore,
                    vec![name.as_str().into(), type_name.as_str().into()],
                );
            }
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                self.expr(left, scope)?;
                self.expr(right, scope)?;
                let opcode = Opcode::for_operator(operator)
                    .ok_or_else(|| CoreError::UnknownOperator(operator.clone()))?;
                self.emit(opcode, vec![]);
            }
            Expr::Call { function, args, .. } => {
                for arg in args {
                    self.expr(arg, scope)?;
                }
                let argc = count("argument", args.len())?;
                self.emit(Opcode::Call, vec![function.name.as_str().into(), argc.into()]);
            }
            Expr::StorageRead { name, keys, .. } => {
                self.keys(keys, scope)?;
                scope.reads_state = true;
                let keys = count("key", keys.len())?;
                self.emit(Opcode::SLoad, vec![name.as_str().into(), keys.into()]);
            }
            Expr::StorageWrite {
                name, keys, value, ..
            } => {
                self.keys(keys, scope)?;
                self.expr(value, scope)?;
                scope.writes_state = true;
                let keys = count("key", keys.len())?;
                self.emit(Opcode::SStore, vec![name.as_str().into(), keys.into()]);
            }
            Expr::ErrCheck {
                condition,
                on_success,
                ..
            } => {
                self.emit(Opcode::Check, vec![]);
                self.expr(condition, scope)?;
                self.emit(Opcode::CheckEnd, vec![]);
                let label = self.labels.allocate();
                self.emit(Opcode::JumpI, vec![label.into()]);
                if let Some(success) = on_success {
                    self.expr(success, scope)?;
                }
                self.emit(Opcode::Label, vec![label.into()]);
            }
            Expr::ErrValue { value, .. } => {
                self.expr(value, scope)?;
                self.emit(Opcode::Err, vec![]);
            }
        }
        Ok(())
    }

    fn identifier(&mut self, ident: &Identifier, scope: &mut FunctionScope) -> Result<(), CoreError> {
        if let Some(index) = scope.param_index(&ident.name) {
            let index = count("parameter", index)?;
            self.emit(Opcode::LoadArg, vec![index.into()]);
        } else if scope.locals.contains(&ident.name) {
            self.emit(Opcode::MLoad, vec![ident.name.as_str().into()]);
        } else {
            scope.reads_state = true;
            self.emit(Opcode::Load, vec![ident.name.as_str().into()]);
        }
        Ok(())
    }

    fn keys(&mut self, keys: &[Identifier], scope: &mut FunctionScope) -> Result<(), CoreError> {
        for key in keys {
            self.identifier(key, scope)?;
        }
        Ok(())
    }

    /// Default value pushed for a field declared without an initializer.
    fn zero_value(&mut self, type_name: &str) {
        match type_name {
            "bool" => self.emit(Opcode::ConstBool, vec![false.into()]),
            "string" => self.emit(Opcode::ConstStr, vec!["".into()]),
            "address" => self.emit(Opcode::ZeroAddr, vec![]),
            "hash" => self.emit(Opcode::ZeroHash, vec![]),
            array if array.starts_with("[]") => self.emit(Opcode::Array, vec![0u32.into()]),
            _ => self.emit(Opcode::Const, vec![0u64.into()]),
        }
    }

    fn end(&mut self, tag: &str) {
        self.emit(Opcode::End, vec![tag.into()]);
    }
}

/// Narrows a length or index to the `u32` operand width.
fn count(what: &'static str, len: usize) -> Result<u32, CoreError> {
    u32::try_from(len).map_err(|_| CoreError::OperandOverflow { what, value: len })
}
