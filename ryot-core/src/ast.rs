//! Abstract syntax tree produced by the parser.
//!
//! The tree is built once per compilation unit and only read afterwards.
//! Every node keeps the token it started from so later stages can point
//! back at the source text.

use std::fmt;

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// `name: type` pair used by struct fields, storage keys and function
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub token: Token,
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let name = token.literal.clone();
        Identifier { token, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Pragma {
        token: Token,
        version: String,
    },
    Class {
        token: Token,
        name: String,
        is_interface: bool,
        body: Vec<Statement>,
    },
    Enum {
        token: Token,
        name: String,
        values: Vec<String>,
    },
    Struct {
        token: Token,
        name: String,
        fields: Vec<Param>,
    },
    Storage {
        token: Token,
        name: String,
        public: bool,
        keys: Vec<Param>,
        value_type: String,
    },
    Func {
        token: Token,
        name: String,
        public: bool,
        params: Vec<Param>,
        return_type: String,
        body: Vec<Statement>,
    },
    /// Contract-level state variable, e.g. `pub uint64 total: 0;`.
    Field {
        token: Token,
        name: String,
        public: bool,
        type_name: String,
        value: Option<Expr>,
    },
    Return {
        token: Token,
        value: Option<Expr>,
    },
    Delete {
        token: Token,
        name: String,
        keys: Vec<Identifier>,
    },
    New {
        token: Token,
        name: String,
        keys: Vec<Identifier>,
        value: Expr,
    },
    Expression {
        token: Token,
        expr: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Identifier(Identifier),
    Integer {
        token: Token,
        value: u64,
    },
    String {
        token: Token,
        value: String,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    Address {
        token: Token,
        value: String,
    },
    Hash {
        token: Token,
        value: String,
    },
    Array {
        token: Token,
        elements: Vec<Expr>,
    },
    /// Typed named initializer, e.g. `uint64 res: count(id)`.
    Const {
        token: Token,
        type_name: String,
        name: String,
        value: Box<Expr>,
    },
    Binary {
        token: Token,
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    Call {
        token: Token,
        function: Identifier,
        args: Vec<Expr>,
    },
    /// `name(key, ...): value`
    StorageWrite {
        token: Token,
        name: String,
        keys: Vec<Identifier>,
        value: Box<Expr>,
    },
    /// `name(key, ...)` without a trailing `:`.
    StorageRead {
        token: Token,
        name: String,
        keys: Vec<Identifier>,
    },
    /// `check(condition, on_success)`
    ErrCheck {
        token: Token,
        condition: Box<Expr>,
        on_success: Option<Box<Expr>>,
    },
    /// `err: value`
    ErrValue {
        token: Token,
        value: Box<Expr>,
    },
}

fn join_keys(keys: &[Identifier]) -> String {
    keys.iter()
        .map(|key| key.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(ident) => f.write_str(&ident.name),
            Expr::Integer { value, .. } => write!(f, "{value}"),
            Expr::String { value, .. } => write!(f, "\"{value}\""),
            Expr::Boolean { value, .. } => write!(f, "{value}"),
            Expr::Address { value, .. } | Expr::Hash { value, .. } => f.write_str(value),
            Expr::Array { elements, .. } => {
                let items: Vec<String> = elements.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Expr::Const {
                type_name,
                name,
                value,
                ..
            } => write!(f, "{type_name} {name}: {value}"),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expr::Call { function, args, .. } => {
                let items: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", function.name, items.join(", "))
            }
            Expr::StorageWrite {
                name, keys, value, ..
            } => write!(f, "{name}({}): {value}", join_keys(keys)),
            Expr::StorageRead { name, keys, .. } => write!(f, "{name}({})", join_keys(keys)),
            Expr::ErrCheck {
                condition,
                on_success,
                ..
            } => match on_success {
                Some(value) => write!(f, "check({condition}, {value})"),
                None => write!(f, "check({condition})"),
            },
            Expr::ErrValue { value, .. } => write!(f, "err: {value}"),
        }
    }
}
