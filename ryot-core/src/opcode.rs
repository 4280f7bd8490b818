//! Instruction set of the Ryot stack machine.
//!
//! Opcodes are grouped by family in the high nibble. Each opcode carries a
//! fixed operand signature which the binary encoder validates against and
//! the decoder reads back with, so the bytecode needs no type tags.

use std::fmt;

/// Wire type of a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// 8 bytes, big-endian.
    U64,
    /// 4 bytes, big-endian.
    U32,
    /// UTF-8 bytes followed by a NUL terminator.
    Str,
    /// 1 byte, `0` or `1`.
    Bool,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandKind::U64 => "u64",
            OperandKind::U32 => "u32",
            OperandKind::Str => "str",
            OperandKind::Bool => "bool",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    U64(u64),
    U32(u32),
    Str(String),
    Bool(bool),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::U64(_) => OperandKind::U64,
            Operand::U32(_) => OperandKind::U32,
            Operand::Str(_) => OperandKind::Str,
            Operand::Bool(_) => OperandKind::Bool,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::U64(value) => write!(f, "{value}"),
            Operand::U32(value) => write!(f, "{value}"),
            Operand::Str(value) => f.write_str(value),
            Operand::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<u64> for Operand {
    fn from(value: u64) -> Self {
        Operand::U64(value)
    }
}

impl From<u32> for Operand {
    fn from(value: u32) -> Self {
        Operand::U32(value)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Bool(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Str(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Str(value)
    }
}

macro_rules! opcodes {
    ($( $variant:ident = $byte:literal, $mnemonic:literal, [$($kind:ident),*]; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $( $variant = $byte, )*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$( Opcode::$variant, )*];

            pub fn from_byte(byte: u8) -> Option<Opcode> {
                match byte {
                    $( $byte => Some(Opcode::$variant), )*
                    _ => None,
                }
            }

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $mnemonic, )*
                }
            }

            /// Operand signature, in emission order.
            pub fn operands(self) -> &'static [OperandKind] {
                match self {
                    $( Opcode::$variant => &[$( OperandKind::$kind ),*], )*
                }
            }
        }
    };
}

opcodes! {
    // basic
    Const = 0x00, "CONST", [U64];
    Add = 0x01, "ADD", [];
    Sub = 0x02, "SUB", [];
    Mul = 0x03, "MUL", [];
    Div = 0x04, "DIV", [];
    Mod = 0x05, "MOD", [];
    ConstStr = 0x06, "CONST_STR", [Str];
    ConstBool = 0x07, "CONST_BOOL", [Bool];

    // memory and storage
    Store = 0x10, "STORE", [Str];
    Load = 0x11, "LOAD", [Str];
    MStore = 0x12, "MSTORE", [Str, Str];
    MLoad = 0x13, "MLOAD", [Str];
    LoadArg = 0x14, "LOAD_ARG", [U32];
    SLoad = 0x15, "SLOAD", [Str, U32];
    SStore = 0x16, "SSTORE", [Str, U32];

    // control flow
    Jump = 0x20, "JUMP", [U64];
    JumpI = 0x21, "JUMPI", [U64];
    JumpDest = 0x22, "JUMPDEST", [];
    Call = 0x23, "CALL", [Str, U32];
    Return = 0x24, "RETURN", [];
    Revert = 0x25, "REVERT", [];

    // declarations
    Contract = 0x30, "CONTRACT", [Str, Bool];
    Func = 0x31, "FUNC", [Str, Str];
    End = 0x32, "END", [Str];

    // types
    Array = 0x40, "ARRAY", [U32];
    Struct = 0x41, "STRUCT", [Str];
    Enum = 0x42, "ENUM", [Str];
    Field = 0x43, "FIELD", [Str, Str];

    // chain
    Address = 0x50, "ADDRESS", [Str];
    Balance = 0x51, "BALANCE", [];
    Caller = 0x52, "CALLER", [];
    Hash = 0x53, "HASH", [Str];

    // metadata
    Meta = 0x60, "META", [Str];

    // system
    Create = 0x70, "CREATE", [];
    Delete = 0x71, "DELETE", [Str, U32];
    SelfDestruct = 0x72, "SELFDESTRUCT", [];

    // logic and comparison
    Eq = 0x80, "EQ", [];
    Lt = 0x81, "LT", [];
    Gt = 0x82, "GT", [];
    And = 0x83, "AND", [];
    Or = 0x84, "OR", [];
    Not = 0x85, "NOT", [];
    Neq = 0x86, "NEQ", [];
    Lte = 0x87, "LTE", [];
    Gte = 0x88, "GTE", [];

    // stack
    Pop = 0x90, "POP", [];
    Dup = 0x91, "DUP", [];
    Swap = 0x92, "SWAP", [];

    // error checks
    ZeroAddr = 0xF9, "ZERO_ADDR", [];
    ZeroHash = 0xFA, "ZERO_HASH", [];
    Label = 0xFB, "LABEL", [U64];
    JumpEnd = 0xFC, "JUMP_END", [];
    CheckEnd = 0xFD, "CHECK_END", [];
    Err = 0xFE, "ERR", [];
    Check = 0xFF, "CHECK", [];
}

impl Opcode {
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Opcode for a source-level binary operator.
    pub fn for_operator(operator: &str) -> Option<Opcode> {
        let opcode = match operator {
            "+" => Opcode::Add,
            "-" => Opcode::Sub,
            "*" => Opcode::Mul,
            "/" => Opcode::Div,
            "%" => Opcode::Mod,
            "==" => Opcode::Eq,
            "!=" => Opcode::Neq,
            "<" => Opcode::Lt,
            ">" => Opcode::Gt,
            "<=" => Opcode::Lte,
            ">=" => Opcode::Gte,
            "&&" => Opcode::And,
            "||" => Opcode::Or,
            _ => return None,
        };
        Some(opcode)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One emitted instruction with its disassembly line computed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub args: Vec<Operand>,
    pub rendered: String,
}

impl Instruction {
    pub fn new(opcode: Opcode, args: Vec<Operand>) -> Self {
        let rendered = render(opcode, &args);
        Instruction {
            opcode,
            args,
            rendered,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Disassembly line for an instruction: the mnemonic padded to ten columns
/// followed by its operands, with a handful of opcodes using a friendlier
/// layout.
pub fn render(opcode: Opcode, args: &[Operand]) -> String {
    use Operand::{Bool, Str, U32, U64};

    match (opcode, args) {
        (Opcode::Const, [U64(value)]) => format!("{:<10} {value}", "CONST_U64"),
        (Opcode::ConstStr, [Str(value)]) => format!("{:<10} \"{value}\"", "CONST_STR"),
        (Opcode::End, [Str(tag)]) => format!("END_{}", tag.to_uppercase()),
        (Opcode::Contract, [Str(name), Bool(true)]) => format!("{:<10} {name}", "INTERFACE"),
        (Opcode::Contract, [Str(name), Bool(false)]) => format!("{:<10} {name}", "CONTRACT"),
        (Opcode::Func, [Str(name), Str(ret)]) if ret.is_empty() || ret == "void" => {
            format!("{:<10} {name}", "FUNC")
        }
        (Opcode::Func, [Str(name), Str(ret)]) => format!("{:<10} {name} -> {ret}", "FUNC"),
        (Opcode::Array, [U32(count)]) => format!("{:<10} [{count} elements]", "ARRAY"),
        (Opcode::Call, [Str(name), U32(count)]) => format!("{:<10} {name} ({count} args)", "CALL"),
        (Opcode::SLoad | Opcode::SStore | Opcode::Delete, [Str(name), U32(count)]) => {
            format!("{:<10} {name} ({count} keys)", opcode.mnemonic())
        }
        (_, []) => opcode.mnemonic().to_string(),
        (_, args) => {
            let operands: Vec<String> = args.iter().map(ToString::to_string).collect();
            format!("{:<10} {}", opcode.mnemonic(), operands.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_follow_family_layout() {
        assert_eq!(Opcode::Const.byte(), 0x00);
        assert_eq!(Opcode::LoadArg.byte(), 0x14);
        assert_eq!(Opcode::Contract.byte(), 0x30);
        assert_eq!(Opcode::Meta.byte(), 0x60);
        assert_eq!(Opcode::Gte.byte(), 0x88);
        assert_eq!(Opcode::Check.byte(), 0xFF);
    }

    #[test]
    fn from_byte_inverts_byte_for_every_opcode() {
        for &opcode in Opcode::ALL {
            assert_eq!(Opcode::from_byte(opcode.byte()), Some(opcode));
        }
        assert_eq!(Opcode::from_byte(0x08), None);
        assert_eq!(Opcode::from_byte(0xF8), None);
    }

    #[test]
    fn opcode_bytes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for &opcode in Opcode::ALL {
            assert!(seen.insert(opcode.byte()), "duplicate byte for {opcode}");
        }
    }

    #[test]
    fn operators_map_to_opcodes() {
        assert_eq!(Opcode::for_operator("+"), Some(Opcode::Add));
        assert_eq!(Opcode::for_operator("<="), Some(Opcode::Lte));
        assert_eq!(Opcode::for_operator("!="), Some(Opcode::Neq));
        assert_eq!(Opcode::for_operator("="), None);
    }

    #[test]
    fn renders_special_layouts() {
        let cases = [
            (Instruction::new(Opcode::Const, vec![42u64.into()]), "CONST_U64  42"),
            (Instruction::new(Opcode::ConstStr, vec!["hi".into()]), "CONST_STR  \"hi\""),
            (Instruction::new(Opcode::ConstBool, vec![true.into()]), "CONST_BOOL true"),
            (Instruction::new(Opcode::End, vec!["func".into()]), "END_FUNC"),
            (
                Instruction::new(Opcode::Contract, vec!["Token".into(), true.into()]),
                "INTERFACE  Token",
            ),
            (
                Instruction::new(Opcode::Func, vec!["add".into(), "uint64".into()]),
                "FUNC       add -> uint64",
            ),
            (
                Instruction::new(Opcode::Func, vec!["reset".into(), "void".into()]),
                "FUNC       reset",
            ),
            (Instruction::new(Opcode::Array, vec![3u32.into()]), "ARRAY      [3 elements]"),
            (
                Instruction::new(Opcode::Call, vec!["_name".into(), 0u32.into()]),
                "CALL       _name (0 args)",
            ),
            (
                Instruction::new(Opcode::SLoad, vec!["count".into(), 1u32.into()]),
                "SLOAD      count (1 keys)",
            ),
            (Instruction::new(Opcode::LoadArg, vec![1u32.into()]), "LOAD_ARG   1"),
            (
                Instruction::new(Opcode::MStore, vec!["res".into(), "uint64".into()]),
                "MSTORE     res uint64",
            ),
            (Instruction::new(Opcode::Add, vec![]), "ADD"),
        ];
        for (instruction, expected) in cases {
            assert_eq!(instruction.rendered, expected);
        }
    }
}
