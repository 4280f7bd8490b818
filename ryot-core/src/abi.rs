//! Contract ABI: one entry per declared function.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiType {
    #[serde(rename = "type")]
    pub type_name: String,
}

impl AbiType {
    pub fn new(type_name: impl Into<String>) -> Self {
        AbiType {
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
}

impl StateMutability {
    /// Classify a function body from what it touches: any write wins over
    /// reads, and a body that touches no contract state is pure.
    pub fn from_access(reads_state: bool, writes_state: bool) -> Self {
        if writes_state {
            StateMutability::Nonpayable
        } else if reads_state {
            StateMutability::View
        } else {
            StateMutability::Pure
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiType>,
    pub outputs: Vec<AbiType>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(
        rename = "stateMutability",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<StateMutability>,
    pub visibility: Visibility,
}

impl AbiFunction {
    /// Entry for `func name(params): return_type`. A `void` return yields no
    /// outputs.
    pub fn function<'a>(
        name: &str,
        public: bool,
        param_types: impl IntoIterator<Item = &'a str>,
        return_type: &str,
    ) -> Self {
        let outputs = if return_type.is_empty() || return_type == "void" {
            Vec::new()
        } else {
            vec![AbiType::new(return_type)]
        };
        AbiFunction {
            name: name.to_string(),
            inputs: param_types.into_iter().map(AbiType::new).collect(),
            outputs,
            kind: "function".to_string(),
            state_mutability: None,
            visibility: if public {
                Visibility::Public
            } else {
                Visibility::Private
            },
        }
    }
}

pub fn to_json(abi: &[AbiFunction]) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(abi)?)
}

pub fn from_json(text: &str) -> Result<Vec<AbiFunction>, CoreError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_expected_shape() {
        let mut entry = AbiFunction::function("add", true, ["uint64", "uint64"], "uint64");
        entry.state_mutability = Some(StateMutability::Pure);

        let value: serde_json::Value =
            serde_json::from_str(&to_json(&[entry]).expect("json")).expect("valid json");
        assert_eq!(
            value,
            serde_json::json!([{
                "name": "add",
                "inputs": [{"type": "uint64"}, {"type": "uint64"}],
                "outputs": [{"type": "uint64"}],
                "type": "function",
                "stateMutability": "pure",
                "visibility": "public"
            }])
        );
    }

    #[test]
    fn omits_missing_mutability_and_void_outputs() {
        let entry = AbiFunction::function("reset", false, Vec::<&str>::new(), "void");
        let json = to_json(std::slice::from_ref(&entry)).expect("json");
        assert!(!json.contains("stateMutability"));
        assert!(json.contains("\"visibility\": \"private\""));
        assert!(json.contains("\"outputs\": []"));
        assert_eq!(from_json(&json).expect("parse back"), vec![entry]);
    }

    #[test]
    fn writes_dominate_reads() {
        assert_eq!(StateMutability::from_access(false, false), StateMutability::Pure);
        assert_eq!(StateMutability::from_access(true, false), StateMutability::View);
        assert_eq!(StateMutability::from_access(true, true), StateMutability::Nonpayable);
        assert_eq!(StateMutability::from_access(false, true), StateMutability::Nonpayable);
    }
}
