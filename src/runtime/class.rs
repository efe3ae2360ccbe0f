//! Linked class data, type handles, instances, and runtime values.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use veil_format::MethodBody;

use super::TrustDomain;

/// A runtime value.
///
/// `Null` is the default for class-typed fields and the result of a bare
/// `return` from a class-typed method.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Int(i64),
    Bool(bool),
    Str(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Null => write!(f, "null"),
        }
    }
}

/// A fully resolved type: primitives, or a class known to the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResolvedType {
    Unit,
    Int,
    Bool,
    Str,
    Class(String),
}

impl ResolvedType {
    pub(crate) fn default_value(&self) -> Value {
        match self {
            ResolvedType::Unit => Value::Unit,
            ResolvedType::Int => Value::Int(0),
            ResolvedType::Bool => Value::Bool(false),
            ResolvedType::Str => Value::Str(String::new()),
            ResolvedType::Class(_) => Value::Null,
        }
    }
}

#[derive(Debug)]
pub(crate) struct LinkedMethod {
    pub(crate) name: String,
    pub(crate) params: Vec<ResolvedType>,
    pub(crate) ret: ResolvedType,
    pub(crate) body: MethodBody,
}

/// Class data after linking. Immutable; shared between the namespace (for
/// findable classes) and every handle and instance.
#[derive(Debug)]
pub(crate) struct LinkedClass {
    pub(crate) declared_name: String,
    pub(crate) runtime_name: String,
    pub(crate) hidden: bool,
    pub(crate) trust_domain: TrustDomain,
    pub(crate) fields: Vec<(String, ResolvedType)>,
    pub(crate) methods: Vec<LinkedMethod>,
}

/// A live handle to a defined type.
///
/// For a hidden class this handle is the *only* way to reach the type; no
/// lookup can recover it once the handle is dropped.
#[derive(Debug, Clone)]
pub struct RegisteredType {
    class: Arc<LinkedClass>,
}

impl RegisteredType {
    pub(crate) fn new(class: Arc<LinkedClass>) -> Self {
        Self { class }
    }

    /// The name as written in the class definition.
    pub fn declared_name(&self) -> &str {
        &self.class.declared_name
    }

    /// The runtime name. For a hidden class this carries a `/0x…` suffix so
    /// diagnostics can identify the type without a namespace entry.
    pub fn runtime_name(&self) -> &str {
        &self.class.runtime_name
    }

    pub fn is_hidden(&self) -> bool {
        self.class.hidden
    }

    pub fn trust_domain(&self) -> TrustDomain {
        self.class.trust_domain
    }

    /// Construct one instance with default-valued fields.
    pub fn instantiate(&self) -> Instance {
        let fields = self
            .class
            .fields
            .iter()
            .map(|(_, ty)| ty.default_value())
            .collect();
        Instance {
            class: Arc::clone(&self.class),
            fields,
        }
    }
}

/// Errors from invoking a method on an instance.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvokeError {
    #[error("class '{class}' has no method '{method}'")]
    NoSuchMethod { class: String, method: String },
    #[error("method '{method}' takes {expected} argument(s); zero-argument invocation only")]
    Arity { method: String, expected: usize },
}

/// An object of a defined type.
#[derive(Debug)]
pub struct Instance {
    class: Arc<LinkedClass>,
    fields: Vec<Value>,
}

impl Instance {
    pub fn class_name(&self) -> &str {
        &self.class.runtime_name
    }

    /// Read a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.class
            .fields
            .iter()
            .position(|(n, _)| n == name)
            .and_then(|i| self.fields.get(i))
    }

    /// Invoke a zero-argument method and return its result.
    pub fn invoke(&self, method: &str) -> Result<Value, InvokeError> {
        let linked = self
            .class
            .methods
            .iter()
            .find(|m| m.name == method)
            .ok_or_else(|| InvokeError::NoSuchMethod {
                class: self.class.runtime_name.clone(),
                method: method.to_string(),
            })?;
        if !linked.params.is_empty() {
            return Err(InvokeError::Arity {
                method: method.to_string(),
                expected: linked.params.len(),
            });
        }
        let value = match &linked.body {
            MethodBody::ReturnUnit => match linked.ret {
                ResolvedType::Class(_) => Value::Null,
                _ => Value::Unit,
            },
            MethodBody::ReturnInt(v) => Value::Int(*v),
            MethodBody::ReturnBool(v) => Value::Bool(*v),
            MethodBody::ReturnStr(v) => Value::Str(v.clone()),
        };
        Ok(value)
    }
}
