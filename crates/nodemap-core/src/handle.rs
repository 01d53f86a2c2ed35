use std::fmt;

use crate::{Access, NodeError, NodeInfo, NodeKind, PropertyRegistry, Value};

/// Handle to a single named property, bound to a registry borrow.
///
/// Obtained through [`PropertyHandle::lookup`]; the handle stays valid for as
/// long as the registry borrow does and reads the live value on every call.
pub struct PropertyHandle<'r> {
    registry: &'r dyn PropertyRegistry,
    info: NodeInfo,
}

impl<'r> PropertyHandle<'r> {
    /// Resolve `name` in `registry`.
    pub fn lookup(registry: &'r dyn PropertyRegistry, name: &str) -> Result<Self, NodeError> {
        let info = registry
            .node(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;
        Ok(Self { registry, info })
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn kind(&self) -> NodeKind {
        self.info.kind
    }

    /// Access rights captured at lookup time.
    pub fn access(&self) -> Access {
        self.info.access
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// Read the current value using the node's own type.
    pub fn value(&self) -> Result<Value, NodeError> {
        let name = self.name();
        match self.info.kind {
            NodeKind::Integer => self.registry.get_integer(name).map(Value::Integer),
            NodeKind::Float => self.registry.get_float(name).map(Value::Float),
            NodeKind::Enum => self.registry.get_enum(name).map(Value::Enum),
            NodeKind::Boolean => self.registry.get_bool(name).map(Value::Boolean),
            NodeKind::String => self.registry.get_string(name).map(Value::String),
            NodeKind::Command => Err(NodeError::Type(name.to_string())),
        }
    }

    pub fn as_integer(&self) -> Result<i64, NodeError> {
        self.registry.get_integer(self.name())
    }

    pub fn as_float(&self) -> Result<f64, NodeError> {
        self.registry.get_float(self.name())
    }

    pub fn as_enum(&self) -> Result<String, NodeError> {
        self.registry.get_enum(self.name())
    }

    pub fn as_bool(&self) -> Result<bool, NodeError> {
        self.registry.get_bool(self.name())
    }

    /// Numeric `(min, max)` of an integer or float node.
    pub fn limits(&self) -> Result<(f64, f64), NodeError> {
        match self.info.kind {
            NodeKind::Integer => self
                .registry
                .integer_range(self.name())
                .map(|(min, max)| (min as f64, max as f64)),
            NodeKind::Float => self.registry.float_range(self.name()),
            _ => Err(NodeError::Type(self.name().to_string())),
        }
    }

    /// Entries of an enumeration node.
    pub fn entries(&self) -> Result<Vec<String>, NodeError> {
        self.registry.enum_entries(self.name())
    }
}

impl fmt::Debug for PropertyHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHandle")
            .field("name", &self.info.name)
            .field("kind", &self.info.kind)
            .field("access", &self.info.access)
            .finish()
    }
}
