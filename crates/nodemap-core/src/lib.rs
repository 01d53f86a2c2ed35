#![cfg_attr(docsrs, feature(doc_cfg))]
//! Property registry abstraction: named, typed camera settings.
//!
//! [`PropertyRegistry`] is the seam towards a vendor SDK's node map. Drivers
//! only talk to the registry through this trait; [`NodeMap`] is an in-memory
//! implementation built from an XML device description, used for simulated
//! devices and tests.

use std::fmt;

use bitflags::bitflags;
use nodemap_xml::AccessMode;
use thiserror::Error;

mod handle;
mod nodemap;

pub use handle::PropertyHandle;
pub use nodemap::NodeMap;
pub use nodemap_xml as xml;

/// Error type produced by property registry operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The requested node does not exist in the registry.
    #[error("node not found: {0}")]
    NotFound(String),
    /// The node exists but has a different type.
    #[error("type mismatch for node: {0}")]
    Type(String),
    /// The node access mode forbids the attempted operation.
    #[error("access denied for node: {0}")]
    Access(String),
    /// The node is declared but currently not available.
    #[error("node unavailable: {0}")]
    Unavailable(String),
    /// The provided value violates the node limits or entry set.
    #[error("range error for node: {0}")]
    Range(String),
    /// Underlying device communication failed.
    #[error("io error: {0}")]
    Io(String),
}

bitflags! {
    /// Availability and access rights of a node at the time of the query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u8 {
        const AVAILABLE = 0b001;
        const READABLE = 0b010;
        const WRITABLE = 0b100;
    }
}

impl From<AccessMode> for Access {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::RO => Access::AVAILABLE | Access::READABLE,
            AccessMode::RW => Access::AVAILABLE | Access::READABLE | Access::WRITABLE,
            AccessMode::WO => Access::AVAILABLE | Access::WRITABLE,
            AccessMode::NA => Access::empty(),
        }
    }
}

/// Interface type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Integer,
    Float,
    Enum,
    Boolean,
    String,
    Command,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::Enum => "enumeration",
            NodeKind::Boolean => "boolean",
            NodeKind::String => "string",
            NodeKind::Command => "command",
        };
        f.write_str(name)
    }
}

/// Metadata returned by [`PropertyRegistry::node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub kind: NodeKind,
    pub access: Access,
}

impl NodeInfo {
    pub fn is_available(&self) -> bool {
        self.access.contains(Access::AVAILABLE)
    }

    pub fn is_readable(&self) -> bool {
        self.access.contains(Access::AVAILABLE | Access::READABLE)
    }

    pub fn is_writable(&self) -> bool {
        self.access.contains(Access::AVAILABLE | Access::WRITABLE)
    }
}

/// Value of a readable node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Enum(String),
    Boolean(bool),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Enum(v) | Value::String(v) => f.write_str(v),
            Value::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// Live table of named, typed device settings.
///
/// Reads take `&self`; writes take `&mut self` so that a registry can only be
/// driven by one owner at a time.
pub trait PropertyRegistry {
    /// Look up a node; `None` when the device does not declare it.
    fn node(&self, name: &str) -> Option<NodeInfo>;

    fn get_integer(&self, name: &str) -> Result<i64, NodeError>;
    fn set_integer(&mut self, name: &str, value: i64) -> Result<(), NodeError>;
    /// Current `(min, max)` of an integer node.
    fn integer_range(&self, name: &str) -> Result<(i64, i64), NodeError>;

    fn get_float(&self, name: &str) -> Result<f64, NodeError>;
    fn set_float(&mut self, name: &str, value: f64) -> Result<(), NodeError>;
    /// Current `(min, max)` of a float node.
    fn float_range(&self, name: &str) -> Result<(f64, f64), NodeError>;

    /// Symbolic name of the current enumeration entry.
    fn get_enum(&self, name: &str) -> Result<String, NodeError>;
    fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), NodeError>;
    fn enum_entries(&self, name: &str) -> Result<Vec<String>, NodeError>;

    fn get_bool(&self, name: &str) -> Result<bool, NodeError>;
    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), NodeError>;

    fn get_string(&self, name: &str) -> Result<String, NodeError>;

    /// Execute a command node.
    fn execute(&mut self, name: &str) -> Result<(), NodeError>;

    /// Whether the node exists and is currently available.
    fn is_available(&self, name: &str) -> bool {
        self.node(name).is_some_and(|info| info.is_available())
    }

    /// Whether the node exists and can currently be written.
    fn is_writable(&self, name: &str) -> bool {
        self.node(name).is_some_and(|info| info.is_writable())
    }
}
