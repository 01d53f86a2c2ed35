//! In-memory node map built from a [`DeviceDescription`].

use std::collections::HashMap;

use nodemap_xml::{DeviceDescription, NodeDecl, XmlError};
use tracing::{debug, warn};

use crate::{Access, NodeError, NodeInfo, NodeKind, PropertyRegistry, Value};

/// Limit that is either declared inline or read from another node.
#[derive(Debug, Clone)]
enum Limit<T> {
    Fixed(T),
    Node(String),
}

impl<T> Limit<T> {
    fn new(fixed: Option<T>, pointer: Option<String>, unbounded: T) -> Self {
        match (pointer, fixed) {
            (Some(node), _) => Limit::Node(node),
            (None, Some(value)) => Limit::Fixed(value),
            (None, None) => Limit::Fixed(unbounded),
        }
    }
}

/// Value storage addressed by the current entry of an optional selector.
#[derive(Debug, Clone)]
struct Slots<T> {
    default: T,
    selected: HashMap<String, T>,
}

impl<T: Clone> Slots<T> {
    fn new(default: T) -> Self {
        Self {
            default,
            selected: HashMap::new(),
        }
    }

    fn get(&self, key: Option<&str>) -> T {
        key.and_then(|key| self.selected.get(key))
            .unwrap_or(&self.default)
            .clone()
    }

    fn set(&mut self, key: Option<&str>, value: T) {
        match key {
            Some(key) => {
                self.selected.insert(key.to_string(), value);
            }
            None => self.default = value,
        }
    }
}

#[derive(Debug)]
struct IntegerNode {
    access: Access,
    min: Limit<i64>,
    max: Limit<i64>,
    inc: Option<i64>,
    selector: Option<String>,
    value: Slots<i64>,
}

#[derive(Debug)]
struct FloatNode {
    access: Access,
    min: Limit<f64>,
    max: Limit<f64>,
    selector: Option<String>,
    value: Slots<f64>,
}

#[derive(Debug)]
struct EnumNode {
    access: Access,
    entries: Vec<String>,
    selector: Option<String>,
    value: Slots<String>,
}

#[derive(Debug)]
struct BooleanNode {
    access: Access,
    selector: Option<String>,
    value: Slots<bool>,
}

#[derive(Debug)]
struct StringNode {
    access: Access,
    value: String,
}

#[derive(Debug)]
struct CommandNode {
    access: Access,
    executions: u32,
}

#[derive(Debug)]
enum Node {
    Integer(IntegerNode),
    Float(FloatNode),
    Enum(EnumNode),
    Boolean(BooleanNode),
    String(StringNode),
    Command(CommandNode),
}

impl Node {
    fn kind(&self) -> NodeKind {
        match self {
            Node::Integer(_) => NodeKind::Integer,
            Node::Float(_) => NodeKind::Float,
            Node::Enum(_) => NodeKind::Enum,
            Node::Boolean(_) => NodeKind::Boolean,
            Node::String(_) => NodeKind::String,
            Node::Command(_) => NodeKind::Command,
        }
    }

    fn access(&self) -> Access {
        match self {
            Node::Integer(node) => node.access,
            Node::Float(node) => node.access,
            Node::Enum(node) => node.access,
            Node::Boolean(node) => node.access,
            Node::String(node) => node.access,
            Node::Command(node) => node.access,
        }
    }
}

/// Runtime node map holding device values in memory.
///
/// Limits may point at other nodes (`Width` bounded by `WidthMax`), and nodes
/// with a selector keep one value per selector entry (`BalanceRatio` per
/// `BalanceRatioSelector`).
#[derive(Debug)]
pub struct NodeMap {
    model: Option<String>,
    vendor: Option<String>,
    version: Option<String>,
    nodes: HashMap<String, Node>,
}

impl NodeMap {
    /// Parse an XML device description and build the node map from it.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        nodemap_xml::parse(xml).map(NodeMap::from)
    }

    /// Model name declared by the description.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    /// Schema version string of the description.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Sorted node names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of times a command node was executed.
    pub fn executions(&self, name: &str) -> Result<u32, NodeError> {
        match self.nodes.get(name) {
            Some(Node::Command(node)) => Ok(node.executions),
            Some(_) => Err(NodeError::Type(name.to_string())),
            None => Err(NodeError::NotFound(name.to_string())),
        }
    }

    /// Device-side update: replace the current value of a node, ignoring
    /// access rights and limits. Models firmware-driven changes such as a new
    /// sensor mode lowering the achievable frame rate.
    pub fn store(&mut self, name: &str, value: Value) -> Result<(), NodeError> {
        let key = self.selector_key(name)?;
        let key = key.as_deref();
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;
        match (node, value) {
            (Node::Integer(node), Value::Integer(v)) => node.value.set(key, v),
            (Node::Float(node), Value::Float(v)) => node.value.set(key, v),
            (Node::Enum(node), Value::Enum(entry)) => {
                if !node.entries.contains(&entry) {
                    return Err(NodeError::Range(format!("{name}: no entry '{entry}'")));
                }
                node.value.set(key, entry);
            }
            (Node::Boolean(node), Value::Boolean(v)) => node.value.set(key, v),
            (Node::String(node), Value::String(v)) => node.value = v,
            _ => return Err(NodeError::Type(name.to_string())),
        }
        debug!(node = %name, "device-side value update");
        Ok(())
    }

    /// Change the access rights of a node, e.g. to model a feature locked
    /// while streaming.
    pub fn set_access(&mut self, name: &str, access: Access) -> Result<(), NodeError> {
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;
        match node {
            Node::Integer(node) => node.access = access,
            Node::Float(node) => node.access = access,
            Node::Enum(node) => node.access = access,
            Node::Boolean(node) => node.access = access,
            Node::String(node) => node.access = access,
            Node::Command(node) => node.access = access,
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&Node, NodeError> {
        self.nodes
            .get(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))
    }

    fn selector_of(&self, name: &str) -> Option<&str> {
        match self.nodes.get(name)? {
            Node::Integer(node) => node.selector.as_deref(),
            Node::Float(node) => node.selector.as_deref(),
            Node::Enum(node) => node.selector.as_deref(),
            Node::Boolean(node) => node.selector.as_deref(),
            Node::String(_) | Node::Command(_) => None,
        }
    }

    /// Current entry of the node's selector, if it has one.
    fn selector_key(&self, name: &str) -> Result<Option<String>, NodeError> {
        match self.selector_of(name) {
            Some(selector) => match self.nodes.get(selector) {
                Some(Node::Enum(node)) => Ok(Some(node.value.get(None))),
                Some(_) => Err(NodeError::Type(format!(
                    "selector {selector} of {name} is not an enumeration"
                ))),
                None => Err(NodeError::NotFound(selector.to_string())),
            },
            None => Ok(None),
        }
    }

    fn numeric(&self, name: &str) -> Result<f64, NodeError> {
        match self.lookup(name)? {
            Node::Integer(_) => Ok(self.get_integer(name)? as f64),
            Node::Float(_) => self.get_float(name),
            _ => Err(NodeError::Type(name.to_string())),
        }
    }

    fn resolve_int(&self, limit: &Limit<i64>) -> Result<i64, NodeError> {
        match limit {
            Limit::Fixed(value) => Ok(*value),
            Limit::Node(name) => match self.lookup(name)? {
                Node::Integer(_) => self.get_integer(name),
                _ => Ok(self.numeric(name)?.round() as i64),
            },
        }
    }

    fn resolve_float(&self, limit: &Limit<f64>) -> Result<f64, NodeError> {
        match limit {
            Limit::Fixed(value) => Ok(*value),
            Limit::Node(name) => self.numeric(name),
        }
    }

    fn integer_node(&self, name: &str) -> Result<&IntegerNode, NodeError> {
        match self.lookup(name)? {
            Node::Integer(node) => Ok(node),
            _ => Err(NodeError::Type(name.to_string())),
        }
    }

    fn float_node(&self, name: &str) -> Result<&FloatNode, NodeError> {
        match self.lookup(name)? {
            Node::Float(node) => Ok(node),
            _ => Err(NodeError::Type(name.to_string())),
        }
    }

    fn enum_node(&self, name: &str) -> Result<&EnumNode, NodeError> {
        match self.lookup(name)? {
            Node::Enum(node) => Ok(node),
            _ => Err(NodeError::Type(name.to_string())),
        }
    }

    fn bool_node(&self, name: &str) -> Result<&BooleanNode, NodeError> {
        match self.lookup(name)? {
            Node::Boolean(node) => Ok(node),
            _ => Err(NodeError::Type(name.to_string())),
        }
    }
}

impl PropertyRegistry for NodeMap {
    fn node(&self, name: &str) -> Option<NodeInfo> {
        self.nodes.get(name).map(|node| NodeInfo {
            name: name.to_string(),
            kind: node.kind(),
            access: node.access(),
        })
    }

    fn get_integer(&self, name: &str) -> Result<i64, NodeError> {
        let node = self.integer_node(name)?;
        ensure_readable(node.access, name)?;
        let key = self.selector_key(name)?;
        Ok(node.value.get(key.as_deref()))
    }

    fn set_integer(&mut self, name: &str, value: i64) -> Result<(), NodeError> {
        let node = self.integer_node(name)?;
        ensure_writable(node.access, name)?;
        let (min, max) = self.integer_range(name)?;
        if value < min || value > max {
            return Err(NodeError::Range(format!(
                "{name}: {value} outside [{min}, {max}]"
            )));
        }
        if let Some(inc) = node.inc {
            if inc != 0 && value.abs_diff(min) % inc.unsigned_abs() != 0 {
                return Err(NodeError::Range(format!(
                    "{name}: {value} is not a multiple of {inc} above {min}"
                )));
            }
        }
        let key = self.selector_key(name)?;
        debug!(node = %name, value, "write integer feature");
        if let Some(Node::Integer(node)) = self.nodes.get_mut(name) {
            node.value.set(key.as_deref(), value);
        }
        Ok(())
    }

    fn integer_range(&self, name: &str) -> Result<(i64, i64), NodeError> {
        let node = self.integer_node(name)?;
        if !node.access.contains(Access::AVAILABLE) {
            return Err(NodeError::Unavailable(name.to_string()));
        }
        Ok((self.resolve_int(&node.min)?, self.resolve_int(&node.max)?))
    }

    fn get_float(&self, name: &str) -> Result<f64, NodeError> {
        let node = self.float_node(name)?;
        ensure_readable(node.access, name)?;
        let key = self.selector_key(name)?;
        Ok(node.value.get(key.as_deref()))
    }

    fn set_float(&mut self, name: &str, value: f64) -> Result<(), NodeError> {
        let node = self.float_node(name)?;
        ensure_writable(node.access, name)?;
        let (min, max) = self.float_range(name)?;
        if !(min..=max).contains(&value) {
            return Err(NodeError::Range(format!(
                "{name}: {value} outside [{min}, {max}]"
            )));
        }
        let key = self.selector_key(name)?;
        debug!(node = %name, value, "write float feature");
        if let Some(Node::Float(node)) = self.nodes.get_mut(name) {
            node.value.set(key.as_deref(), value);
        }
        Ok(())
    }

    fn float_range(&self, name: &str) -> Result<(f64, f64), NodeError> {
        let node = self.float_node(name)?;
        if !node.access.contains(Access::AVAILABLE) {
            return Err(NodeError::Unavailable(name.to_string()));
        }
        Ok((
            self.resolve_float(&node.min)?,
            self.resolve_float(&node.max)?,
        ))
    }

    fn get_enum(&self, name: &str) -> Result<String, NodeError> {
        let node = self.enum_node(name)?;
        ensure_readable(node.access, name)?;
        let key = self.selector_key(name)?;
        Ok(node.value.get(key.as_deref()))
    }

    fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), NodeError> {
        let node = self.enum_node(name)?;
        ensure_writable(node.access, name)?;
        if !node.entries.iter().any(|candidate| candidate == entry) {
            return Err(NodeError::Range(format!("{name}: no entry '{entry}'")));
        }
        let key = self.selector_key(name)?;
        debug!(node = %name, entry, "write enum feature");
        if let Some(Node::Enum(node)) = self.nodes.get_mut(name) {
            node.value.set(key.as_deref(), entry.to_string());
        }
        Ok(())
    }

    fn enum_entries(&self, name: &str) -> Result<Vec<String>, NodeError> {
        Ok(self.enum_node(name)?.entries.clone())
    }

    fn get_bool(&self, name: &str) -> Result<bool, NodeError> {
        let node = self.bool_node(name)?;
        ensure_readable(node.access, name)?;
        let key = self.selector_key(name)?;
        Ok(node.value.get(key.as_deref()))
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), NodeError> {
        let node = self.bool_node(name)?;
        ensure_writable(node.access, name)?;
        let key = self.selector_key(name)?;
        debug!(node = %name, value, "write boolean feature");
        if let Some(Node::Boolean(node)) = self.nodes.get_mut(name) {
            node.value.set(key.as_deref(), value);
        }
        Ok(())
    }

    fn get_string(&self, name: &str) -> Result<String, NodeError> {
        match self.lookup(name)? {
            Node::String(node) => {
                ensure_readable(node.access, name)?;
                Ok(node.value.clone())
            }
            _ => Err(NodeError::Type(name.to_string())),
        }
    }

    fn execute(&mut self, name: &str) -> Result<(), NodeError> {
        match self.nodes.get_mut(name) {
            Some(Node::Command(node)) => {
                ensure_writable(node.access, name)?;
                node.executions += 1;
                debug!(node = %name, "execute command");
                Ok(())
            }
            Some(_) => Err(NodeError::Type(name.to_string())),
            None => Err(NodeError::NotFound(name.to_string())),
        }
    }
}

impl From<DeviceDescription> for NodeMap {
    fn from(description: DeviceDescription) -> Self {
        let mut nodes = HashMap::new();
        for decl in description.nodes {
            if nodes.contains_key(decl.name()) {
                warn!(node = %decl.name(), "duplicate node declaration, keeping the last");
            }
            let (name, node) = match decl {
                NodeDecl::Integer {
                    name,
                    access,
                    value,
                    min,
                    max,
                    p_min,
                    p_max,
                    inc,
                    unit: _,
                    selector,
                } => (
                    name,
                    Node::Integer(IntegerNode {
                        access: access.into(),
                        min: Limit::new(min, p_min, i64::MIN),
                        max: Limit::new(max, p_max, i64::MAX),
                        inc,
                        selector,
                        value: Slots::new(value),
                    }),
                ),
                NodeDecl::Float {
                    name,
                    access,
                    value,
                    min,
                    max,
                    p_min,
                    p_max,
                    unit: _,
                    selector,
                } => (
                    name,
                    Node::Float(FloatNode {
                        access: access.into(),
                        min: Limit::new(min, p_min, f64::MIN),
                        max: Limit::new(max, p_max, f64::MAX),
                        selector,
                        value: Slots::new(value),
                    }),
                ),
                NodeDecl::Enum {
                    name,
                    access,
                    entries,
                    value,
                    selector,
                } => {
                    let current = value
                        .or_else(|| entries.first().cloned())
                        .unwrap_or_default();
                    (
                        name,
                        Node::Enum(EnumNode {
                            access: access.into(),
                            entries,
                            selector,
                            value: Slots::new(current),
                        }),
                    )
                }
                NodeDecl::Boolean {
                    name,
                    access,
                    value,
                    selector,
                } => (
                    name,
                    Node::Boolean(BooleanNode {
                        access: access.into(),
                        selector,
                        value: Slots::new(value),
                    }),
                ),
                NodeDecl::String {
                    name,
                    access,
                    value,
                } => (
                    name,
                    Node::String(StringNode {
                        access: access.into(),
                        value,
                    }),
                ),
                NodeDecl::Command { name, access } => (
                    name,
                    Node::Command(CommandNode {
                        access: access.into(),
                        executions: 0,
                    }),
                ),
            };
            nodes.insert(name, node);
        }

        NodeMap {
            model: description.model,
            vendor: description.vendor,
            version: description.schema_version,
            nodes,
        }
    }
}

fn ensure_readable(access: Access, name: &str) -> Result<(), NodeError> {
    if !access.contains(Access::AVAILABLE) {
        return Err(NodeError::Unavailable(name.to_string()));
    }
    if !access.contains(Access::READABLE) {
        return Err(NodeError::Access(name.to_string()));
    }
    Ok(())
}

fn ensure_writable(access: Access, name: &str) -> Result<(), NodeError> {
    if !access.contains(Access::AVAILABLE) {
        return Err(NodeError::Unavailable(name.to_string()));
    }
    if !access.contains(Access::WRITABLE) {
        return Err(NodeError::Access(name.to_string()));
    }
    Ok(())
}
