//! Parse GenICam-style XML device descriptions into node declarations.
//!
//! The description format mirrors the subset of a GenApi register
//! description needed to stand up an in-memory node map:
//!
//! ```xml
//! <RegisterDescription ModelName="Blackfly S BFS-U3-16S2C" VendorName="FLIR">
//!     <Integer Name="Width">
//!         <Value>1440</Value>
//!         <Min>8</Min>
//!         <pMax>WidthMax</pMax>
//!         <Inc>8</Inc>
//!         <AccessMode>RW</AccessMode>
//!     </Integer>
//! </RegisterDescription>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

const ROOT_ELEMENT: &[u8] = b"RegisterDescription";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid descriptor: {0}")]
    Invalid(String),
}

/// Access rights declared for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Read-only.
    RO,
    /// Read-write.
    #[default]
    RW,
    /// Write-only.
    WO,
    /// Declared but currently not available on the device.
    NA,
}

impl AccessMode {
    fn parse(value: &str) -> Result<Self, XmlError> {
        match value.trim() {
            "RO" => Ok(AccessMode::RO),
            "RW" => Ok(AccessMode::RW),
            "WO" => Ok(AccessMode::WO),
            "NA" => Ok(AccessMode::NA),
            other => Err(XmlError::Invalid(format!("unknown access mode '{other}'"))),
        }
    }
}

/// Declaration of a single node as found in the description.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDecl {
    Integer {
        name: String,
        access: AccessMode,
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
        /// Node whose current value is the lower limit.
        p_min: Option<String>,
        /// Node whose current value is the upper limit.
        p_max: Option<String>,
        inc: Option<i64>,
        unit: Option<String>,
        /// Enumeration selecting which value slot is addressed.
        selector: Option<String>,
    },
    Float {
        name: String,
        access: AccessMode,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        p_min: Option<String>,
        p_max: Option<String>,
        unit: Option<String>,
        selector: Option<String>,
    },
    Enum {
        name: String,
        access: AccessMode,
        entries: Vec<String>,
        /// Current entry; defaults to the first declared entry.
        value: Option<String>,
        selector: Option<String>,
    },
    Boolean {
        name: String,
        access: AccessMode,
        value: bool,
        selector: Option<String>,
    },
    String {
        name: String,
        access: AccessMode,
        value: String,
    },
    Command {
        name: String,
        access: AccessMode,
    },
}

impl NodeDecl {
    /// Feature name of the declaration.
    pub fn name(&self) -> &str {
        match self {
            NodeDecl::Integer { name, .. }
            | NodeDecl::Float { name, .. }
            | NodeDecl::Enum { name, .. }
            | NodeDecl::Boolean { name, .. }
            | NodeDecl::String { name, .. }
            | NodeDecl::Command { name, .. } => name,
        }
    }
}

/// Parsed device description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDescription {
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// `major.minor.sub` assembled from the schema attributes.
    pub schema_version: Option<String>,
    pub nodes: Vec<NodeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Integer,
    Float,
    Enum,
    Boolean,
    String,
    Command,
}

impl Kind {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"Integer" => Some(Kind::Integer),
            b"Float" => Some(Kind::Float),
            b"Enumeration" => Some(Kind::Enum),
            b"Boolean" => Some(Kind::Boolean),
            b"String" | b"StringReg" => Some(Kind::String),
            b"Command" => Some(Kind::Command),
            _ => None,
        }
    }
}

/// Node element collected while walking the document.
#[derive(Debug)]
struct PendingNode {
    kind: Kind,
    name: String,
    fields: Vec<(String, String)>,
    entries: Vec<String>,
}

impl PendingNode {
    fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.field(key).map(str::to_string)
    }

    fn access(&self) -> Result<AccessMode, XmlError> {
        self.field("AccessMode")
            .map(AccessMode::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    fn int(&self, key: &str) -> Result<Option<i64>, XmlError> {
        self.field(key)
            .map(|value| parse_int(&self.name, key, value))
            .transpose()
    }

    fn float(&self, key: &str) -> Result<Option<f64>, XmlError> {
        self.field(key)
            .map(|value| parse_float(&self.name, key, value))
            .transpose()
    }

    fn finish(self) -> Result<NodeDecl, XmlError> {
        let access = self.access()?;
        let decl = match self.kind {
            Kind::Integer => NodeDecl::Integer {
                value: self.int("Value")?.unwrap_or_default(),
                min: self.int("Min")?,
                max: self.int("Max")?,
                p_min: self.owned("pMin"),
                p_max: self.owned("pMax"),
                inc: self.int("Inc")?,
                unit: self.owned("Unit"),
                selector: self.owned("pSelector"),
                access,
                name: self.name,
            },
            Kind::Float => NodeDecl::Float {
                value: self.float("Value")?.unwrap_or_default(),
                min: self.float("Min")?,
                max: self.float("Max")?,
                p_min: self.owned("pMin"),
                p_max: self.owned("pMax"),
                unit: self.owned("Unit"),
                selector: self.owned("pSelector"),
                access,
                name: self.name,
            },
            Kind::Enum => {
                if self.entries.is_empty() {
                    return Err(XmlError::Invalid(format!(
                        "enumeration {} declares no entries",
                        self.name
                    )));
                }
                let value = self.owned("Value");
                if let Some(current) = &value {
                    if !self.entries.iter().any(|entry| entry == current) {
                        return Err(XmlError::Invalid(format!(
                            "enumeration {} has no entry '{current}'",
                            self.name
                        )));
                    }
                }
                NodeDecl::Enum {
                    selector: self.owned("pSelector"),
                    access,
                    entries: self.entries,
                    value,
                    name: self.name,
                }
            }
            Kind::Boolean => NodeDecl::Boolean {
                value: self
                    .field("Value")
                    .map(|value| parse_bool(&self.name, value))
                    .transpose()?
                    .unwrap_or(false),
                selector: self.owned("pSelector"),
                access,
                name: self.name,
            },
            Kind::String => NodeDecl::String {
                value: self.owned("Value").unwrap_or_default(),
                access,
                name: self.name,
            },
            Kind::Command => NodeDecl::Command {
                access,
                name: self.name,
            },
        };
        Ok(decl)
    }
}

/// Parse a device description document.
pub fn parse(xml: &str) -> Result<DeviceDescription, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut description = DeviceDescription::default();
    let mut seen_root = false;
    let mut pending: Option<PendingNode> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                match depth {
                    1 => {
                        read_root(&e, &mut description)?;
                        seen_root = true;
                    }
                    2 => pending = open_node(&e)?,
                    3 => {
                        if let Some(node) = pending.as_mut() {
                            if e.name().as_ref() == b"EnumEntry" {
                                // Children such as the entry's numeric Value are skipped.
                                push_entry(node, &e)?;
                            } else {
                                field =
                                    Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => match depth + 1 {
                1 => {
                    read_root(&e, &mut description)?;
                    seen_root = true;
                }
                2 => {
                    if let Some(node) = open_node(&e)? {
                        description.nodes.push(node.finish()?);
                    }
                }
                3 => {
                    if let Some(node) = pending.as_mut() {
                        if e.name().as_ref() == b"EnumEntry" {
                            push_entry(node, &e)?;
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(text)) => {
                if let (Some(node), Some(key)) = (pending.as_mut(), field.as_ref()) {
                    let value = text
                        .unescape()
                        .map_err(|err| XmlError::Xml(err.to_string()))?;
                    node.fields.push((key.clone(), value.trim().to_string()));
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    2 => {
                        if let Some(node) = pending.take() {
                            description.nodes.push(node.finish()?);
                        }
                    }
                    3 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(XmlError::Invalid("missing RegisterDescription root".into()));
    }
    debug!(
        model = description.model.as_deref().unwrap_or("unknown"),
        nodes = description.nodes.len(),
        "parsed device description"
    );
    Ok(description)
}

fn read_root(event: &BytesStart<'_>, description: &mut DeviceDescription) -> Result<(), XmlError> {
    if event.name().as_ref() != ROOT_ELEMENT {
        return Err(XmlError::Invalid(format!(
            "unexpected root element '{}'",
            String::from_utf8_lossy(event.name().as_ref())
        )));
    }
    description.model = attribute_value(event, b"ModelName")?;
    description.vendor = attribute_value(event, b"VendorName")?;
    description.schema_version = extract_schema_version(event);
    Ok(())
}

fn open_node(event: &BytesStart<'_>) -> Result<Option<PendingNode>, XmlError> {
    let Some(kind) = Kind::from_tag(event.name().as_ref()) else {
        debug!(
            element = %String::from_utf8_lossy(event.name().as_ref()),
            "skipping unsupported node element"
        );
        return Ok(None);
    };
    let name = attribute_value(event, b"Name")?.ok_or_else(|| {
        XmlError::Invalid(format!(
            "{} element without Name attribute",
            String::from_utf8_lossy(event.name().as_ref())
        ))
    })?;
    Ok(Some(PendingNode {
        kind,
        name,
        fields: Vec::new(),
        entries: Vec::new(),
    }))
}

fn push_entry(node: &mut PendingNode, event: &BytesStart<'_>) -> Result<(), XmlError> {
    let entry = attribute_value(event, b"Name")?
        .ok_or_else(|| XmlError::Invalid(format!("unnamed entry in {}", node.name)))?;
    node.entries.push(entry);
    Ok(())
}

fn extract_schema_version(event: &BytesStart<'_>) -> Option<String> {
    let major = attribute_value(event, b"SchemaMajorVersion").ok().flatten();
    let minor = attribute_value(event, b"SchemaMinorVersion").ok().flatten();
    let sub = attribute_value(event, b"SchemaSubMinorVersion")
        .ok()
        .flatten();
    if major.is_none() && minor.is_none() && sub.is_none() {
        None
    } else {
        let major = major.unwrap_or_else(|| "0".to_string());
        let minor = minor.unwrap_or_else(|| "0".to_string());
        let sub = sub.unwrap_or_else(|| "0".to_string());
        Some(format!("{major}.{minor}.{sub}"))
    }
}

fn attribute_value(event: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, XmlError> {
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| XmlError::Xml(err.to_string()))?;
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                return Ok(None);
            }
            return Ok(Some(trimmed));
        }
    }
    Ok(None)
}

fn parse_int(node: &str, key: &str, value: &str) -> Result<i64, XmlError> {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parsed = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse()
    };
    parsed
        .map(|v| if negative { -v } else { v })
        .map_err(|err| XmlError::Invalid(format!("{node}/{key}: invalid integer '{value}': {err}")))
}

fn parse_float(node: &str, key: &str, value: &str) -> Result<f64, XmlError> {
    value
        .trim()
        .parse()
        .map_err(|err| XmlError::Invalid(format!("{node}/{key}: invalid float '{value}': {err}")))
}

fn parse_bool(node: &str, value: &str) -> Result<bool, XmlError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(XmlError::Invalid(format!(
            "{node}: invalid boolean '{other}'"
        ))),
    }
}
