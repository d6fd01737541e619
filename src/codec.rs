use std::collections::HashMap;
use std::fmt;

use crate::constraint::Constraint;
use crate::error::Result;

/// A value decoded from an OID sub-index by a primitive codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmiValue {
    Integer(i64),
    Unsigned(u64),
    Bytes(Vec<u8>),
    Text(String),
    Oid(Vec<u32>),
    IpAddress([u8; 4]),
    Ticks(u64),
    Null,
}

impl fmt::Display for SmiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => v.fmt(f),
            Self::Unsigned(v) => v.fmt(f),
            Self::Bytes(bytes) => {
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Text(text) => text.fmt(f),
            Self::Oid(arcs) => {
                for (i, arc) in arcs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    arc.fmt(f)?;
                }
                Ok(())
            }
            Self::IpAddress(octets) => {
                write!(f, "{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
            }
            Self::Ticks(v) => write!(f, "{v} ticks"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// A primitive SMI codec supplied by the host.
///
/// The compiler core knows base types by name only; decoding an index
/// fragment and describing an intrinsic constraint (an `IpAddress` is
/// always four sub-identifiers) are delegated through this trait.
pub trait SmiCodec {
    /// Decode one extracted sub-index into a value.
    fn decode(&self, sub_index: &[u32]) -> Result<SmiValue>;

    /// The constraint intrinsic to the type, when its syntax carries none.
    fn constraint(&self) -> Option<Constraint> {
        None
    }
}

/// Capability table: base SMI type name → codec.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Box<dyn SmiCodec>>,
}

impl CodecRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, codec: impl SmiCodec + 'static) {
        self.codecs.insert(name.into(), Box::new(codec));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn SmiCodec> {
        self.codecs.get(name).map(Box::as_ref)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}
