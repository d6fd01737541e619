use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::trace;

use crate::codec::{CodecRegistry, SmiValue};
use crate::constraint::{Constraint, Split};
use crate::error::{Error, Result};
use crate::oid::Symbol;
use crate::store::MibStore;
use crate::types::TypeKind;

/// One decoded component of a row index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexValue {
    /// The index object the component belongs to
    pub symbol: Symbol,
    pub value: SmiValue,
    /// Symbolic name when the syntax enumerates its values
    pub label: Option<String>,
}

/// Effective syntax of one index entry after walking referenced types.
struct IndexSyntax<'a> {
    key: &'a str,
    constraint: Option<&'a Constraint>,
    named_numbers: Option<&'a IndexMap<i64, String>>,
    named_bits: Option<&'a IndexMap<String, u16>>,
}

impl MibStore {
    /// Decode the index fragment `oid` of table row `row` into typed
    /// values, one per INDEX component. The fragment must be consumed
    /// exactly; primitive decoding is delegated to `codecs`.
    pub fn decode_index(
        &self,
        row: &Symbol,
        oid: &[u32],
        codecs: &CodecRegistry,
    ) -> Result<Vec<IndexValue>> {
        let object = self.object_type(row).ok_or_else(|| Error::UnresolvedImport {
            symbol: row.clone(),
        })?;
        let index: Vec<Symbol> = match object.attributes.index() {
            Some(symbols) => symbols.to_vec(),
            None => match object.attributes.augments() {
                // a row augmenting another row shares its index
                Some(augmented) => {
                    let base = self.resolve_in(row.module(), augmented);
                    self.object_type(&base)
                        .and_then(|o| o.attributes.index())
                        .map(<[Symbol]>::to_vec)
                        .ok_or(Error::UnresolvedImport { symbol: base })?
                }
                None => Vec::new(),
            },
        };

        let mut remaining = oid;
        let mut out = Vec::with_capacity(index.len());
        for symbol in index {
            let syntax = self.index_syntax(&symbol, codecs)?;
            let codec = codecs.get(syntax.key).ok_or_else(|| Error::UnknownSmiType {
                name: syntax.key.to_owned(),
            })?;
            let constraint = match syntax.constraint {
                Some(c) => Some(c.clone()),
                None => codec.constraint(),
            };
            let split = match &constraint {
                Some(c) => c
                    .extract(remaining)
                    .ok_or_else(|| Error::ConstraintViolation {
                        symbol: symbol.clone(),
                    })?,
                None => {
                    // unconstrained syntax consumes one element
                    if remaining.is_empty() {
                        return Err(Error::ConstraintViolation {
                            symbol: symbol.clone(),
                        });
                    }
                    Split {
                        content: &remaining[..1],
                        rest: &remaining[1..],
                    }
                }
            };
            let value = codec.decode(split.content)?;
            let label = label_for(&syntax, &value);
            trace!(index = %symbol, consumed = split.content.len(), "decoded index component");
            out.push(IndexValue {
                symbol,
                value,
                label,
            });
            remaining = split.rest;
        }

        if !remaining.is_empty() {
            return Err(Error::TrailingIndex {
                residue: remaining.len(),
            });
        }
        Ok(out)
    }

    /// Walk the referenced-type chain of an index object's SYNTAX down to
    /// a primitive codec key, picking up the governing constraint and any
    /// named-number maps along the way.
    fn index_syntax<'a>(
        &'a self,
        symbol: &Symbol,
        codecs: &CodecRegistry,
    ) -> Result<IndexSyntax<'a>> {
        let object = self.object_type(symbol).ok_or_else(|| Error::UnresolvedImport {
            symbol: symbol.clone(),
        })?;
        let mut current = object
            .attributes
            .syntax()
            .ok_or_else(|| Error::UnknownSmiType {
                name: symbol.name().to_owned(),
            })?;

        let mut constraint = None;
        let mut named_numbers = None;
        let mut named_bits = None;
        let mut seen: HashSet<Symbol> = HashSet::new();
        loop {
            if constraint.is_none() {
                constraint = current.constraint.as_ref();
            }
            if named_numbers.is_none() {
                named_numbers = current.named_numbers.as_ref();
            }
            if named_bits.is_none() {
                named_bits = current.named_bits.as_ref();
            }

            if current.kind != TypeKind::Referenced {
                let key = current
                    .kind
                    .base_name()
                    .ok_or_else(|| Error::UnknownSmiType {
                        name: format!("{:?}", current.kind),
                    })?;
                return Ok(IndexSyntax {
                    key,
                    constraint,
                    named_numbers,
                    named_bits,
                });
            }

            let target = current
                .reference
                .as_ref()
                .ok_or_else(|| Error::UnknownSmiType {
                    name: symbol.name().to_owned(),
                })?;
            if !seen.insert(target.clone()) {
                return Err(Error::TypeCycle {
                    symbol: target.clone(),
                });
            }
            // a name the host has a codec for is already primitive
            if codecs.contains(target.name()) {
                return Ok(IndexSyntax {
                    key: target.name(),
                    constraint,
                    named_numbers,
                    named_bits,
                });
            }
            if let Some(descriptor) = self.type_of(target) {
                current = descriptor;
                continue;
            }
            if let Some(attrs) = self.textual_convention(target) {
                current = attrs.syntax().ok_or_else(|| Error::UnknownSmiType {
                    name: target.name().to_owned(),
                })?;
                continue;
            }
            // not defined here: the local name itself is the codec key
            return Ok(IndexSyntax {
                key: target.name(),
                constraint,
                named_numbers,
                named_bits,
            });
        }
    }
}

fn label_for(syntax: &IndexSyntax<'_>, value: &SmiValue) -> Option<String> {
    let code = match value {
        SmiValue::Integer(v) => *v,
        SmiValue::Unsigned(v) => i64::try_from(*v).ok()?,
        _ => return None,
    };
    if let Some(names) = syntax.named_numbers {
        return names.get(&code).cloned();
    }
    if let Some(bits) = syntax.named_bits {
        let position = u16::try_from(code).ok()?;
        return bits
            .iter()
            .find(|(_, p)| **p == position)
            .map(|(name, _)| name.clone());
    }
    None
}
