//! Schema-driven extraction of blocks and attributes from parsed bodies.

use std::collections::BTreeMap;

use hcl::edit::{Span, structure};

use super::{BodySchema, Error};
use crate::domain::{LineIndex, Range};

/// The parts of a body selected by a [`BodySchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyContent {
    /// Extracted attributes, keyed by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// Extracted blocks, in source order.
    pub blocks: Vec<Block>,
}

/// An extracted attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The unevaluated value expression.
    pub expr: hcl::Expression,
    /// The whole `name = value` definition.
    pub range: Range,
    /// Just the value expression.
    pub expr_range: Range,
}

/// An extracted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block type, e.g. `backend`.
    pub kind: String,
    /// The label values, one per label name in the schema.
    pub labels: Vec<String>,
    /// The extracted body.
    pub body: BodyContent,
    /// From the block type through the last label, excluding the body.
    pub def_range: Range,
    /// Just the block type keyword.
    pub type_range: Range,
    /// One range per label.
    pub label_ranges: Vec<Range>,
}

impl BodyContent {
    /// Merges another body's content into this one.
    pub fn extend(&mut self, other: Self) {
        self.attributes.extend(other.attributes);
        self.blocks.extend(other.blocks);
    }

    /// Fails if any attribute the schema marks as required is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] naming the first missing
    /// attribute, located at `range`.
    pub fn check_required(&self, schema: &BodySchema, range: &Range) -> Result<(), Error> {
        schema
            .attributes
            .iter()
            .find(|attr| attr.required && !self.attributes.contains_key(&attr.name))
            .map_or(Ok(()), |missing| {
                Err(Error::MissingAttribute {
                    name: missing.name.clone(),
                    range: range.clone(),
                })
            })
    }
}

/// Extracts the content of a parsed body.
///
/// Required attributes are checked for nested blocks only; the caller is
/// responsible for checking the top-level body, which may be spread across
/// several files.
///
/// # Errors
///
/// Returns an error if a matching block has the wrong number of labels, or a
/// nested block is missing a required attribute.
pub fn extract(
    body: &structure::Body,
    schema: &BodySchema,
    index: &LineIndex,
) -> Result<BodyContent, Error> {
    let mut content = BodyContent::default();

    for structure in body {
        match structure {
            structure::Structure::Attribute(attr) => {
                let name = attr.key.as_str();
                if schema.attribute_schema(name).is_none() {
                    continue;
                }
                // the parser rejects redefined keys, so names are unique here
                content.attributes.insert(
                    name.to_string(),
                    Attribute {
                        name: name.to_string(),
                        expr: attr.value.clone().into(),
                        range: index.range(attr.span()),
                        expr_range: index.range(attr.value.span()),
                    },
                );
            }
            structure::Structure::Block(block) => {
                let Some(block_schema) = schema.block_schema(block.ident.as_str()) else {
                    continue;
                };
                content.blocks.push(extract_block(block, block_schema, index)?);
            }
        }
    }

    Ok(content)
}

fn extract_block(
    block: &structure::Block,
    schema: &super::BlockSchema,
    index: &LineIndex,
) -> Result<Block, Error> {
    let type_range = index.range(block.ident.span());
    let label_ranges: Vec<Range> = block
        .labels
        .iter()
        .map(|label| index.range(label.span()))
        .collect();
    let def_range = label_ranges
        .last()
        .map_or_else(|| type_range.clone(), |last| type_range.to(last));

    if block.labels.len() != schema.label_names.len() {
        return Err(Error::LabelCount {
            kind: schema.kind.clone(),
            expected: schema.label_names.clone(),
            found: block.labels.len(),
            range: def_range,
        });
    }

    let body = match &schema.body {
        Some(body_schema) => {
            let body = extract(&block.body, body_schema, index)?;
            body.check_required(body_schema, &def_range)?;
            body
        }
        None => BodyContent::default(),
    };

    Ok(Block {
        kind: schema.kind.clone(),
        labels: block
            .labels
            .iter()
            .map(|label| label.as_str().to_string())
            .collect(),
        body,
        def_range,
        type_range,
        label_ranges,
    })
}
