/// Describes the attributes and nested blocks to extract from a body.
///
/// Anything in the body that the schema does not mention is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodySchema {
    /// Attributes to extract.
    pub attributes: Vec<AttributeSchema>,
    /// Nested blocks to extract.
    pub blocks: Vec<BlockSchema>,
}

impl BodySchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an optional attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeSchema {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Adds an attribute that must be present in every matching body.
    #[must_use]
    pub fn required_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeSchema {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Adds a nested block.
    #[must_use]
    pub fn block(mut self, block: BlockSchema) -> Self {
        self.blocks.push(block);
        self
    }

    /// Looks up the schema of a named attribute.
    #[must_use]
    pub fn attribute_schema(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Looks up the schema of a block type.
    #[must_use]
    pub fn block_schema(&self, kind: &str) -> Option<&BlockSchema> {
        self.blocks.iter().find(|block| block.kind == kind)
    }
}

/// Describes a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    /// The attribute name.
    pub name: String,
    /// Whether extraction fails when the attribute is absent.
    pub required: bool,
}

/// Describes a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSchema {
    /// The block type, e.g. `terraform` or `backend`.
    pub kind: String,
    /// The names of the labels the block must carry, in order.
    ///
    /// Matching blocks must have exactly this many labels.
    pub label_names: Vec<String>,
    /// The schema of the block body. `None` extracts nothing from the body.
    pub body: Option<BodySchema>,
}

impl BlockSchema {
    /// Creates a schema for an unlabelled block with an empty body.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label_names: Vec::new(),
            body: None,
        }
    }

    /// Appends a required label.
    #[must_use]
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.label_names.push(name.into());
        self
    }

    /// Sets the body schema.
    #[must_use]
    pub fn body(mut self, body: BodySchema) -> Self {
        self.body = Some(body);
        self
    }
}
