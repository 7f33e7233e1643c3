//! # Metadata Document
//!
//! Self-describing representation of a record: display fields, an embedded
//! image and a small attribute list.

use crate::domain::entities::DomainRecord;
use crate::metadata::svg::render_svg;
use crate::metadata::transport::encode_image;
use serde::{Deserialize, Serialize};

/// Rendered view of a [`DomainRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub description: String,
    pub data: String,
    /// `data:image/svg+xml;base64,` URI.
    pub image: String,
    pub attributes: Vec<Attribute>,
}

impl MetadataDocument {
    /// Value of the attribute with `trait_type`, if present.
    #[must_use]
    pub fn attribute(&self, trait_type: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attr| attr.trait_type == trait_type)
            .map(|attr| &attr.value)
    }
}

/// One `{trait_type, value}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: AttributeValue,
}

/// Attribute payload; numbers stay numbers in JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(u64),
    Text(String),
}

/// Renders records into documents for one top-level domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataCodec {
    tld: String,
}

impl MetadataCodec {
    pub fn new(tld: impl Into<String>) -> Self {
        Self { tld: tld.into() }
    }

    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Fully qualified name, `name.tld`.
    #[must_use]
    pub fn qualified_name(&self, name: &str) -> String {
        format!("{name}.{}", self.tld)
    }

    /// Pure function of the record and the tld; identical input gives
    /// byte-identical output.
    #[must_use]
    pub fn render(&self, record: &DomainRecord) -> MetadataDocument {
        let svg = render_svg(&record.name, &self.tld, &record.data);
        let length = record.name.chars().count() as u64;
        MetadataDocument {
            name: self.qualified_name(&record.name),
            description: format!("A domain on the .{} name service", self.tld),
            data: record.data.clone(),
            image: encode_image(&svg),
            attributes: vec![
                Attribute {
                    trait_type: "length".to_string(),
                    value: AttributeValue::Number(length),
                },
                Attribute {
                    trait_type: "token_id".to_string(),
                    value: AttributeValue::Number(record.id),
                },
            ],
        }
    }
}
