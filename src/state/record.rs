use serde::{Deserialize, Serialize};

/// Extracted summary of one crawled page
///
/// Every field serializes as a string; missing values are empty strings,
/// never omitted or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub body: String,
}

/// A single field update produced by one extraction event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageField {
    Title(String),
    Description(String),
    Keywords(String),
    Body(String),
}

impl PageRecord {
    /// A record is complete once its body is non-empty
    pub fn is_complete(&self) -> bool {
        !self.body.is_empty()
    }

    /// Overwrites the one field carried by `field`
    pub fn apply(&mut self, field: PageField) {
        match field {
            PageField::Title(title) => self.title = title,
            PageField::Description(description) => self.description = description,
            PageField::Keywords(keywords) => self.keywords = keywords,
            PageField::Body(body) => self.body = body,
        }
    }
}
