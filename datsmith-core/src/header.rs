use serde::{Deserialize, Serialize};

/// Descriptive header of a DAT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatHeader {
    pub name: String,
    pub description: String,
    pub version: String,
    pub date: String,
    pub author: String,
    pub homepage: String,
    pub url: String,
    pub comment: String,
    pub category: String,
    /// Hierarchical DAT whose machine names carry the source path.
    pub superdat: bool,
}

fn fill(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        *target = value.to_string();
    }
}

impl DatHeader {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Merge another header into this one. The first non-empty value of each field wins.
    pub fn absorb(&mut self, other: &DatHeader) {
        fill(&mut self.name, &other.name);
        fill(&mut self.description, &other.description);
        fill(&mut self.version, &other.version);
        fill(&mut self.date, &other.date);
        fill(&mut self.author, &other.author);
        fill(&mut self.homepage, &other.homepage);
        fill(&mut self.url, &other.url);
        fill(&mut self.comment, &other.comment);
        fill(&mut self.category, &other.category);
        self.superdat |= other.superdat;
    }

    /// Copy with `suffix` appended to the name and description.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut header = self.clone();
        header.name = format!("{}{}", header.name, suffix);
        header.description = format!("{}{}", header.description, suffix);
        header
    }
}
