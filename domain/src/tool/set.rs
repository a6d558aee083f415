//! Ordered, name-unique collection of tool schemas

use super::entities::ToolSchema;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The tools a request may call, in caller order.
///
/// Order matters: lexical tool ranking breaks ties by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ToolSchema>", into = "Vec<ToolSchema>")]
pub struct ToolSet {
    tools: Vec<ToolSchema>,
}

impl ToolSet {
    /// Build a set, rejecting duplicate tool names.
    pub fn new(tools: Vec<ToolSchema>) -> Result<Self, DomainError> {
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.name() == tool.name()) {
                return Err(DomainError::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self { tools })
    }

    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSchema> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Subset by position. Indices are taken in the order given; unknown
    /// indices are skipped.
    pub fn select(&self, indices: &[usize]) -> ToolSet {
        ToolSet {
            tools: indices
                .iter()
                .filter_map(|&i| self.tools.get(i).cloned())
                .collect(),
        }
    }
}

impl TryFrom<Vec<ToolSchema>> for ToolSet {
    type Error = DomainError;

    fn try_from(tools: Vec<ToolSchema>) -> Result<Self, Self::Error> {
        ToolSet::new(tools)
    }
}

impl From<ToolSet> for Vec<ToolSchema> {
    fn from(set: ToolSet) -> Self {
        set.tools
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a ToolSchema;
    type IntoIter = std::slice::Iter<'a, ToolSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}
