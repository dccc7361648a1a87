//! Static tool catalog

use crate::protocol::Tool;

/// Ordered, immutable list of tool descriptors, built once at startup.
///
/// `tools/list` returns the catalog verbatim, so listing it repeatedly in one
/// process yields identical output.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
}

impl ToolCatalog {
    /// Build a catalog from descriptors. Duplicate names are a programming
    /// error in the declaring server.
    pub fn new(tools: Vec<Tool>) -> Self {
        debug_assert!(
            {
                let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                names.sort_unstable();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "duplicate tool name in catalog"
        );
        Self { tools }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }
}
