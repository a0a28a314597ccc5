use serde::Serialize;

use crate::client::{Category, DEFAULT_CATEGORY_COLOR, ExpenseApi};
use crate::types::CategoryId;

/// Built-in categories used whenever the API cannot provide its own list.
pub const FALLBACK_CATEGORIES: [(u64, &str, &str, &str); 8] = [
    (1, "Motoboys", "Pagamentos para entregadores", "#28a745"),
    (2, "Boletos", "Contas e boletos diversos", "#dc3545"),
    (3, "Impostos", "Impostos e taxas", "#6f42c1"),
    (4, "Aluguel", "Aluguel do imóvel", "#fd7e14"),
    (5, "Produtos", "Compra de ingredientes e produtos", "#20c997"),
    (6, "Contas Fixas", "Contas mensais fixas", "#17a2b8"),
    (7, "Internet", "Internet e telefone", "#6c757d"),
    (8, "Salários", "Pagamento de funcionários", "#ffc107"),
];

pub fn fallback_categories() -> Vec<Category> {
    FALLBACK_CATEGORIES
        .iter()
        .map(|&(id, name, description, color)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            description: Some(description.to_string()),
            color: color.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
    source: CategorySource,
}

impl Default for CategoryDirectory {
    fn default() -> Self {
        Self::fallback()
    }
}

impl CategoryDirectory {
    pub fn fallback() -> Self {
        Self {
            categories: fallback_categories(),
            source: CategorySource::Fallback,
        }
    }

    /// Fetches the category list. A failed fetch is not an error: the built-in table is used.
    pub fn load<A: ExpenseApi + ?Sized>(api: &A) -> Self {
        match api.list_categories() {
            Ok(categories) => Self {
                categories,
                source: CategorySource::Remote,
            },
            Err(err) => {
                tracing::info!(error = %err, "could not load categories, using built-in list");
                Self::fallback()
            }
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn source(&self) -> CategorySource {
        self.source
    }

    pub fn find(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Display color for a category name; unknown names get the default blue.
    pub fn color_of(&self, name: &str) -> &str {
        self.find(name)
            .map(|c| c.color.as_str())
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }
}
