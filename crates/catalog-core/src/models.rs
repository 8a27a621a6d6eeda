use crate::error::{AppError, FailureKind};

/// Separator used when joining breadcrumb labels into a category path.
pub const CATEGORY_SEPARATOR: &str = " > ";

/// Summary fields for one product page.
///
/// Absent fields are empty strings/vectors, never missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProductSummary {
    /// Document title of the product page.
    pub name: String,
    pub display_price: String,
    pub stock_code: String,
    /// Breadcrumb labels, root first.
    pub category_path: Vec<String>,
    pub long_description: String,
    pub image_urls: Vec<String>,
}

impl ProductSummary {
    /// Category path joined with [`CATEGORY_SEPARATOR`].
    pub fn joined_categories(&self) -> String {
        self.category_path.join(CATEGORY_SEPARATOR)
    }

    pub fn joined_images(&self) -> String {
        self.image_urls.join(", ")
    }
}

/// One labeled value of one technical characteristic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CharacteristicRow {
    pub source_product_code: String,
    pub source_url: String,
    pub stock_code: String,
    pub characteristic_name: String,
    pub characteristic_value: String,
}

/// Everything extracted from a single product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProductPage {
    pub summary: ProductSummary,
    pub characteristics: Vec<CharacteristicRow>,
    /// The page title matched the remote's access-denied marker.
    pub access_denied: bool,
}

/// Result of one unit of work (one product code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Success {
        code: String,
        page: ProductPage,
    },
    Skipped {
        code: String,
        kind: FailureKind,
        reason: String,
    },
}

impl BatchOutcome {
    pub fn skipped(code: &str, error: &AppError) -> Self {
        BatchOutcome::Skipped {
            code: code.to_string(),
            kind: error.failure_kind(),
            reason: error.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            BatchOutcome::Success { code, .. } | BatchOutcome::Skipped { code, .. } => code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Success { .. })
    }
}
