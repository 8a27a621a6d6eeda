use crate::error::FailureKind;
use crate::models::{BatchOutcome, CharacteristicRow, ProductSummary};

/// A code that produced no rows, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCode {
    pub code: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Outcomes split into the two output tables.
///
/// Skipped codes contribute no product and no characteristic rows.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub products: Vec<ProductSummary>,
    pub characteristics: Vec<CharacteristicRow>,
    pub skipped: Vec<SkippedCode>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: Vec<BatchOutcome>) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            match outcome {
                BatchOutcome::Success { page, .. } => {
                    report.products.push(page.summary);
                    report.characteristics.extend(page.characteristics);
                }
                BatchOutcome::Skipped { code, kind, reason } => {
                    report.skipped.push(SkippedCode { code, kind, reason });
                }
            }
        }
        report
    }

    pub fn succeeded(&self) -> usize {
        self.products.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
