use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    domain::{Inventory, MergeReport, WorkflowBook},
    infra::csv_import::{read_csv_file, ImportError, ImportedRecord},
    util::{
        notice::{NoticeKind, NoticeQueue},
        settings::Settings,
    },
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
}

/// Outcome of one import, returned to the caller alongside the notices.
#[derive(Clone, Debug, Serialize)]
pub struct ImportSummary {
    pub merge: MergeReport,
    pub rows: usize,
    /// Rows carrying at least one diagnostic, in file order.
    pub flagged: Vec<ImportedRecord>,
}

/// In-memory state for one dashboard session. Nothing here outlives the process.
#[derive(Clone, Debug)]
pub struct Session {
    pub inventory: Inventory,
    pub workflows: WorkflowBook,
    pub settings: Settings,
    pub notices: NoticeQueue,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            inventory: Inventory::default(),
            notices: NoticeQueue::with_capacity(settings.notice_capacity),
            workflows: WorkflowBook::default(),
            settings,
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Reads a CSV file and merges it into the inventory.
    ///
    /// Row-level problems are reported through notices and the summary;
    /// only a failed read returns an error.
    pub async fn import_csv_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<ImportSummary, SessionError> {
        let path = path.as_ref();
        let records = match read_csv_file(path).await {
            Ok(records) => records,
            Err(err) => {
                warn!(target: "import", path = %path.display(), "import aborted: {err}");
                self.notices
                    .push(NoticeKind::Error, format!("Import failed: {err}"));
                return Err(err.into());
            }
        };
        Ok(self.apply_import(records))
    }

    /// Merges already-parsed records, recording notices for the outcome.
    pub fn apply_import(&mut self, records: Vec<ImportedRecord>) -> ImportSummary {
        let rows = records.len();
        let flagged: Vec<ImportedRecord> =
            records.iter().filter(|r| r.has_issues()).cloned().collect();

        let merge = self.inventory.merge_imported(records);
        let at_risk = self.inventory.at_risk(self.settings.at_risk_threshold).count();

        self.notices.push(
            NoticeKind::Success,
            format!(
                "Imported {} products ({} updated)",
                merge.added + merge.updated,
                merge.updated
            ),
        );
        if !flagged.is_empty() {
            self.notices.push(
                NoticeKind::Warning,
                format!("{} rows had issues; defaults were applied", flagged.len()),
            );
        }
        if merge.skipped > 0 {
            self.notices.push(
                NoticeKind::Warning,
                format!("{} rows without SKU were skipped", merge.skipped),
            );
        }

        info!(
            target: "import",
            added = merge.added,
            updated = merge.updated,
            skipped = merge.skipped,
            flagged = flagged.len(),
            at_risk,
            total = self.inventory.len(),
            "import merged"
        );

        ImportSummary {
            merge,
            rows,
            flagged,
        }
    }

    /// Recomputes every product's liquidity score under the session settings.
    pub fn rescore_inventory(&mut self) {
        self.inventory.rescore(&self.settings);
        info!(target: "inventory", products = self.inventory.len(), "rescored inventory");
    }
}
