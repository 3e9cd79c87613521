use crate::config::WorkbookConfig;
use crate::error::{AppError, Result};
use crate::graph::GraphOperations;
use crate::graph::types::{DriveItem, DriveItemRef, WorkbookSession, WorkbookTable};
use crate::models::{FormDefinition, Submission};
use crate::workbook::RetryPolicy;
use crate::workbook::range::{header_range, qualified};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// How the caller picked the target drive.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveSelection {
    /// The signed-in user's own OneDrive app folder, no enumeration.
    PersonalAppFolder,
    /// A concrete drive id, typically chosen from [`ProvisioningEngine::drive_choices`].
    Drive(String),
}

#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub file: DriveItem,
    pub item: DriveItemRef,
    pub table_id: String,
}

/// Turns a signed-in user's access into a workbook ready to receive form
/// submissions: resolve the app folder, create the file, then write the
/// header row and declare it a table inside one workbook session.
pub struct ProvisioningEngine<G> {
    graph: G,
    form: FormDefinition,
    workbook: WorkbookConfig,
    retry: RetryPolicy,
}

impl<G> ProvisioningEngine<G>
where
    G: GraphOperations + Sync,
{
    pub fn new(workbook: WorkbookConfig, form: FormDefinition, graph: G) -> Self {
        Self {
            graph,
            form,
            workbook,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Mapping of drive display name to drive id, for caller-side selection.
    pub async fn drive_choices(&self) -> Result<HashMap<String, String>> {
        let drives = self.graph.list_drives().await?;
        Ok(drives.into_iter().map(|d| (d.name, d.id)).collect())
    }

    #[instrument(name = "Provisioning workbook", skip_all)]
    pub async fn provision(&self, selection: &DriveSelection) -> Result<ProvisionOutcome> {
        let folder = self.resolve_app_folder(selection).await?;

        let file = self
            .graph
            .create_workbook(
                &folder.drive_id,
                &folder.item_id,
                &self.workbook.file_name,
                self.workbook.conflict_behavior,
            )
            .await?;
        let item = DriveItemRef {
            drive_id: folder.drive_id,
            item_id: file.id.clone(),
        };

        let table = self
            .with_session(&item, async |session| {
                self.write_header_table(&item, &session).await
            })
            .await?;

        info!(file = %file.name, table = %table.id, "Workbook provisioned");

        Ok(ProvisionOutcome {
            file,
            item,
            table_id: table.id,
        })
    }

    /// Append one submission as a table row, under its own workbook session.
    #[instrument(name = "Appending submission", skip_all, fields(reference = %submission.reference))]
    pub async fn append_submission(
        &self,
        item: &DriveItemRef,
        table_id: &str,
        submission: &Submission,
    ) -> Result<()> {
        // Arity is checked before any remote call is made.
        let row = submission.to_row(&self.form)?;

        self.with_session(item, async |session| {
            self.retry
                .run("append table row", || {
                    self.graph.add_table_row(item, &session, table_id, row.clone())
                })
                .await
        })
        .await
    }

    async fn resolve_app_folder(&self, selection: &DriveSelection) -> Result<DriveItemRef> {
        match selection {
            DriveSelection::Drive(id) if id.trim().is_empty() => {
                Err(AppError::Input("no drive selected".to_string()))
            }
            DriveSelection::Drive(id) => {
                let folder = self.graph.app_folder(id).await?;
                Ok(DriveItemRef {
                    drive_id: id.clone(),
                    item_id: folder.id,
                })
            }
            DriveSelection::PersonalAppFolder => {
                let folder = self.graph.personal_app_folder().await?;
                let drive_id = folder
                    .parent_reference
                    .as_ref()
                    .map(|parent| parent.drive_id.clone())
                    .ok_or_else(|| {
                        AppError::InvalidResponse("app folder has no parent drive".to_string())
                    })?;
                Ok(DriveItemRef {
                    drive_id,
                    item_id: folder.id,
                })
            }
        }
    }

    /// Run `edit` inside a workbook session. The close call happens on every
    /// exit path of the edit phase, exactly once; a close failure never hides
    /// an edit failure.
    async fn with_session<T>(
        &self,
        item: &DriveItemRef,
        edit: impl AsyncFnOnce(WorkbookSession) -> Result<T>,
    ) -> Result<T> {
        let session = self
            .retry
            .run("create workbook session", || {
                self.graph.create_session(item)
            })
            .await?;

        let edited = edit(session.clone()).await;

        let closed = self
            .retry
            .run("close workbook session", || {
                self.graph.close_session(item, &session)
            })
            .await;

        match edited {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(edit_err) => {
                if let Err(close_err) = closed {
                    debug!(error = %close_err, "Suppressing close failure after failed edits");
                }
                Err(edit_err)
            }
        }
    }

    async fn write_header_table(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
    ) -> Result<WorkbookTable> {
        let headers = self.form.header_labels();
        let address = header_range(headers.len());

        // One rectangular write for the whole header row.
        self.retry
            .run("write header row", || {
                self.graph.update_range(
                    item,
                    session,
                    &self.workbook.worksheet,
                    &address,
                    vec![headers.clone()],
                )
            })
            .await?;

        let table_address = qualified(&self.workbook.worksheet, &address);
        self.retry
            .run("create table", || {
                self.graph.add_table(item, session, &table_address, true)
            })
            .await
    }
}

#[cfg(test)]
mod mocks {
    use super::*;
    use crate::graph::types::{ConflictBehavior, Drive, ItemReference};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    pub(crate) fn permanent_error(message: &str) -> AppError {
        AppError::Graph {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    pub(crate) fn transient_error(message: &str) -> AppError {
        AppError::Graph {
            status: StatusCode::BAD_GATEWAY,
            message: message.to_string(),
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct CallLog {
        pub list_drives: u32,
        pub app_folder: u32,
        pub create_workbook: u32,
        pub create_session: u32,
        pub update_range: u32,
        pub add_table: u32,
        pub add_table_row: u32,
        pub close_session: u32,
        pub range_addresses: Vec<String>,
        pub range_values: Vec<Vec<Vec<String>>>,
        pub table_addresses: Vec<String>,
        pub rows: Vec<Vec<String>>,
    }

    #[derive(Clone, Default)]
    pub(crate) struct MockGraphClient {
        pub drives: Vec<Drive>,
        pub fail_create_session: bool,
        pub fail_close_session: bool,
        pub fail_update_range: bool,
        /// Fail this many update_range calls with a transient error before
        /// succeeding.
        pub transient_update_range_failures: u32,
        pub calls: Arc<Mutex<CallLog>>,
    }

    #[async_trait]
    impl GraphOperations for MockGraphClient {
        async fn list_drives(&self) -> Result<Vec<Drive>> {
            self.calls.lock().unwrap().list_drives += 1;
            Ok(self.drives.clone())
        }

        async fn personal_app_folder(&self) -> Result<DriveItem> {
            Ok(DriveItem {
                id: "approot_personal".to_string(),
                name: "Apps".to_string(),
                web_url: None,
                parent_reference: Some(ItemReference {
                    drive_id: "personal_drive".to_string(),
                }),
            })
        }

        async fn app_folder(&self, _drive_id: &str) -> Result<DriveItem> {
            self.calls.lock().unwrap().app_folder += 1;
            Ok(DriveItem {
                id: "approot_1".to_string(),
                name: "Apps".to_string(),
                web_url: None,
                parent_reference: None,
            })
        }

        async fn create_workbook(
            &self,
            _drive_id: &str,
            _folder_id: &str,
            name: &str,
            _conflict_behavior: ConflictBehavior,
        ) -> Result<DriveItem> {
            self.calls.lock().unwrap().create_workbook += 1;
            Ok(DriveItem {
                id: "item_1".to_string(),
                name: name.to_string(),
                web_url: Some("https://example.test/workbook.xlsx".to_string()),
                parent_reference: None,
            })
        }

        async fn create_session(&self, _item: &DriveItemRef) -> Result<WorkbookSession> {
            self.calls.lock().unwrap().create_session += 1;
            if self.fail_create_session {
                return Err(permanent_error("createSession rejected"));
            }
            Ok(WorkbookSession {
                id: "session_1".to_string(),
            })
        }

        async fn update_range(
            &self,
            _item: &DriveItemRef,
            _session: &WorkbookSession,
            _worksheet: &str,
            address: &str,
            values: Vec<Vec<String>>,
        ) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.update_range += 1;
            calls.range_addresses.push(address.to_string());
            calls.range_values.push(values);
            if self.fail_update_range {
                return Err(permanent_error("range write rejected"));
            }
            if calls.update_range <= self.transient_update_range_failures {
                return Err(transient_error("range write timed out"));
            }
            Ok(())
        }

        async fn add_table(
            &self,
            _item: &DriveItemRef,
            _session: &WorkbookSession,
            address: &str,
            _has_headers: bool,
        ) -> Result<WorkbookTable> {
            let mut calls = self.calls.lock().unwrap();
            calls.add_table += 1;
            calls.table_addresses.push(address.to_string());
            Ok(WorkbookTable {
                id: "table_1".to_string(),
            })
        }

        async fn add_table_row(
            &self,
            _item: &DriveItemRef,
            _session: &WorkbookSession,
            _table_id: &str,
            cells: Vec<String>,
        ) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.add_table_row += 1;
            calls.rows.push(cells);
            Ok(())
        }

        async fn close_session(
            &self,
            _item: &DriveItemRef,
            _session: &WorkbookSession,
        ) -> Result<()> {
            self.calls.lock().unwrap().close_session += 1;
            if self.fail_close_session {
                return Err(permanent_error("closeSession rejected"));
            }
            Ok(())
        }
    }
}
