mod auth;
mod client;
pub mod types;

pub use auth::clear_tokens as clear_graph_tokens;
pub use client::GraphClient;

use crate::error::Result;
use async_trait::async_trait;
use types::{ConflictBehavior, Drive, DriveItem, DriveItemRef, WorkbookSession, WorkbookTable};

/// The Microsoft Graph surface the provisioning flow depends on. Workbook
/// edits (`update_range`, `add_table`, `add_table_row`, `close_session`) must
/// carry the session returned by `create_session` for the same item.
#[async_trait]
pub trait GraphOperations {
    async fn list_drives(&self) -> Result<Vec<Drive>>;

    async fn personal_app_folder(&self) -> Result<DriveItem>;

    async fn app_folder(&self, drive_id: &str) -> Result<DriveItem>;

    async fn create_workbook(
        &self,
        drive_id: &str,
        folder_id: &str,
        name: &str,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem>;

    async fn create_session(&self, item: &DriveItemRef) -> Result<WorkbookSession>;

    async fn update_range(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        worksheet: &str,
        address: &str,
        values: Vec<Vec<String>>,
    ) -> Result<()>;

    async fn add_table(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        address: &str,
        has_headers: bool,
    ) -> Result<WorkbookTable>;

    async fn add_table_row(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        table_id: &str,
        cells: Vec<String>,
    ) -> Result<()>;

    async fn close_session(&self, item: &DriveItemRef, session: &WorkbookSession) -> Result<()>;
}
