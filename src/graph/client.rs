use super::GraphOperations;
use super::auth::GraphAuth;
use super::types::{
    AddRowRequest, AddTableRequest, ConflictBehavior, CreateFileRequest, CreateSessionRequest,
    Drive, DriveCollection, DriveItem, DriveItemRef, FileFacet, RangeUpdateRequest, User,
    WorkbookSession, WorkbookTable,
};
use crate::config::GraphConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::instrument;

const API_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Attaches workbook edits to the server-side session created by createSession.
const SESSION_HEADER: &str = "workbook-session-id";

pub struct GraphClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    /// Create a new GraphClient with authenticated access
    ///
    /// This will automatically handle token validation, refresh, or interactive
    /// authentication as needed.
    #[instrument(name = "Authenticating to Microsoft Graph", skip_all)]
    pub async fn new(config: &GraphConfig) -> Result<Self> {
        let auth = GraphAuth::new(config)?;
        let tokens = auth.get_valid_tokens().await?;

        // One connection pool for the whole flow, with a fixed per-call timeout.
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            access_token: tokens.access_token,
            base_url: API_ENDPOINT.to_string(),
        })
    }

    /// Profile of the signed-in user, used to confirm authentication worked.
    pub async fn me(&self) -> Result<User> {
        let url = format!("{}/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::checked("Failed to fetch user profile", response).await?;
        Ok(response.json().await?)
    }

    async fn checked(action: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Graph {
            status,
            message: format!("{}: {}", action, body),
        })
    }

    fn item_url(&self, item: &DriveItemRef, suffix: &str) -> String {
        format!(
            "{}/drives/{}/items/{}{}",
            self.base_url, item.drive_id, item.item_id, suffix
        )
    }
}

#[async_trait]
impl GraphOperations for GraphClient {
    #[instrument(name = "Listing drives", skip_all)]
    async fn list_drives(&self) -> Result<Vec<Drive>> {
        let url = format!("{}/me/drives", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::checked("Failed to list drives", response).await?;
        let collection: DriveCollection = response.json().await?;
        Ok(collection.value)
    }

    #[instrument(name = "Resolving personal app folder", skip_all)]
    async fn personal_app_folder(&self) -> Result<DriveItem> {
        let url = format!("{}/me/drive/special/approot", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::checked("Failed to resolve personal app folder", response).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Resolving app folder", skip_all, fields(drive_id = %drive_id))]
    async fn app_folder(&self, drive_id: &str) -> Result<DriveItem> {
        let url = format!("{}/drives/{}/special/approot", self.base_url, drive_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::checked("Failed to resolve app folder", response).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Creating workbook file", skip_all, fields(name = %name))]
    async fn create_workbook(
        &self,
        drive_id: &str,
        folder_id: &str,
        name: &str,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem> {
        let url = format!(
            "{}/drives/{}/items/{}/children",
            self.base_url, drive_id, folder_id
        );
        let body = CreateFileRequest {
            name: name.to_string(),
            file: FileFacet::default(),
            conflict_behavior,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let response = Self::checked("Failed to create workbook file", response).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Opening workbook session", skip_all)]
    async fn create_session(&self, item: &DriveItemRef) -> Result<WorkbookSession> {
        let url = self.item_url(item, "/workbook/createSession");
        let body = CreateSessionRequest {
            persist_changes: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let response = Self::checked("Failed to create workbook session", response).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Writing range", skip_all, fields(address = %address))]
    async fn update_range(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        worksheet: &str,
        address: &str,
        values: Vec<Vec<String>>,
    ) -> Result<()> {
        let url = self.item_url(
            item,
            &format!(
                "/workbook/worksheets/{}/range(address='{}')",
                worksheet, address
            ),
        );

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .header(SESSION_HEADER, &session.id)
            .json(&RangeUpdateRequest { values })
            .send()
            .await?;

        Self::checked("Failed to write range", response).await?;
        Ok(())
    }

    #[instrument(name = "Creating table", skip_all, fields(address = %address))]
    async fn add_table(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        address: &str,
        has_headers: bool,
    ) -> Result<WorkbookTable> {
        let url = self.item_url(item, "/workbook/tables/add");
        let body = AddTableRequest {
            address: address.to_string(),
            has_headers,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(SESSION_HEADER, &session.id)
            .json(&body)
            .send()
            .await?;

        let response = Self::checked("Failed to create table", response).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Appending table row", skip_all, fields(table_id = %table_id))]
    async fn add_table_row(
        &self,
        item: &DriveItemRef,
        session: &WorkbookSession,
        table_id: &str,
        cells: Vec<String>,
    ) -> Result<()> {
        let url = self.item_url(item, &format!("/workbook/tables/{}/rows/add", table_id));
        let body = AddRowRequest {
            values: vec![cells],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(SESSION_HEADER, &session.id)
            .json(&body)
            .send()
            .await?;

        Self::checked("Failed to append table row", response).await?;
        Ok(())
    }

    #[instrument(name = "Closing workbook session", skip_all)]
    async fn close_session(&self, item: &DriveItemRef, session: &WorkbookSession) -> Result<()> {
        let url = self.item_url(item, "/workbook/closeSession");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(SESSION_HEADER, &session.id)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Self::checked("Failed to close workbook session", response).await?;
        Ok(())
    }
}
