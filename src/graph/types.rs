use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct DriveCollection {
    pub(super) value: Vec<Drive>,
}

// https://learn.microsoft.com/en-us/graph/api/resources/drive
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub drive_type: Option<String>,
}

// https://learn.microsoft.com/en-us/graph/api/resources/driveitem
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub parent_reference: Option<ItemReference>,
}

// https://learn.microsoft.com/en-us/graph/api/resources/itemreference
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    pub drive_id: String,
}

/// Drive and item ids of one file, enough to address its workbook endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveItemRef {
    pub drive_id: String,
    pub item_id: String,
}

// https://learn.microsoft.com/en-us/graph/api/resources/user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

/// Policy for when a file of the requested name already exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    Fail,
    Replace,
    #[default]
    Rename,
}

// https://learn.microsoft.com/en-us/graph/api/driveitem-post-children
#[derive(Debug, Serialize)]
pub(super) struct CreateFileRequest {
    pub(super) name: String,
    pub(super) file: FileFacet,
    #[serde(rename = "@microsoft.graph.conflictBehavior")]
    pub(super) conflict_behavior: ConflictBehavior,
}

#[derive(Debug, Serialize, Default)]
pub(super) struct FileFacet {}

// https://learn.microsoft.com/en-us/graph/api/workbook-createsession
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateSessionRequest {
    pub(super) persist_changes: bool,
}

/// Server-side workbook session. Its id travels as the `workbook-session-id`
/// header on every edit to the same file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkbookSession {
    pub id: String,
}

// https://learn.microsoft.com/en-us/graph/api/range-update
#[derive(Debug, Serialize)]
pub(super) struct RangeUpdateRequest {
    pub(super) values: Vec<Vec<String>>,
}

// https://learn.microsoft.com/en-us/graph/api/tablecollection-add
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddTableRequest {
    pub(super) address: String,
    pub(super) has_headers: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkbookTable {
    pub id: String,
}

// https://learn.microsoft.com/en-us/graph/api/tablerowcollection-add
#[derive(Debug, Serialize)]
pub(super) struct AddRowRequest {
    pub(super) values: Vec<Vec<String>>,
}
