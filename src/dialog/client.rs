//! Dialog client: dialogs, conversations and client profiles.

use super::types::{
    Conversation, ConversationData, ConverseRequest, Dialog, DialogContent, NameValue,
};
use crate::client::ServiceClient;
use crate::config::{ServiceConfig, ServiceConfigBuilder};
use crate::request::{encode_segment, RequestBuilder};
use crate::transport::Transport;
use crate::utils::{ensure_ordered, format_date, DIALOG_DATE_FORMAT};
use crate::{Error, ErrorContext, Result};
use chrono::NaiveDateTime;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const SERVICE_ID: &str = "dialog";
pub const DEFAULT_URL: &str = "https://gateway.watsonplatform.net/dialog-experimental/api";

/// Client for the dialog service.
#[derive(Clone)]
pub struct DialogService {
    client: ServiceClient,
}

impl DialogService {
    /// Configuration builder preset with this service's id and default URL.
    pub fn config() -> ServiceConfigBuilder {
        ServiceConfig::builder(SERVICE_ID).default_url(DEFAULT_URL)
    }

    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::from_config(config)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&Self::config().build()?)
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            client: ServiceClient::new(transport),
        }
    }

    /// Start or continue a conversation. Absent fields are left out of the form.
    pub async fn converse(&self, dialog_id: &str, request: &ConverseRequest) -> Result<Conversation> {
        const OP: &str = "dialog.converse";
        Error::require_id(OP, "dialogId", dialog_id)?;
        if request.conversation_id.is_none() {
            info!(dialog_id, "creating a new conversation");
        }
        if request.client_id.is_none() {
            info!(dialog_id, "creating a new client id");
        }

        let req = RequestBuilder::post(format!("/v1/dialogs/{}/conversation", encode_segment(dialog_id)))
            .form_opt("conversation_id", request.conversation_id)
            .form_opt("client_id", request.client_id)
            .form_opt("input", request.input.as_deref())
            .build()?;
        self.client.execute_json(OP, req).await
    }

    pub async fn create_conversation(&self, dialog_id: &str) -> Result<Conversation> {
        self.converse(dialog_id, &ConverseRequest::default()).await
    }

    /// Upload a dialog definition file under `name`.
    pub async fn create_dialog(&self, name: &str, dialog_file: impl AsRef<Path>) -> Result<Dialog> {
        const OP: &str = "dialog.create_dialog";
        Error::require_id(OP, "name", name)?;
        let (file, file_name) = open_upload(OP, dialog_file.as_ref()).await?;

        let req = RequestBuilder::post("/v1/dialogs")
            .file_part("file", file_name, file)
            .text_part("name", name)
            .build()?;
        self.client.execute_json(OP, req).await
    }

    pub async fn delete_dialog(&self, dialog_id: &str) -> Result<()> {
        const OP: &str = "dialog.delete_dialog";
        Error::require_id(OP, "dialogId", dialog_id)?;
        let req = RequestBuilder::delete(format!("/v1/dialogs/{}", encode_segment(dialog_id)))
            .build()?;
        self.client.execute_empty(OP, req).await
    }

    pub async fn get_content(&self, dialog_id: &str) -> Result<Vec<DialogContent>> {
        const OP: &str = "dialog.get_content";
        Error::require_id(OP, "dialogId", dialog_id)?;
        let req = RequestBuilder::get(format!("/v1/dialogs/{}/content", encode_segment(dialog_id)))
            .build()?;
        self.client.fetch_list(OP, req, "items").await
    }

    pub async fn get_dialogs(&self) -> Result<Vec<Dialog>> {
        let req = RequestBuilder::get("/v1/dialogs").build()?;
        self.client.fetch_list("dialog.get_dialogs", req, "dialogs").await
    }

    pub async fn get_profile(&self, dialog_id: &str, client_id: i64) -> Result<Vec<NameValue>> {
        const OP: &str = "dialog.get_profile";
        Error::require_id(OP, "dialogId", dialog_id)?;
        let req = RequestBuilder::get(format!("/v1/dialogs/{}/profile", encode_segment(dialog_id)))
            .query("client_id", client_id)
            .build()?;
        self.client.fetch_list(OP, req, "name_values").await
    }

    /// Export conversations held between `from` and `to`, both inclusive.
    pub async fn get_conversations(
        &self,
        dialog_id: &str,
        from: &NaiveDateTime,
        to: &NaiveDateTime,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<ConversationData>> {
        const OP: &str = "dialog.get_conversations";
        Error::require_id(OP, "dialogId", dialog_id)?;
        ensure_ordered(OP, from, to)?;

        let req = RequestBuilder::get(format!("/v1/dialogs/{}/conversation", encode_segment(dialog_id)))
            .query("date_from", format_date(from, DIALOG_DATE_FORMAT))
            .query("date_to", format_date(to, DIALOG_DATE_FORMAT))
            .query_opt("offset", offset)
            .query_opt("limit", limit)
            .build()?;
        self.client.fetch_list(OP, req, "conversations").await
    }

    /// Replace the node content of a dialog from a definition file.
    pub async fn update_content(&self, dialog_id: &str, dialog_file: impl AsRef<Path>) -> Result<()> {
        const OP: &str = "dialog.update_content";
        Error::require_id(OP, "dialogId", dialog_id)?;
        let (file, file_name) = open_upload(OP, dialog_file.as_ref()).await?;

        let req = RequestBuilder::put(format!("/v1/dialogs/{}/content", encode_segment(dialog_id)))
            .file_part("file", file_name, file)
            .text_part("dialog_id", dialog_id)
            .build()?;
        self.client.execute_empty(OP, req).await
    }

    pub async fn update_dialog(&self, dialog_id: &str, dialog_file: impl AsRef<Path>) -> Result<Dialog> {
        const OP: &str = "dialog.update_dialog";
        Error::require_id(OP, "dialogId", dialog_id)?;
        let (file, file_name) = open_upload(OP, dialog_file.as_ref()).await?;

        let req = RequestBuilder::put(format!("/v1/dialogs/{}", encode_segment(dialog_id)))
            .file_part("file", file_name, file)
            .build()?;
        self.client.execute_json(OP, req).await
    }

    pub async fn update_profile(
        &self,
        dialog_id: &str,
        client_id: i64,
        name_values: &[NameValue],
    ) -> Result<()> {
        const OP: &str = "dialog.update_profile";
        Error::require_id(OP, "dialogId", dialog_id)?;
        if name_values.is_empty() {
            return Err(Error::invalid_input_with_context(
                "nameValues can not be null or empty",
                ErrorContext::new().with_operation(OP).with_field("nameValues"),
            ));
        }

        let body = json!({
            "client_id": client_id,
            "name_values": name_values,
        });
        let req = RequestBuilder::put(format!("/v1/dialogs/{}/profile", encode_segment(dialog_id)))
            .json(&body)
            .build()?;
        self.client.execute_empty(OP, req).await
    }
}

/// Open a definition file for a multipart upload, rejecting missing files
/// before any request is built.
async fn open_upload(operation: &str, path: &Path) -> Result<(tokio::fs::File, String)> {
    let invalid = |details: String| {
        Error::invalid_input_with_context(
            "dialogFile can not be null or empty",
            ErrorContext::new()
                .with_operation(operation)
                .with_field("dialogFile")
                .with_details(details),
        )
    };
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| invalid(format!("{}: {}", path.display(), e)))?;
    let is_file = file.metadata().await.map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(invalid(format!("{} is not a regular file", path.display())));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| invalid(path.display().to_string()))?;
    Ok((file, file_name))
}
