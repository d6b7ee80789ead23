//! Microsoft Graph access split into logical submodules
//!
//! - auth: device-code credential, sign-in prompter and keyring token cache
//! - claims: access-token inspection
//! - client: the `GraphContext` handle and raw request helpers
//! - users, mail, drive: one function per remote operation

pub mod auth;
pub mod claims;
pub mod client;
pub mod drive;
pub mod mail;
pub mod users;

use crate::error::{GraphError, Result};
use crate::types::{DriveItem, DriveItemPage, MessagePage, ShareRequest, User};
use async_trait::async_trait;

pub use auth::{ConsolePrompter, DeviceCodePrompt, SignInPrompter, TokenSource, KEYRING_SERVICE_NAME};
pub use claims::TokenClaims;
pub use client::GraphContext;
pub use mail::INBOX_PAGE_SIZE;

/// Every remote operation the menu can trigger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphApi: Send + Sync {
    async fn get_user(&self) -> Result<User>;
    async fn get_user_token(&self) -> Result<String>;
    async fn get_inbox(&self) -> Result<MessagePage>;
    async fn send_mail(&self, subject: &str, body: &str, recipient: &str) -> Result<()>;
    async fn list_drive_root_children(&self) -> Result<DriveItemPage>;
    async fn get_user_id_by_email(&self, email: &str) -> Result<String>;
    async fn share_item(&self, request: &ShareRequest) -> Result<()>;
    async fn create_folder(&self, drive_id: &str, name: &str) -> Result<DriveItem>;
    async fn create_subfolder(
        &self,
        drive_id: &str,
        parent_id: &str,
        name: &str,
    ) -> Result<DriveItem>;
    async fn create_sharing_link(&self, item_id: &str, link_type: &str, scope: &str)
        -> Result<String>;
}

#[async_trait]
impl GraphApi for GraphContext {
    async fn get_user(&self) -> Result<User> {
        users::get_user(self.session()?).await
    }

    async fn get_user_token(&self) -> Result<String> {
        self.session()?.token().await
    }

    async fn get_inbox(&self) -> Result<MessagePage> {
        mail::get_inbox(self.session()?).await
    }

    async fn send_mail(&self, subject: &str, body: &str, recipient: &str) -> Result<()> {
        mail::send_mail(self.session()?, subject, body, recipient).await
    }

    async fn list_drive_root_children(&self) -> Result<DriveItemPage> {
        drive::list_drive_root_children(self.session()?).await
    }

    async fn get_user_id_by_email(&self, email: &str) -> Result<String> {
        users::get_user_id_by_email(self.session()?, email).await
    }

    async fn share_item(&self, request: &ShareRequest) -> Result<()> {
        drive::share_item(self.session()?, request).await
    }

    async fn create_folder(&self, drive_id: &str, name: &str) -> Result<DriveItem> {
        drive::create_folder(self.session()?, drive_id, name).await
    }

    async fn create_subfolder(
        &self,
        drive_id: &str,
        parent_id: &str,
        name: &str,
    ) -> Result<DriveItem> {
        drive::create_subfolder(self.session()?, drive_id, parent_id, name).await
    }

    async fn create_sharing_link(
        &self,
        item_id: &str,
        link_type: &str,
        scope: &str,
    ) -> Result<String> {
        drive::create_sharing_link(self.session()?, item_id, link_type, scope).await
    }
}

/// Trims `value`, rejecting it when nothing is left.
pub(crate) fn require<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GraphError::Input(format!("{} must not be empty", what)))
    } else {
        Ok(trimmed)
    }
}
