use crate::error::{GraphError, Result};
use crate::graph_api::client::Session;
use crate::graph_api::require;
use crate::types::{
    Collection, CreateLinkRequest, DriveItem, DriveItemPage, InviteRequest, NewFolder, Permission,
    ShareRequest,
};

// First page of the signed-in user's drive root
pub async fn list_drive_root_children(session: &Session) -> Result<DriveItemPage> {
    let url = session.endpoint(&["me", "drive", "root", "children"])?;
    let page: Collection<DriveItem> = session.get_json(url).await?;
    Ok(DriveItemPage {
        more_available: page.next_link.is_some(),
        items: page.value,
    })
}

/// Invites one recipient to an item in the signed-in user's drive.
pub async fn share_item(session: &Session, request: &ShareRequest) -> Result<()> {
    let item_id = require(&request.item_id, "item id")?;
    require(&request.recipient, "recipient email")?;
    require(&request.role, "role")?;

    let url = session.endpoint(&["me", "drive", "items", item_id, "invite"])?;
    let granted: Collection<Permission> = session
        .post_json(url, &InviteRequest::from(request))
        .await?;
    tracing::info!(
        "shared {} with {} ({} permission(s) granted)",
        item_id,
        request.recipient,
        granted.value.len()
    );
    Ok(())
}

// Create a folder at the root of the given drive, renaming on conflict
pub async fn create_folder(session: &Session, drive_id: &str, name: &str) -> Result<DriveItem> {
    let drive_id = require(drive_id, "drive id")?;
    let name = require(name, "folder name")?;

    let url = session.endpoint(&["drives", drive_id, "root", "children"])?;
    session.post_json(url, &NewFolder::named(name)).await
}

// Create a folder under an existing folder, renaming on conflict
pub async fn create_subfolder(
    session: &Session,
    drive_id: &str,
    parent_id: &str,
    name: &str,
) -> Result<DriveItem> {
    let drive_id = require(drive_id, "drive id")?;
    let parent_id = require(parent_id, "parent folder id")?;
    let name = require(name, "subfolder name")?;

    let url = session.endpoint(&["drives", drive_id, "items", parent_id, "children"])?;
    session.post_json(url, &NewFolder::named(name)).await
}

/// Creates (or returns the existing) sharing link and hands back its URL.
pub async fn create_sharing_link(
    session: &Session,
    item_id: &str,
    link_type: &str,
    scope: &str,
) -> Result<String> {
    let item_id = require(item_id, "item id")?;
    let request = CreateLinkRequest {
        link_type: require(link_type, "link type")?.to_string(),
        scope: require(scope, "link scope")?.to_string(),
    };

    let url = session.endpoint(&["me", "drive", "items", item_id, "createLink"])?;
    let permission: Permission = session.post_json(url, &request).await?;
    permission
        .link
        .and_then(|link| link.web_url)
        .ok_or_else(|| GraphError::Input(format!("Graph returned no link for {}", item_id)))
}
