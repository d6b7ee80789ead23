use crate::console::Console;
use crate::error::Result;
use crate::graph_api::{GraphApi, TokenClaims};
use crate::settings::MenuDefaults;
use crate::types::ShareRequest;
use chrono::Local;
use std::io::{BufRead, Write};

pub const TEST_MAIL_SUBJECT: &str = "Testing Microsoft Graph";
pub const TEST_MAIL_BODY: &str = "Hello world!";

const RULE: &str = "==========================";

pub async fn greet_user<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let user = api.get_user().await?;
    let out = console.output();
    writeln!(out, "Hello, {}!", user.display_name.as_deref().unwrap_or_default())?;
    writeln!(out, "Email: {}", user.email().unwrap_or_default())?;
    Ok(())
}

pub async fn display_access_token<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let token = api.get_user_token().await?;
    let out = console.output();
    writeln!(out, "User token: {}", token)?;

    if let Some(claims) = TokenClaims::decode(&token) {
        if let Some(user) = &claims.user {
            writeln!(out, "  Issued to: {}", user)?;
        }
        if let Some(audience) = &claims.audience {
            writeln!(out, "  Audience: {}", audience)?;
        }
        if !claims.scopes.is_empty() {
            writeln!(out, "  Scopes: {}", claims.scopes.join(" "))?;
        }
        if let Some(expires_at) = claims.expires_at {
            writeln!(
                out,
                "  Expires: {}",
                expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            )?;
        }
    }
    Ok(())
}

pub async fn list_inbox<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let page = api.get_inbox().await?;
    let out = console.output();

    for message in &page.messages {
        writeln!(
            out,
            "Message: {}",
            message.subject.as_deref().unwrap_or("NO SUBJECT")
        )?;
        writeln!(out, "  From: {}", message.sender_name().unwrap_or_default())?;
        let status = if message.is_read.unwrap_or(false) {
            "Read"
        } else {
            "Unread"
        };
        writeln!(out, "  Status: {}", status)?;
        let received = message
            .received_date_time
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        writeln!(out, "  Received: {}", received)?;
    }

    writeln!(out, "\nMore messages available? {}", page.more_available)?;
    Ok(())
}

/// Sends the test message to the signed-in user's own mailbox.
pub async fn send_mail_to_self<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let user = api.get_user().await?;
    let Some(email) = user.email() else {
        writeln!(console.output(), "Couldn't get your email address, canceling...")?;
        return Ok(());
    };

    api.send_mail(TEST_MAIL_SUBJECT, TEST_MAIL_BODY, email).await?;
    writeln!(console.output(), "Mail sent.")?;
    Ok(())
}

pub async fn list_drive<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let page = api.list_drive_root_children().await?;
    let out = console.output();

    for item in &page.items {
        writeln!(out, "\n{}", RULE)?;
        writeln!(out, "{}", item.id.as_deref().unwrap_or_default())?;
        writeln!(out, "{}", item.name.as_deref().unwrap_or_default())?;
        writeln!(
            out,
            "{}",
            item.size.map(|s| s.to_string()).unwrap_or_default()
        )?;
        writeln!(
            out,
            "{}",
            item.last_modified_date_time
                .map(|t| t.with_timezone(&Local).to_rfc3339())
                .unwrap_or_default()
        )?;
        writeln!(out, "{}\n", RULE)?;
    }

    if page.more_available {
        writeln!(out, "(more items available)")?;
    }
    Ok(())
}

pub async fn get_user_id_by_email<G, R, W>(api: &G, console: &mut Console<R, W>) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let email = console.prompt_required("Email address")?;
    let id = api.get_user_id_by_email(&email).await?;
    writeln!(console.output(), "{}", id)?;
    Ok(())
}

pub async fn share_item<G, R, W>(
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let request = ShareRequest {
        item_id: console.prompt_required("Drive item id")?,
        recipient: console.prompt_required("Recipient email")?,
        role: console.prompt_with_default("Role (read/write)", &defaults.share_role)?,
        message: console.prompt_with_default("Invitation message", &defaults.share_message)?,
    };

    api.share_item(&request).await?;
    writeln!(console.output(), "Success!")?;
    Ok(())
}

pub async fn create_folder<G, R, W>(
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let drive_id = console.prompt_required("Drive id")?;
    let name = console.prompt_with_default("Folder name", &defaults.folder_name)?;

    let folder = api.create_folder(&drive_id, &name).await?;
    let out = console.output();
    writeln!(out, "Folder created successfully")?;
    writeln!(out, "Folder ID: {}", folder.id.as_deref().unwrap_or_default())?;
    Ok(())
}

pub async fn create_subfolder<G, R, W>(
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let drive_id = console.prompt_required("Drive id")?;
    let parent_id = console.prompt_required("Parent folder id")?;
    let name = console.prompt_with_default("Subfolder name", &defaults.subfolder_name)?;

    let folder = api.create_subfolder(&drive_id, &parent_id, &name).await?;
    let out = console.output();
    writeln!(out, "Subfolder created successfully")?;
    writeln!(out, "Subfolder ID: {}", folder.id.as_deref().unwrap_or_default())?;
    Ok(())
}

pub async fn create_sharing_link<G, R, W>(
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let item_id = console.prompt_required("Drive item id")?;
    let link_type = console.prompt_with_default("Link type (view/edit/embed)", &defaults.link_type)?;
    let scope = console.prompt_with_default("Link scope (anonymous/organization)", &defaults.link_scope)?;

    let url = api.create_sharing_link(&item_id, &link_type, &scope).await?;
    writeln!(console.output(), "{}", url)?;
    Ok(())
}
