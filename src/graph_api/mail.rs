use crate::error::Result;
use crate::graph_api::client::Session;
use crate::graph_api::require;
use crate::types::{Collection, Message, MessagePage, SendMailRequest};

pub const INBOX_PAGE_SIZE: usize = 25;

// Fetch the newest page of the inbox
pub async fn get_inbox(session: &Session) -> Result<MessagePage> {
    let mut url = session.endpoint(&["me", "mailFolders", "inbox", "messages"])?;
    url.query_pairs_mut()
        .append_pair("$select", "from,isRead,receivedDateTime,subject")
        .append_pair("$top", &INBOX_PAGE_SIZE.to_string())
        .append_pair("$orderby", "receivedDateTime DESC");

    let page: Collection<Message> = session.get_json(url).await?;
    Ok(into_message_page(page))
}

/// Newest first, at most one page, whatever order the server used.
pub fn into_message_page(page: Collection<Message>) -> MessagePage {
    let mut messages = page.value;
    let mut more_available = page.next_link.is_some();

    messages.sort_by(|a, b| b.received_date_time.cmp(&a.received_date_time));
    if messages.len() > INBOX_PAGE_SIZE {
        messages.truncate(INBOX_PAGE_SIZE);
        more_available = true;
    }

    MessagePage {
        messages,
        more_available,
    }
}

// Send a plain-text message to a single recipient
pub async fn send_mail(session: &Session, subject: &str, body: &str, recipient: &str) -> Result<()> {
    let recipient = require(recipient, "recipient")?;
    let url = session.endpoint(&["me", "sendMail"])?;
    let request = SendMailRequest::text(subject, body, recipient);
    session.post_empty(url, &request).await?;
    tracing::info!("mail sent to {}", recipient);
    Ok(())
}
