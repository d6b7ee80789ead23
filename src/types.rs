use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

impl User {
    // Work/school accounts carry the address in `mail`, personal accounts only in the UPN
    pub fn email(&self) -> Option<&str> {
        self.mail
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.user_principal_name.as_deref())
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EmailAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: Option<EmailAddress>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub from: Option<Recipient>,
    pub is_read: Option<bool>,
    pub received_date_time: Option<DateTime<Utc>>,
}

impl Message {
    pub fn sender_name(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|r| r.email_address.as_ref())
            .and_then(|a| a.name.as_deref().or(a.address.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub more_available: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    pub child_count: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub size: Option<u64>,
    pub last_modified_date_time: Option<DateTime<Utc>>,
    pub web_url: Option<String>,
    pub folder: Option<FolderFacet>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriveItemPage {
    pub items: Vec<DriveItem>,
    pub more_available: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharingLink {
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub scope: Option<String>,
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Permission {
    pub id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub link: Option<SharingLink>,
}

/// Parameters for inviting someone to a drive item.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    pub item_id: String,
    pub recipient: String,
    pub role: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

// Request bodies

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub subject: String,
    pub body: ItemBody,
    pub to_recipients: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    pub message: OutgoingMessage,
    pub save_to_sent_items: bool,
}

impl SendMailRequest {
    pub fn text(subject: &str, body: &str, recipient: &str) -> Self {
        Self {
            message: OutgoingMessage {
                subject: subject.to_string(),
                body: ItemBody {
                    content_type: "Text".to_string(),
                    content: body.to_string(),
                },
                to_recipients: vec![Recipient {
                    email_address: Some(EmailAddress {
                        name: None,
                        address: Some(recipient.to_string()),
                    }),
                }],
            },
            save_to_sent_items: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DriveRecipient {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub recipients: Vec<DriveRecipient>,
    pub require_sign_in: bool,
    pub send_invitation: bool,
    pub roles: Vec<String>,
    pub message: String,
}

impl From<&ShareRequest> for InviteRequest {
    fn from(req: &ShareRequest) -> Self {
        Self {
            recipients: vec![DriveRecipient {
                email: req.recipient.clone(),
            }],
            require_sign_in: true,
            send_invitation: true,
            roles: vec![req.role.clone()],
            message: req.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewFolder {
    pub name: String,
    pub folder: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "@microsoft.graph.conflictBehavior")]
    pub conflict_behavior: String,
}

impl NewFolder {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            folder: serde_json::Map::new(),
            conflict_behavior: "rename".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateLinkRequest {
    #[serde(rename = "type")]
    pub link_type: String,
    pub scope: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_email_prefers_mail() {
        let user = User {
            mail: Some("adele@contoso.com".to_string()),
            user_principal_name: Some("adele_contoso.com#EXT#@fabrikam.onmicrosoft.com".to_string()),
            ..Default::default()
        };
        assert_eq!(user.email(), Some("adele@contoso.com"));

        let personal = User {
            mail: None,
            user_principal_name: Some("someone@outlook.com".to_string()),
            ..Default::default()
        };
        assert_eq!(personal.email(), Some("someone@outlook.com"));

        assert_eq!(User::default().email(), None);
    }

    #[test]
    fn test_deserialize_inbox_page() {
        let body = json!({
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users('me')/mailFolders('inbox')/messages",
            "value": [{
                "id": "AAMkAGVm",
                "subject": "Quarterly numbers",
                "isRead": false,
                "receivedDateTime": "2024-03-01T09:30:00Z",
                "from": { "emailAddress": { "name": "Megan Bowen", "address": "megan@contoso.com" } }
            }],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages?$skip=25"
        });

        let page: Collection<Message> = serde_json::from_value(body).unwrap();
        assert!(page.next_link.is_some());
        let message = &page.value[0];
        assert_eq!(message.subject.as_deref(), Some("Quarterly numbers"));
        assert_eq!(message.is_read, Some(false));
        assert_eq!(message.sender_name(), Some("Megan Bowen"));
        assert_eq!(
            message.received_date_time.unwrap().to_rfc3339(),
            "2024-03-01T09:30:00+00:00"
        );
    }

    #[test]
    fn test_deserialize_drive_item() {
        let item: DriveItem = serde_json::from_value(json!({
            "id": "01BYE5RZ6QN3ZWBTUFOFD3GSPGOHDJD36K",
            "name": "Reports",
            "size": 1024,
            "lastModifiedDateTime": "2024-02-11T18:00:00Z",
            "folder": { "childCount": 3 }
        }))
        .unwrap();
        assert!(item.is_folder());
        assert_eq!(item.size, Some(1024));
        assert_eq!(item.folder.unwrap().child_count, Some(3));
    }

    #[test]
    fn test_serialize_send_mail_request() {
        let request = SendMailRequest::text("Testing Microsoft Graph", "Hello world!", "me@contoso.com");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": {
                    "subject": "Testing Microsoft Graph",
                    "body": { "contentType": "Text", "content": "Hello world!" },
                    "toRecipients": [{ "emailAddress": { "address": "me@contoso.com" } }]
                },
                "saveToSentItems": true
            })
        );
    }

    #[test]
    fn test_serialize_invite_request() {
        let share = ShareRequest {
            item_id: "item-1".to_string(),
            recipient: "ana@contoso.com".to_string(),
            role: "write".to_string(),
            message: "Here you go".to_string(),
        };
        assert_eq!(
            serde_json::to_value(InviteRequest::from(&share)).unwrap(),
            json!({
                "recipients": [{ "email": "ana@contoso.com" }],
                "requireSignIn": true,
                "sendInvitation": true,
                "roles": ["write"],
                "message": "Here you go"
            })
        );
    }

    #[test]
    fn test_serialize_new_folder() {
        assert_eq!(
            serde_json::to_value(NewFolder::named("folder test")).unwrap(),
            json!({
                "name": "folder test",
                "folder": {},
                "@microsoft.graph.conflictBehavior": "rename"
            })
        );
    }

    #[test]
    fn test_deserialize_permission_with_link() {
        let permission: Permission = serde_json::from_value(json!({
            "id": "123ABC",
            "roles": ["read"],
            "link": {
                "type": "view",
                "scope": "organization",
                "webUrl": "https://contoso-my.sharepoint.com/:f:/g/personal/abc"
            }
        }))
        .unwrap();
        let link = permission.link.unwrap();
        assert_eq!(link.link_type.as_deref(), Some("view"));
        assert!(link.web_url.unwrap().starts_with("https://"));
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let err: ErrorResponse = serde_json::from_value(json!({
            "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource 'x' does not exist or one of its queried reference-property objects are not present.",
                "innerError": { "request-id": "abc" }
            }
        }))
        .unwrap();
        assert_eq!(err.error.code, "Request_ResourceNotFound");
    }
}
