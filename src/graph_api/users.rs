use crate::error::{GraphError, Result};
use crate::graph_api::client::Session;
use crate::graph_api::require;
use crate::types::User;

/// The signed-in user, trimmed to the fields the greeting needs.
pub async fn get_user(session: &Session) -> Result<User> {
    let mut url = session.endpoint(&["me"])?;
    url.query_pairs_mut()
        .append_pair("$select", "id,displayName,mail,userPrincipalName");
    session.get_json(url).await
}

/// Looks up a user's object id from their email address or UPN.
pub async fn get_user_id_by_email(session: &Session, email: &str) -> Result<String> {
    let email = require(email, "email address")?;
    let mut url = session.endpoint(&["users", email])?;
    url.query_pairs_mut().append_pair("$select", "id");

    let user: User = session.get_json(url).await?;
    user.id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GraphError::Input(format!("Graph returned no id for {}", email)))
}
