use crate::commands;
use crate::console::Console;
use crate::error::{GraphError, Result};
use crate::graph_api::GraphApi;
use crate::settings::MenuDefaults;
use std::io::{BufRead, Write};

pub const MENU_LINES: &[&str] = &[
    "Please choose one of the following options:",
    "0. Exit",
    "1. Display access token",
    "2. List my inbox",
    "3. Send mail",
    "4. List my folders",
    "5. Get user ID by email",
    "6. Share an item with someone",
    "7. Create folder",
    "8. Create subfolder",
    "9. Create a sharing link for a drive item",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    DisplayAccessToken,
    ListInbox,
    SendMail,
    ListDrive,
    GetUserId,
    ShareItem,
    CreateFolder,
    CreateSubfolder,
    CreateSharingLink,
}

impl MenuChoice {
    /// Trimmed integer 0-9; anything else is a [`GraphError::Parse`].
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        match trimmed.parse::<i32>() {
            Ok(0) => Ok(MenuChoice::Exit),
            Ok(1) => Ok(MenuChoice::DisplayAccessToken),
            Ok(2) => Ok(MenuChoice::ListInbox),
            Ok(3) => Ok(MenuChoice::SendMail),
            Ok(4) => Ok(MenuChoice::ListDrive),
            Ok(5) => Ok(MenuChoice::GetUserId),
            Ok(6) => Ok(MenuChoice::ShareItem),
            Ok(7) => Ok(MenuChoice::CreateFolder),
            Ok(8) => Ok(MenuChoice::CreateSubfolder),
            Ok(9) => Ok(MenuChoice::CreateSharingLink),
            _ => Err(GraphError::Parse(trimmed.to_string())),
        }
    }

    /// Completes "Error ..." when the chosen operation fails.
    pub fn failure_context(&self) -> &'static str {
        match self {
            MenuChoice::DisplayAccessToken => "getting user access token",
            MenuChoice::ListInbox => "getting user's inbox",
            MenuChoice::SendMail => "sending mail",
            MenuChoice::ListDrive => "getting folders",
            MenuChoice::GetUserId => "getting user ID",
            MenuChoice::ShareItem => "granting permission",
            MenuChoice::CreateFolder => "creating folder",
            MenuChoice::CreateSubfolder => "creating subfolder",
            MenuChoice::CreateSharingLink => "creating link",
            MenuChoice::Exit => "exiting",
        }
    }
}

/// Prints the menu, runs the chosen operation and repeats until the operator
/// picks 0 or input runs out. Operation failures are reported and the loop
/// carries on; only console I/O failures end it early.
pub async fn run_menu<G, R, W>(
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        for line in MENU_LINES {
            writeln!(console.output(), "{}", line)?;
        }
        console.output().flush()?;

        let Some(line) = console.read_line()? else {
            tracing::info!("input closed, leaving menu");
            writeln!(console.output(), "Goodbye...")?;
            return Ok(());
        };

        match MenuChoice::parse(&line) {
            Err(err) => {
                tracing::debug!("{}", err);
                writeln!(console.output(), "Invalid choice! Please try again.")?;
            }
            Ok(MenuChoice::Exit) => {
                writeln!(console.output(), "Goodbye...")?;
                return Ok(());
            }
            Ok(choice) => {
                if let Err(err) = dispatch(choice, api, console, defaults).await {
                    if let GraphError::Io(_) = err {
                        return Err(err);
                    }
                    tracing::error!(?choice, "{}", err);
                    writeln!(
                        console.output(),
                        "Error {}: {}",
                        choice.failure_context(),
                        err
                    )?;
                }
            }
        }
    }
}

async fn dispatch<G, R, W>(
    choice: MenuChoice,
    api: &G,
    console: &mut Console<R, W>,
    defaults: &MenuDefaults,
) -> Result<()>
where
    G: GraphApi + ?Sized,
    R: BufRead,
    W: Write,
{
    match choice {
        MenuChoice::DisplayAccessToken => commands::display_access_token(api, console).await,
        MenuChoice::ListInbox => commands::list_inbox(api, console).await,
        MenuChoice::SendMail => commands::send_mail_to_self(api, console).await,
        MenuChoice::ListDrive => commands::list_drive(api, console).await,
        MenuChoice::GetUserId => commands::get_user_id_by_email(api, console).await,
        MenuChoice::ShareItem => commands::share_item(api, console, defaults).await,
        MenuChoice::CreateFolder => commands::create_folder(api, console, defaults).await,
        MenuChoice::CreateSubfolder => commands::create_subfolder(api, console, defaults).await,
        MenuChoice::CreateSharingLink => {
            commands::create_sharing_link(api, console, defaults).await
        }
        MenuChoice::Exit => Ok(()),
    }
}
