use crate::graph_api::auth::clear_token_cache;
use crate::graph_api::KEYRING_SERVICE_NAME;
use crate::settings::Settings;
use clap::Parser;
use keyring::Entry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file to read instead of the per-user default.
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove the cached Graph token from the system keyring and exit.
    #[clap(long)]
    pub clear_keyring: bool,

    /// Keep tokens in memory only; nothing is read from or written to the keyring.
    #[clap(long)]
    pub no_token_cache: bool,
}

impl Cli {
    pub fn load_settings(&self) -> crate::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if self.no_token_cache {
            settings.cache_tokens = false;
        }
        Ok(settings)
    }
}

pub fn handle_keyring_clear(settings: &Settings) -> crate::Result<()> {
    let entry = Entry::new(KEYRING_SERVICE_NAME, &settings.keyring_username())?;

    match clear_token_cache(&entry) {
        Ok(true) => println!("Cached token removed from keyring. Exiting."),
        Ok(false) => println!("No cached token in keyring. Exiting."),
        // Startup only, no menu yet
        Err(e) => eprintln!("Failed to delete cached token from keyring: {}", e),
    }
    Ok(())
}
