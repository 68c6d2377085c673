//! Google Calendar authentication commands.

use clap::Subcommand;
use emotionary_core::storage::Config;

use super::common;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Run the browser consent flow
    Login {
        /// OAuth client ID (stored in the keyring for later runs)
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        AuthAction::Login {
            client_id,
            client_secret,
        } => {
            if let (Some(id), Some(secret)) = (&client_id, &client_secret) {
                emotionary_core::auth::save_client_credentials(id, secret)?;
            }
            let lifecycle = common::build_lifecycle(&config);
            lifecycle.authenticate()?;
            println!("Google Calendar authenticated");
        }
        AuthAction::Logout => {
            let lifecycle = common::build_lifecycle(&config);
            lifecycle.disconnect()?;
            println!("Google Calendar disconnected");
        }
        AuthAction::Status => {
            let lifecycle = common::build_lifecycle(&config);
            if lifecycle.is_authenticated() {
                println!("authenticated");
            } else {
                println!("not authenticated ({})", lifecycle.state_name());
            }
        }
    }
    Ok(())
}
