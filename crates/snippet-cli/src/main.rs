//! Secure Snippet CLI - share sensitive text through end-to-end encrypted links
//!
//! Content is encrypted on this machine before it is uploaded. For keyless
//! snippets the data key only ever appears in the link's `#fragment`; for
//! password snippets the password never leaves this process.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

use snippet_client::{
    open_snippet, share_snippet, submit_password, Expiry, HttpSnippetApi, ShareLink,
    ShareOptions, SnippetApi,
};
use snippet_core::{
    decrypt_keyless, decrypt_with_password, encrypt_keyless, encrypt_with_password, Frame,
    Settings, SettingsManager, ViewFailure, ViewState,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Secure Snippet - share secrets through links the server can't read
#[derive(Parser, Debug)]
#[command(name = "secure-snippet")]
#[command(version)]
#[command(about = "Share sensitive text through end-to-end encrypted, expiring links")]
struct Cli {
    /// Snippet API base URL (overrides settings and SECURE_SNIPPET_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt content, upload it and print a share link
    Create {
        /// Read content from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        password: PasswordArgs,

        /// Lifetime, e.g. "15 minutes", "1 hour", "24 hours", "7 days"
        #[arg(long)]
        expires: Option<Expiry>,

        /// Number of views allowed before the snippet is destroyed
        #[arg(long)]
        max_views: Option<u32>,

        /// Origin used for the printed link
        #[arg(long)]
        app_url: Option<String>,
    },

    /// Fetch and decrypt a snippet from its share link
    View {
        /// Full share link, including the #key fragment for keyless snippets
        link: String,
    },

    /// Delete a snippet early using its revocation token
    Delete {
        /// Snippet id
        id: String,

        /// Revocation token printed by `create`
        #[arg(long)]
        token: String,
    },

    /// Encrypt content locally and print the frame (nothing is uploaded)
    Encrypt {
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Decrypt a frame locally
    Decrypt {
        /// Opaque frame string
        frame: String,

        /// Exported data key for keyless frames
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Show or change client settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct PasswordArgs {
    /// Password protecting the snippet
    #[arg(long, env = "SECURE_SNIPPET_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Prompt for the password without echoing it
    #[arg(long, conflicts_with = "password")]
    password_prompt: bool,
}

impl std::fmt::Debug for PasswordArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordArgs")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("password_prompt", &self.password_prompt)
            .finish()
    }
}

impl PasswordArgs {
    fn resolve(&self) -> CliResult<Option<String>> {
        if self.password_prompt {
            return Ok(Some(rpassword::prompt_password("Password: ")?));
        }
        Ok(self.password.clone())
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        app_url: Option<String>,
        #[arg(long)]
        default_expiry: Option<Expiry>,
        #[arg(long)]
        default_max_views: Option<u32>,
        #[arg(long)]
        max_password_attempts: Option<u32>,
    },

    /// Restore defaults
    Reset,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for links and plaintext
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut settings_manager = SettingsManager::new()?;
    let settings = settings_manager.get().clone();
    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| settings.effective_api_base_url());
    debug!("Using API at {}", api_url);

    match cli.command {
        Command::Create {
            file,
            password,
            expires,
            max_views,
            app_url,
        } => {
            let content = read_content(file.as_ref())?;
            let expiry = match expires {
                Some(expiry) => expiry,
                None => settings.default_expiry.parse()?,
            };
            let options = ShareOptions {
                password: password.resolve()?,
                expiry,
                max_views: Some(max_views.unwrap_or(settings.default_max_views)),
            };

            let api = HttpSnippetApi::new(&api_url)?;
            let shared = share_snippet(&api, content, &options).await?;
            let url = shared
                .link
                .to_url(app_url.as_deref().unwrap_or(&settings.app_base_url))?;

            println!("{}", url);
            eprintln!("Revocation token: {}", shared.revocation_token);
            eprintln!(
                "Expires in {} • {} view{} allowed{}",
                expiry,
                shared.max_views,
                if shared.max_views == 1 { "" } else { "s" },
                if shared.is_password_protected() {
                    " • password protected"
                } else {
                    ""
                }
            );
        }

        Command::View { link } => {
            let link = ShareLink::parse(&link)?;
            let api = HttpSnippetApi::new(&api_url)?;
            let plaintext = view(&api, &link, settings.max_password_attempts).await?;
            print!("{}", plaintext);
            if !plaintext.ends_with('\n') {
                println!();
            }
        }

        Command::Delete { id, token } => {
            let api = HttpSnippetApi::new(&api_url)?;
            api.delete(&id, &token).await?;
            eprintln!("Snippet {} deleted", id);
        }

        Command::Encrypt { file, password } => {
            let content = read_content(file.as_ref())?;
            match password.resolve()?.filter(|p| !p.trim().is_empty()) {
                Some(password) => {
                    let frame = tokio::task::spawn_blocking(move || {
                        encrypt_with_password(&content, &password)
                    })
                    .await??;
                    println!("{}", frame);
                }
                None => {
                    let envelope = encrypt_keyless(&content)?;
                    println!("{}", envelope.frame);
                    eprintln!("Key: {}", envelope.key);
                }
            }
        }

        Command::Decrypt {
            frame,
            key,
            password,
        } => {
            let plaintext = if Frame::decode(&frame)?.is_password_protected() {
                let password = match password.resolve()? {
                    Some(password) => password,
                    None => rpassword::prompt_password("Password: ")?,
                };
                tokio::task::spawn_blocking(move || decrypt_with_password(&frame, &password))
                    .await??
            } else {
                let key = key.ok_or("This frame is keyless; pass --key")?;
                decrypt_keyless(&frame, &key)?
            };
            print!("{}", plaintext);
        }

        Command::Config { action } => match action {
            ConfigAction::Show => print_settings(settings_manager.get(), settings_manager.path()),
            ConfigAction::Set {
                api_url,
                app_url,
                default_expiry,
                default_max_views,
                max_password_attempts,
            } => {
                let mut updated = settings_manager.get().clone();
                if let Some(url) = api_url {
                    updated.api_base_url = url;
                }
                if let Some(url) = app_url {
                    updated.app_base_url = url;
                }
                if let Some(expiry) = default_expiry {
                    updated.default_expiry = expiry.to_string();
                }
                if let Some(views) = default_max_views {
                    updated.default_max_views = views.max(1);
                }
                if let Some(attempts) = max_password_attempts {
                    updated.max_password_attempts = attempts.max(1);
                }
                settings_manager.update(updated).await?;
                info!("Settings saved");
                print_settings(settings_manager.get(), settings_manager.path());
            }
            ConfigAction::Reset => {
                settings_manager.reset().await?;
                eprintln!("Settings reset to defaults");
            }
        },
    }

    Ok(())
}

/// Drive the viewer until it settles, prompting for passwords as needed
async fn view(api: &HttpSnippetApi, link: &ShareLink, max_attempts: u32) -> CliResult<String> {
    let mut viewer = open_snippet(api, link, max_attempts).await?;

    while let ViewState::AwaitingPassword { wrong_password, .. } = viewer.state() {
        if *wrong_password {
            eprintln!(
                "Incorrect password. {} attempt(s) remaining.",
                viewer.remaining_attempts().unwrap_or(0)
            );
        }
        let password = rpassword::prompt_password("Password: ")?;
        viewer = submit_password(viewer, password).await?;
    }

    match viewer.state() {
        ViewState::Blocked => {
            Err("Maximum password attempts exceeded. Access to this content has been blocked.".into())
        }
        ViewState::Error(failure) => Err(failure_message(*failure).into()),
        _ => viewer
            .into_plaintext()
            .map(|plaintext| plaintext.into_inner())
            .ok_or_else(|| "Snippet could not be decrypted".into()),
    }
}

fn failure_message(failure: ViewFailure) -> &'static str {
    match failure {
        ViewFailure::Unavailable => {
            "This snippet has expired, the view limit was reached, or it has been deleted."
        }
        ViewFailure::MissingKey => "The link is missing its #key fragment.",
        ViewFailure::WrongKey => "The key in the link does not match this snippet.",
        ViewFailure::Corrupt => "The snippet is corrupted and cannot be decrypted.",
    }
}

fn read_content(file: Option<&PathBuf>) -> CliResult<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn print_settings(settings: &Settings, path: &std::path::Path) {
    println!("settings file:          {}", path.display());
    println!("api url:                {}", settings.api_base_url);
    println!("app url:                {}", settings.app_base_url);
    println!("default expiry:         {}", settings.default_expiry);
    println!("default max views:      {}", settings.default_max_views);
    println!("max password attempts:  {}", settings.max_password_attempts);
}
