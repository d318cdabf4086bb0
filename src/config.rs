use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use crate::models::{ProfileVisibility, Sex};

#[derive(Parser, Debug)]
#[command(name = "devthoughts", about = "Command-line client for devthoughts")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API origin, e.g. http://localhost:8000/
    #[arg(long, env = "DEVTHOUGHTS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Path to data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log requests and session changes
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DEVTHOUGHTS_PASSWORD")]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        password2: Option<String>,
        /// male, female or other
        #[arg(long)]
        sex: Sex,
    },
    /// Log in and store the session token
    Login {
        username: String,
        #[arg(long, env = "DEVTHOUGHTS_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List recent posts
    Feed {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only posts matching this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Publish a post
    Post {
        text: String,
        /// Media URL to attach; repeatable
        #[arg(long = "media")]
        media: Vec<String>,
    },
    /// Show a post with a page of its comments
    Show {
        post_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Delete one of your posts
    Delete { post_id: String },
    Like { post_id: String },
    Unlike { post_id: String },
    /// Comment on a post
    Comment { post_id: String, text: String },
    /// Show a user's profile, settings and posts (defaults to you)
    User {
        username: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Search posts
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Manage profile pictures
    Avatar {
        #[command(subcommand)]
        action: AvatarAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print settings (defaults to your own)
    Show { username: Option<String> },
    /// Change profile and privacy settings
    Update(SettingsArgs),
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub sex: Option<Sex>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub show_email: Option<bool>,
    /// public, friends or private
    #[arg(long)]
    pub visibility: Option<ProfileVisibility>,
}

#[derive(Subcommand, Debug)]
pub enum AvatarAction {
    /// Download a profile picture (defaults to your own)
    Get {
        #[arg(long)]
        user: Option<String>,
        /// Output file; the extension is derived from the image type when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a new profile picture
    Set { file: PathBuf },
    /// Replace the current profile picture
    Replace { file: PathBuf },
    /// Remove your profile picture
    Delete,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    pub feed_page_size: u32,
    pub user_posts_page_size: u32,
    pub comments_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            feed_page_size: 10,
            user_posts_page_size: 7,
            comments_page_size: 5,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref url) = cli.api_url {
            config.api.base_url = url.clone();
        }

        // Resolve paths relative to data dir
        if config.storage.path.is_none() {
            config.storage.path = Some(data_dir.join("session.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".devthoughts")
        })
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("session.db"))
    }
}
