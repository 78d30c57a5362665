use crate::config::toml_config::ClientConfig;
use crate::domain::model::{Id, ListingStatus};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Parser)]
#[command(name = "marketplace")]
#[command(about = "Command-line client for the classifieds marketplace API")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "MARKETPLACE_API_URL", help = "API base URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "MARKETPLACE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Log in and print the bearer token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the authenticated user
    Me,
    /// Browse listings
    Listings {
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        category: Option<Id>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ListingStatus>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Show one listing
    Show { id: Id },
    /// Publish a new listing
    CreateListing {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        location: String,
        #[arg(long)]
        category: Id,
    },
    /// Change a listing; only the flags given are sent
    UpdateListing {
        id: Id,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        category: Option<Id>,
        #[arg(long)]
        status: Option<ListingStatus>,
    },
    /// Delete a listing
    DeleteListing { id: Id },
    /// Print the category tree
    Categories,
    /// List favorites of the authenticated user
    Favorites,
    /// Add a listing to favorites
    Favorite { listing_id: Id },
    /// Remove a listing from favorites
    Unfavorite { listing_id: Id },
    /// Show received messages
    Inbox {
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Send a message to another user
    Send {
        #[arg(long)]
        to: Id,
        #[arg(long)]
        listing: Option<Id>,
        #[arg(long)]
        content: String,
    },
    /// Mark a received message as read
    MarkRead { id: Id },
    /// Check a JSON file against a response shape, offline
    Check {
        #[arg(help = "user, category, listing, message, favorite, auth, listing-page or message-page")]
        shape: String,
        file: PathBuf,
    },
}

impl CliConfig {
    /// 讀取配置檔 (如有)，套用命令列參數後驗證
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::with_base_url(DEFAULT_BASE_URL),
        };
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if self.json_logs {
            config.logging.format = Some("json".to_string());
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;

    #[test]
    fn test_update_listing_flags() {
        let cli = CliConfig::try_parse_from([
            "marketplace",
            "update-listing",
            "7",
            "--status",
            "sold",
        ])
        .unwrap();

        match cli.command {
            Command::UpdateListing {
                id,
                status,
                title,
                price,
                ..
            } => {
                assert_eq!(id, 7);
                assert_eq!(status, Some(ListingStatus::Sold));
                assert!(title.is_none());
                assert!(price.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result =
            CliConfig::try_parse_from(["marketplace", "update-listing", "7", "--status", "gone"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_flag_overrides_default() {
        let cli = CliConfig::try_parse_from([
            "marketplace",
            "--base-url",
            "https://market.example.com/api",
            "categories",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.api_base_url(), "https://market.example.com/api");
    }

    #[test]
    fn test_invalid_base_url_fails_validation() {
        let cli = CliConfig::try_parse_from(["marketplace", "--base-url", "nope", "categories"])
            .unwrap();
        assert!(cli.resolve().is_err());
    }
}
