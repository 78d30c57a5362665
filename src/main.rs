use clap::Parser;
use marketplace_client::config::Command;
use marketplace_client::core::contract::{check_shape, ShapeKind};
use marketplace_client::domain::ports::{
    AuthApi, CategoryApi, ConfigProvider, FavoriteApi, ListingApi, MessageApi,
};
use marketplace_client::utils::error::ErrorSeverity;
use marketplace_client::utils::logger;
use marketplace_client::{
    CategoryTree, CliConfig, ClientConfig, CreateListingRequest, CreateMessageRequest,
    HttpMarketplaceClient, ListingQuery, LoginRequest, MarketError, Patch, RegisterRequest,
    UpdateListingRequest,
};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> marketplace_client::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: CliConfig, config: ClientConfig) -> marketplace_client::Result<()> {
    // 建立 API 客戶端
    let per_page = config.items_per_page();
    let mut client = HttpMarketplaceClient::new(config)?;
    if let Some(token) = &cli.token {
        client = client.with_token(token.clone());
    }

    match cli.command {
        Command::Register {
            email,
            username,
            password,
            first_name,
            last_name,
            phone,
        } => {
            let request = RegisterRequest {
                first_name,
                last_name,
                phone,
                ..RegisterRequest::new(email, username, password)
            };
            let auth = client.register(&request).await?;
            print_json(&auth)
        }
        Command::Login { email, password } => {
            let auth = client.login(&LoginRequest::new(email, password)).await?;
            print_json(&auth)
        }
        Command::Me => print_json(&client.current_user().await?),
        Command::Listings {
            page,
            limit,
            category,
            search,
            status,
            min_price,
            max_price,
            location,
        } => {
            let query = ListingQuery {
                category_id: category,
                search,
                status,
                min_price,
                max_price,
                location,
                ..ListingQuery::page(page, limit.unwrap_or(per_page))
            };
            let listings = client.list_listings(&query).await?;
            tracing::info!(
                "Page {}/{} ({} listings in total)",
                listings.pagination.current_page,
                listings.pagination.total_pages,
                listings.pagination.total_items
            );
            print_json(&listings)
        }
        Command::Show { id } => print_json(&client.get_listing(id).await?),
        Command::CreateListing {
            title,
            description,
            price,
            currency,
            location,
            category,
        } => {
            let request = CreateListingRequest {
                title,
                description,
                price,
                currency,
                location,
                category_id: category,
            };
            print_json(&client.create_listing(&request).await?)
        }
        Command::UpdateListing {
            id,
            title,
            description,
            price,
            currency,
            location,
            category,
            status,
        } => {
            let request = UpdateListingRequest {
                title: Patch::from_option(title),
                description: Patch::from_option(description),
                price: Patch::from_option(price),
                currency: Patch::from_option(currency),
                location: Patch::from_option(location),
                category_id: Patch::from_option(category),
                status: Patch::from_option(status),
            };
            if request.is_empty() {
                tracing::warn!("No fields given; the listing will not change");
            }
            print_json(&client.update_listing(id, &request).await?)
        }
        Command::DeleteListing { id } => {
            client.delete_listing(id).await?;
            tracing::info!("Deleted listing {}", id);
            Ok(())
        }
        Command::Categories => {
            let tree = CategoryTree::build(client.list_categories().await?)?;
            for (depth, category) in tree.walk() {
                println!("{}{} ({})", "  ".repeat(depth), category.name, category.slug);
            }
            Ok(())
        }
        Command::Favorites => print_json(&client.list_favorites().await?),
        Command::Favorite { listing_id } => print_json(&client.add_favorite(listing_id).await?),
        Command::Unfavorite { listing_id } => {
            client.remove_favorite(listing_id).await?;
            tracing::info!("Removed listing {} from favorites", listing_id);
            Ok(())
        }
        Command::Inbox { page, limit } => {
            print_json(&client.inbox(page, limit.unwrap_or(per_page)).await?)
        }
        Command::Send {
            to,
            listing,
            content,
        } => {
            let request = CreateMessageRequest {
                receiver_id: to,
                listing_id: listing,
                content,
            };
            print_json(&client.send_message(&request).await?)
        }
        Command::MarkRead { id } => print_json(&client.mark_read(id).await?),
        Command::Check { shape, file } => {
            let kind: ShapeKind = shape.parse()?;
            let body = std::fs::read(&file)?;
            check_shape(kind, &body)?;
            println!("✅ {} conforms to the {} shape", file.display(), kind.name());
            Ok(())
        }
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 可重試的錯誤
        ErrorSeverity::High => 1,     // 請求錯誤
        ErrorSeverity::Critical => 3, // 合約錯誤
    }
}

fn report(e: &MarketError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入並驗證配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            report(&e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let level = config.logging.level.clone();
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, level.as_deref());
    }
    tracing::debug!("Using API at {}", config.api_base_url());

    if let Err(e) = run(cli, config).await {
        report(&e);
        // 根據錯誤嚴重程度決定退出碼
        let code = exit_code(e.severity());
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
