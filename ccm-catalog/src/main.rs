//! ccm-catalog - course catalog diagnostic tool
//!
//! Opens (or creates) the catalog database, reconciles the category list
//! against the remote service, and prints the resulting catalog state.
//! Useful for inspecting a device database and for exercising the
//! fetch-merge-cache pipeline end to end.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ccm_catalog::{CategoryApiClient, CategoryCache, CategoryService, CourseStore};
use ccm_common::config;
use ccm_common::db::init_database;
use ccm_common::events::EventBus;

#[derive(Parser, Debug)]
#[command(name = "ccm-catalog", about = "Course catalog manager diagnostic tool")]
struct Args {
    /// Root folder holding the catalog database (overrides CCM_ROOT_FOLDER)
    #[arg(long)]
    root_folder: Option<String>,

    /// Base URL of the remote category service (overrides CCM_API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting ccm-catalog v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    std::fs::create_dir_all(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let api_base_url = config::resolve_api_base_url(args.api_base_url.as_deref());
    info!("Remote category service: {}", api_base_url);

    // Single owned instances, constructed once and passed explicitly
    let events = EventBus::new(100);
    let courses = CourseStore::new(pool.clone(), events.clone());
    let cache = CategoryCache::new(pool, events);
    let client = CategoryApiClient::new(&api_base_url)?;
    let categories = CategoryService::new(client, cache, courses.clone());

    let merged = categories.get_categories().await?;
    info!(count = merged.len(), "reconciled categories");
    for category in &merged {
        info!("  category: {}", category.name);
    }

    let stored = courses.get_all().await?;
    info!(count = stored.len(), "stored courses");
    for course in &stored {
        info!(
            "  course: {} [{}] {} lessons, score {}",
            course.title, course.category_id, course.lessons, course.score
        );
    }

    Ok(())
}
