use crate::config::GalleryConfig;
use crate::entities::pictures;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(config: &GalleryConfig) -> anyhow::Result<DatabaseConnection> {
    let db_url = &config.database_url;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(db_url);
    if db_url.contains(":memory:") {
        // Every pooled connection would get its own empty in-memory database
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(20)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800));
    }
    opt.connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    let stmt = schema
        .create_table_from_entity(pictures::Entity)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&stmt)).await?;
    info!("   - Table 'pictures' checked/created");

    // Filter columns of the gallery view
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_pictures_creator ON pictures(creator)",
        "CREATE INDEX IF NOT EXISTS idx_pictures_date ON pictures(date)",
        "CREATE INDEX IF NOT EXISTS idx_pictures_project ON pictures(project)",
        "CREATE INDEX IF NOT EXISTS idx_pictures_color ON pictures(color)",
    ];

    for query in indexes {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed schema update: {}", query),
            Err(e) => tracing::warn!("   - Schema update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
