use std::time::Duration;

use sea_orm::{ConnectOptions, Database};

use patient_portal::{
    config::AppConfig,
    db::dao::DaoContext,
    error::AppError,
    logging::init_tracing,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("provisioning failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.log_level);

    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    tracing::info!("syncing database schema from entities");
    db.get_schema_registry("patient_portal::db::entities::*")
        .sync(&db)
        .await?;

    seed_superuser(&cfg, &DaoContext::new(&db)).await?;
    Ok(())
}

async fn seed_superuser(cfg: &AppConfig, dao: &DaoContext) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&cfg.superuser_email, &cfg.superuser_password) else {
        tracing::info!("no superuser configured, skipping seed");
        return Ok(());
    };

    match dao
        .user()
        .create_superuser(email, password, Default::default())
        .await
    {
        Ok(user) => tracing::info!("seeded superuser {}", user.email),
        Err(AppError::EmailTaken) => tracing::info!("superuser already present: {email}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
