use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ride_journal::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use ride_journal::database;
use ride_journal::repositories::{JournalStore, MemoryJournalStore, PgJournalStore};
use ride_journal::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Ride Journal API");
    info!("==================");

    let config = EnvironmentConfig::from_env()?;

    let store: Arc<dyn JournalStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match database::connect(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            Arc::new(PgJournalStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!("🧪 Almacenamiento en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryJournalStore::new())
        }
    };

    info!(
        "⏱️ Espera máxima por conductor: {} ms",
        config.lock_timeout.as_millis()
    );

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   GET|POST /api/drivers");
    info!("   GET|PUT|DELETE /api/drivers/:id");
    info!("   GET  /api/drivers/:id/statistics");
    info!("   GET|POST /api/drivers/:id/locations, GET|PUT|DELETE .../:location_id");
    info!("   GET|POST /api/drivers/:id/stops, GET|DELETE .../:stop_id");
    info!("   GET|POST /api/drivers/:id/rides, GET|PUT|DELETE .../:ride_id");
    info!("   POST /api/drivers/:id/rides/:ride_id/complete");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de señales: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
