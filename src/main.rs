use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use carsys::config::{DatabaseConfig, EnvironmentConfig};
use carsys::database::DatabaseConnection;
use carsys::repositories::PgStore;
use carsys::routes::build_router;
use carsys::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging; RUST_LOG tiene prioridad sobre LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("carsys={0},tower_http={0}", config.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚗 CarSys - Gestión de concesionaria");
    info!("====================================");

    // Inicializar base de datos
    let database_config = DatabaseConfig::from_env()?;
    let db_connection = match DatabaseConnection::connect(&database_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let store = Arc::new(PgStore::new(db_connection.pool().clone()));
    let app_state = AppState::new(store, config.clone());
    let app = build_router(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{} ({})", addr, config.environment);
    info!("🔍 Endpoints disponibles:");
    info!("   POST /auth/login - Login");
    info!("   POST /users/register - Registrar usuario");
    info!("🚗 Autos:");
    info!("   POST /cars/register - Registrar auto");
    info!("   PUT  /cars/update - Actualizar auto");
    info!("   GET  /cars/search - Buscar autos propios");
    info!("   GET  /cars/available - Autos disponibles");
    info!("💰 Ventas:");
    info!("   POST /sales/register - Registrar venta");
    info!("   POST /sales/register/with-client - Registrar venta con cliente nuevo");
    info!("   GET  /sales/search - Buscar ventas propias");
    info!("👥 Clientes:");
    info!("   GET  /clients/search/page - Buscar clientes propios");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
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
