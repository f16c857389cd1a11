use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use driver_safety::config::EnvironmentConfig;
use driver_safety::server::{build_router, build_state};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🛡️ Driver Safety - API de administración de flota");
    info!("================================================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuración inválida: {}", e);
            return Err(e.into());
        }
    };
    let addr: SocketAddr = config.server_url().parse()?;

    let state = match build_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando almacenamiento: {}", e);
            return Err(anyhow::anyhow!("Error de almacenamiento: {}", e));
        }
    };
    let app = build_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /api/healthz - Health check");
    info!("   GET  /api/bootstrap - Snapshot completo");
    info!("👤 Drivers:");
    info!("   GET|POST /api/drivers, PUT|DELETE /api/drivers/:id");
    info!("   GET  /api/drivers/:id/stats, POST /api/drivers/:id/assign-truck");
    info!("🚛 Trucks:");
    info!("   GET|POST /api/trucks, PUT|DELETE /api/trucks/:id");
    info!("   GET  /api/trucks/:id/history, POST /api/trucks/:id/assign-driver");
    info!("⚙️ Configuración:");
    info!("   /api/driver-types, /api/safety-categories, /api/scorecard-metrics");
    info!("📋 Eventos:");
    info!("   GET|POST /api/safety-events, DELETE /api/safety-events/:id");
    info!("   GET  /api/scorecard-events");
    info!("   GET|PUT|DELETE /api/scorecard-grades?driver_id=&month=&category=");

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
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
