use pokedex::cache::run_cleanup;
use pokedex::{AppError, AppState, CachedSource, Config, GraphqlSource, PokedexSource, router};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // axum logs rejections from built-in extractors with the `axum::rejection`
        // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
        format!(
            "{}=debug,tower_http=debug,axum::rejection=trace",
            env!("CARGO_CRATE_NAME")
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::load()?;

    let upstream: Arc<dyn PokedexSource> = Arc::new(GraphqlSource::new(&config)?);
    let source: Arc<dyn PokedexSource> = if config.pokemon.cache_enabled {
        let cached = Arc::new(CachedSource::new(upstream, &config));
        let sweeper = Arc::clone(&cached);
        tokio::spawn(run_cleanup(CLEANUP_INTERVAL, move || {
            sweeper.cleanup_expired()
        }));
        cached
    } else {
        tracing::info!("Response cache disabled");
        upstream
    };

    let bind_addr = config.server.bind_addr.clone();
    let app = router(Arc::new(AppState { source, config }));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {}", addr),
        Err(_) => tracing::info!("listening on {}", bind_addr),
    }

    axum::serve(listener, app).await.map_err(AppError::Serve)
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
