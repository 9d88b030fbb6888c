use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use report_relay::{
    AppState,
    cache::open_store,
    config::Config,
    cooldown::CooldownGate,
    relay::WebhookRelay,
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置，缺少 webhook 地址或 Redis 地址时直接退出
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置冷却状态存储
    let store = open_store(&config.cooldown_backend)
        .await
        .expect("Failed to open cooldown store");
    tracing::info!(
        "Cooldown backend: {}, window: {:?}",
        config.cooldown_backend.name(),
        config.cooldown_window()
    );

    let gate = CooldownGate::new(store, config.cooldown_window());
    let relay = WebhookRelay::new(Some(config.webhook_url.clone()));
    let app = create_router(AppState::new(gate, relay));

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
