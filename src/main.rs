// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use live_auction::config::AppConfig;
use live_auction::controller::AuctionController;
use live_auction::database::{DatabaseManager, PostgresAuctionStore};
use live_auction::event_store::{AuctionStore, MemoryAuctionStore};
use live_auction::handlers;
use live_auction::message_broker::KafkaManager;
use live_auction::notifier::{BroadcastNotifier, FanoutNotifier, Notifier};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    // 저장소 선택 (DATABASE_URL 이 없으면 메모리 저장소)
    let store: Arc<dyn AuctionStore> = match &config.database_url {
        Some(database_url) => {
            let db_manager = Arc::new(DatabaseManager::new(database_url, &config).await?);
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(PostgresAuctionStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 없음, 메모리 저장소 사용",
                "Main"
            );
            Arc::new(MemoryAuctionStore::new())
        }
    };

    // 알림 채널 구성 (broadcast + 선택적으로 Kafka)
    // broadcast 는 GET /rooms/:room_id/events (SSE) 로 구독한다
    let broadcast = BroadcastNotifier::default();
    let notifier: Arc<dyn Notifier> = match &config.kafka_brokers {
        Some(brokers) => {
            let kafka_manager = KafkaManager::new(brokers)?;
            kafka_manager.create_topic(&config.events_topic, 5, 1).await?;
            info!("{:<12} --> Kafka 초기화 성공", "Main");
            Arc::new(FanoutNotifier::new(vec![
                Arc::new(broadcast.clone()),
                Arc::new(kafka_manager.notifier(&config.events_topic)),
            ]))
        }
        None => {
            warn!(
                "{:<12} --> KAFKA_BROKERS 없음, 이벤트는 SSE 구독자에게만 전달",
                "Main"
            );
            Arc::new(broadcast.clone())
        }
    };

    // 컨트롤러 생성 후 진행 중이던 방 복원
    let controller = AuctionController::new(store, notifier, config.sale_grace);
    let restored = controller.restore().await?;
    info!("{:<12} --> 복원된 경매방: {}", "Main", restored);

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::routes(controller, broadcast)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
