use dotenvy::dotenv;
use kafka_bridge::config::BridgeConfig;
use kafka_bridge::{AppState, configure, connect_clients, cors_headers};
use kafka_client::{KafkaAdmin, KafkaPublisher};
use log::{error, info};
use ntex::web;
use rdkafka::admin::AdminClient;
use rdkafka::producer::FutureProducer;
use std::sync::Arc;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = BridgeConfig::from_env();

    info!(
        "Starting Kafka bridge on {}, brokers={}, client_id={}",
        config.bind_address, config.brokers, config.client_id
    );

    let admin: AdminClient<_> = config.client_config().create().expect("admin client");

    let producer: FutureProducer = config.producer_config().create().expect("producer");

    let publisher = KafkaPublisher::new(producer, config.metadata_timeout);
    let admin = KafkaAdmin::new(admin, config.topic_settings, config.metadata_timeout);

    // the listener only comes up once both clients reached the cluster
    if let Err(e) = connect_clients(&publisher, &admin).await {
        error!("Failed to initialise the server: {e}");
        return Ok(());
    }

    let state = Arc::new(AppState::new(publisher, admin));

    info!("Server listening on {}", config.bind_address);
    web::server(move || {
        let s = state.clone();
        web::App::new()
            .state(s)
            .wrap(web::middleware::Logger::default())
            .wrap(cors_headers())
            .configure(configure::<KafkaPublisher, KafkaAdmin>)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
