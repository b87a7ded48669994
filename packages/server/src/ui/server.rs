//! Server assembly and execution.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use parlor_shared::time::SystemClock;
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{ChatState, MessageStore},
    infrastructure::{
        repository::InMemoryChatRepository,
        store::{HistoryRecorder, NoOpMessageStore, SqliteMessageStore, load_directory},
    },
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, DispatchCommandUseCase, GetRoomsUseCase,
        ShutdownUseCase,
    },
};

use super::{
    error::ServerError,
    handler::{get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// How long the store worker may take to flush after the server stops.
const RECORDER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Server {
    state: Arc<AppState>,
    shutdown_grace: Duration,
    recorder_task: JoinHandle<()>,
}

impl Server {
    /// Wire up the store, shared state and use cases from `config`.
    ///
    /// Rooms and recent history are restored from the store when a database
    /// is configured.
    pub async fn build(config: ServerConfig) -> Result<Self, ServerError> {
        // 1. Message store
        let store: Arc<dyn MessageStore> = match &config.database {
            Some(path) => {
                let store = SqliteMessageStore::connect(&path.to_string_lossy()).await?;
                tracing::info!("Using database {}", path.display());
                Arc::new(store)
            }
            None => {
                tracing::info!("No database configured, history is kept in memory only");
                Arc::new(NoOpMessageStore)
            }
        };

        // 2. Shared state (Registry + Room Directory) restored from the store
        let directory = load_directory(
            store.as_ref(),
            config.default_room.clone(),
            &config.rooms,
            config.history_len,
        )
        .await?;
        tracing::info!("Rooms: {:?}", directory.names());

        // 3. Persistence worker, fed from inside the state lock
        let (recorder, recorder_task) = HistoryRecorder::spawn(store);
        let repository = Arc::new(
            InMemoryChatRepository::new(ChatState::new(directory)).with_recorder(recorder),
        );

        // 4. UseCases
        let state = Arc::new(AppState::new(
            ConnectUserUseCase::new(repository.clone()),
            DisconnectUserUseCase::new(repository.clone()),
            DispatchCommandUseCase::new(
                repository.clone(),
                config.nick_map,
                config.admin,
                Arc::new(SystemClock),
            ),
            GetRoomsUseCase::new(repository.clone()),
            ShutdownUseCase::new(repository),
        ));

        Ok(Self {
            state,
            shutdown_grace: config.shutdown_grace,
            recorder_task,
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind `host:port` and serve until Ctrl+C or SIGTERM.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves, then drain connections.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let app = self.router();
        let state = self.state.clone();
        let grace = self.shutdown_grace;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.await;
            state.begin_shutdown();
            state.shutdown_usecase.execute(grace).await;
        })
        .await?;

        let Self {
            state,
            recorder_task,
            ..
        } = self;
        drop(state);
        if tokio::time::timeout(RECORDER_FLUSH_TIMEOUT, recorder_task)
            .await
            .is_err()
        {
            tracing::warn!("Store worker did not finish within {:?}", RECORDER_FLUSH_TIMEOUT);
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
