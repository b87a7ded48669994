//! Shared application state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, DispatchCommandUseCase, GetRoomsUseCase,
    ShutdownUseCase,
};

/// Shared application state
pub struct AppState {
    pub connect_user_usecase: ConnectUserUseCase,
    pub disconnect_user_usecase: DisconnectUserUseCase,
    pub dispatch_command_usecase: DispatchCommandUseCase,
    pub get_rooms_usecase: GetRoomsUseCase,
    pub shutdown_usecase: ShutdownUseCase,
    /// Set once shutdown starts; new upgrades are refused.
    shutting_down: AtomicBool,
}

impl AppState {
    pub fn new(
        connect_user_usecase: ConnectUserUseCase,
        disconnect_user_usecase: DisconnectUserUseCase,
        dispatch_command_usecase: DispatchCommandUseCase,
        get_rooms_usecase: GetRoomsUseCase,
        shutdown_usecase: ShutdownUseCase,
    ) -> Self {
        Self {
            connect_user_usecase,
            disconnect_user_usecase,
            dispatch_command_usecase,
            get_rooms_usecase,
            shutdown_usecase,
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }
}
