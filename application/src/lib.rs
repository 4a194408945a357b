//! Application layer for multichat
//!
//! This crate contains the chat session engine, the session manager, use
//! cases and port definitions. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    capabilities::{CapabilityError, ClipboardWriter, FileReader, TextToSpeech},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    model_catalog::{CatalogError, ModelCatalog},
    notifier::{ChannelNotifier, NoNotifier, Notification, Notifier, Severity},
    transport::{
        ChatConnection, ChatConnector, ConnectionEvent, ConnectionId, TransportError,
        TransportEvent,
    },
};
pub use session::{
    chat_session::{ChatSession, SessionError},
    manager::SessionManager,
    update::{BroadcastReport, SendOutcome, SessionUpdate, SkipReason, SlotId},
};
pub use use_cases::{
    load_models::LoadModelsUseCase,
    message_actions::{MessageActionError, MessageActions},
    prepare_attachment::PrepareAttachmentUseCase,
};
