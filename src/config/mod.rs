mod settings;

pub use settings::{
    parse_chat_ids, HostConfig, OtelConfig, ServerConfig, Settings, TelegramConfig,
};
