mod chat_text_service;
mod mock_text_service;

pub use chat_text_service::ChatTextService;
pub use mock_text_service::MockTextService;
