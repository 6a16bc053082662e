//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_API_SIGNUP: &str = "/api/signup";
pub const POST_API_LOGIN: &str = "/api/login";
pub const POST_API_REFRESH: &str = "/api/refresh";
pub const POST_API_LOGOUT: &str = "/api/logout";
pub const POST_API_FAQ: &str = "/api/faq";
pub const POST_API_ASK: &str = "/api/ask";
pub const API_CONVERSATIONS: &str = "/api/conversations";
pub const GET_API_CONVERSATIONS_ID: &str = "/api/conversations/{id}";
pub const POST_API_CONVERSATIONS_ID_MESSAGE: &str = "/api/conversations/{id}/message";
