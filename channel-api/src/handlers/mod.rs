// Handlers module - Centralizes all request handlers
pub mod connect;
pub mod health;
