pub mod auction;
pub mod bidding;
pub mod calling;
pub mod config;
pub mod controller;
pub mod database;
pub mod event_store;
pub mod handlers;
pub mod message_broker;
pub mod notifier;
pub mod query;
pub mod registry;
pub mod scheduler;
