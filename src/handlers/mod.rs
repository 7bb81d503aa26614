pub mod gateway_handlers;
