//! Outbound channels: Web Push and SMS

mod push;
mod sms;

pub use push::{endpoint_audience, DeliveryError, PushDelivery, PushMessage, WebPushDelivery};
pub use sms::{gateway_from_config, HttpSmsGateway, LoggingSmsGateway, SmsError, SmsGateway};
