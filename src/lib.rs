pub mod capability;
pub mod card_view;
pub mod orientation;
pub mod telemetry;
pub mod yew_app;
