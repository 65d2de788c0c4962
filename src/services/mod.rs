pub mod chart_service;
pub mod panel_service;
pub mod ping_service;
pub mod prediction_service;
