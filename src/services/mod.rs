/// Category names, default seeding and the rename cascade.
pub mod category_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game catalog operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background store connection and health supervision.
pub mod storage_supervisor;
