mod block_service;
mod microsite_service;
mod page_service;
mod publish_gate;
mod types;

pub use block_service::BlockService;
pub use microsite_service::MicrositeService;
pub use page_service::PageService;
pub use publish_gate::{evaluate_publish_readiness, PublishCheck};
pub use types::*;
