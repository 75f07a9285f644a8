//! Campaign store — thread-safe in-memory state with audit logging,
//! named version snapshots, and dirty-flag synchronization to a
//! persistence backend.

pub mod models;
pub mod persist;
pub mod store;

pub use models::{
    AuditAction, AuditLogEntry, CampaignVersion, CreateCampaignRequest, CreateVersionRequest,
    MergeReport, SyncReport, UpdateCampaignRequest,
};
pub use persist::{JsonFileBackend, MemoryBackend, PersistenceBackend};
pub use store::CampaignStore;
