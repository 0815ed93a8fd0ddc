pub mod catalog;
pub mod error;
pub mod events;
pub mod ids;
pub mod models;
pub mod storage;
pub mod timeline;

pub use catalog::{StageCatalog, StageRule};
pub use error::{DeskError, DeskResult};
pub use events::{DealEvent, DealEventKind};
pub use ids::RecordId;
pub use models::{
    BankStatementParsed, Deal, DealStage, DealTerms, Document, DocumentStatus, DocumentType,
    Priority,
};
pub use storage::{ActivityLog, DealStore, EventEnvelope, RemoteSync, TimelineStore};
pub use timeline::{Communication, CommunicationKind, Note, Task};
