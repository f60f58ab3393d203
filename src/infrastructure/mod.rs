// Collaborator seams and their implementations
pub mod database;              // Document store interface
pub mod sqlite_database;       // SQLite document store
pub mod blob_store;            // Media object storage
pub mod security;              // Identity verification
pub mod middleware;            // Request extractors

pub use database::{
    to_fields, CollectionPath, Document, DocumentPath, DocumentQuery, DocumentStore,
    DocumentTransaction, FieldUpdate, SortDirection,
};
pub use sqlite_database::SqliteDocumentStore;
pub use blob_store::{upload_file, BlobStore, LocalBlobStore, Upload};
pub use security::{IdentityVerifier, JwtIdentityVerifier};
pub use middleware::Principal;
