pub mod document_id;
pub mod store;
