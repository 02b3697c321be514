/*
 * Responsibility
 *  - handler に公開する extractor をまとめる
 *  - rejection は全て AppError (JSON body) に寄せる
 */
mod document_id;
mod json_body;

pub use document_id::PathId;
pub use json_body::JsonBody;
