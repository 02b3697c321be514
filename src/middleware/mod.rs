/*
 * Responsibility
 * - middleware の公開インターフェース
 * - app.rs からは cors::apply / http::apply だけを呼ぶ
 */
pub mod cors;
pub mod http;
