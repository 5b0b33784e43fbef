/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 検証 / ロール判定 / identity の付与
 * - http: request-id, access log, timeout
 */
pub mod auth;
pub mod http;
