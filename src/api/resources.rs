/*
 * Responsibility
 * - 公開する resource (path ↔ collection) と resource ごとの hooks の一覧
 * - resource を増やすときは CATALOG に 1 エントリ追加するだけ
 *
 * 置かないもの
 * - handler 本体 (handlers/resources.rs)
 * - store の実装
 */
use crate::repos::resource_repo::ResourceRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// POST body is a single JSON object.
    Single,
    /// POST body is a JSON array of objects.
    Many,
}

/// Rejects a second document carrying the same values for `fields`.
///
/// The key is registered with the store at startup, so the check and the
/// insert are one atomic store operation.
#[derive(Debug)]
pub struct DuplicateGuard {
    pub fields: &'static [&'static str],
    pub code: &'static str,
    pub message: &'static str,
}

#[derive(Debug)]
pub struct ResourceDef {
    pub path: &'static str,
    pub collection: &'static str,
    // Singular, used in messages ("Item not found.")
    pub label: &'static str,
    pub payload: PayloadShape,
    // Field used by `GET /{path}?q=` when no `field` is given
    pub search_field: Option<&'static str>,
    pub duplicate_guard: Option<DuplicateGuard>,
    // Server-stamped creation time
    pub timestamp_field: Option<&'static str>,
    // Enables `POST /{path}/{id}/purchase`
    pub counter_field: Option<&'static str>,
}

const BASE: ResourceDef = ResourceDef {
    path: "",
    collection: "",
    label: "Document",
    payload: PayloadShape::Single,
    search_field: None,
    duplicate_guard: None,
    timestamp_field: None,
    counter_field: None,
};

pub static CATALOG: &[ResourceDef] = &[
    // models listed for sale; `purchased` counts sales
    ResourceDef {
        path: "users",
        collection: "users",
        label: "User",
        search_field: Some("name"),
        counter_field: Some("purchased"),
        ..BASE
    },
    ResourceDef {
        path: "user",
        collection: "user",
        label: "User",
        ..BASE
    },
    ResourceDef {
        path: "project",
        collection: "project",
        label: "Project",
        search_field: Some("name"),
        ..BASE
    },
    ResourceDef {
        path: "items",
        collection: "items",
        label: "Item",
        payload: PayloadShape::Many,
        search_field: Some("name"),
        ..BASE
    },
    ResourceDef {
        path: "buyerdata",
        collection: "buyerdata",
        label: "Buyer record",
        search_field: Some("buyerEmail"),
        duplicate_guard: Some(DuplicateGuard {
            fields: &["modelName", "buyerEmail"],
            code: "ALREADY_PURCHASED",
            message: "User already purchased this model",
        }),
        timestamp_field: Some("purchasedAt"),
        ..BASE
    },
    ResourceDef {
        path: "Customer",
        collection: "Customer",
        label: "Customer",
        ..BASE
    },
];

/// Per-resource router state: the definition plus the repo bound to its collection.
#[derive(Clone, Debug)]
pub struct ResourceCtx {
    pub def: &'static ResourceDef,
    pub repo: ResourceRepo,
}

impl ResourceCtx {
    pub fn new(def: &'static ResourceDef, repo: ResourceRepo) -> Self {
        Self { def, repo }
    }
}
