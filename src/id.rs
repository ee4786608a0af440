//! Record id generation

/// Supplies ids for records created without one
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    fn generate(&self) -> String;
}

/// Time-ordered UUIDv7 ids in simple (32 hex chars, no hyphens) form
///
/// Ids created later sort after ids created earlier, so ordering by `id`
/// approximates creation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        uuid::Uuid::now_v7().simple().to_string()
    }
}
