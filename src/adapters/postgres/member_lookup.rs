use crate::domain::{MemberId, member::Member};
use crate::ports::member_lookup::{MemberLookup as MemberLookupTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of MemberLookup
pub struct MemberLookup {
    pool: PgPool,
}

impl MemberLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberLookupTrait for MemberLookup {
    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT id, name, is_active FROM members WHERE id = $1")
            .bind(member_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Member {
            member_id: MemberId::from_uuid(row.get("id")),
            name: row.get("name"),
            is_active: row.get("is_active"),
        }))
    }
}
