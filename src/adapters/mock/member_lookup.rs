use crate::domain::{MemberId, member::Member};
use crate::ports::member_lookup::{MemberLookup as MemberLookupTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock implementation of MemberLookup
///
/// Supports stateful testing by storing registered members.
pub struct MemberLookup {
    members: Mutex<HashMap<MemberId, Member>>,
}

impl MemberLookup {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
        }
    }

    /// Register a member for testing purposes
    pub fn add_member(&self, member: Member) {
        self.members.lock().unwrap().insert(member.member_id, member);
    }
}

impl Default for MemberLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberLookupTrait for MemberLookup {
    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self.members.lock().unwrap().get(&member_id).cloned())
    }
}
