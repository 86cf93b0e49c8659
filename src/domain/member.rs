use serde::{Deserialize, Serialize};

use super::MemberId;

/// 会員（貸出管理に必要な部分のみ）
///
/// ビジネスルール：有効な会員のみが新規貸出を受けられる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub is_active: bool,
}

impl Member {
    pub fn active(member_id: MemberId, name: impl Into<String>) -> Self {
        Self {
            member_id,
            name: name.into(),
            is_active: true,
        }
    }

    pub fn inactive(member_id: MemberId, name: impl Into<String>) -> Self {
        Self {
            is_active: false,
            ..Self::active(member_id, name)
        }
    }
}
