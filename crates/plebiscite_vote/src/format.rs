//! Announcement and result message text.

use crate::Outcome;
use plebiscite_interface::{UserId, VotePayload};

/// Placeholder used when a vote has no known requester.
const ANONYMOUS: &str = "누군가";

/// Text of the announcement posted when a vote opens.
pub fn announcement_text(requester: Option<UserId>, target: UserId, change: &VotePayload) -> String {
    let requester = requester.map_or_else(|| ANONYMOUS.to_string(), |id| format!("<@{id}>"));
    match change {
        VotePayload::Rename { new_name } => {
            format!("{requester}가 <@{target}>의 이름을 `{new_name}`로 바꾸자고 요청했습니다.")
        }
        VotePayload::Role {
            role_id,
            remove: false,
        } => format!("{requester}가 <@{target}>에게 <@&{role_id}> 역할을 추가하자고 요청했습니다."),
        VotePayload::Role {
            role_id,
            remove: true,
        } => format!("{requester}가 <@{target}>한테서 <@&{role_id}> 역할을 빼자고 요청했습니다."),
    }
}

/// Announcement text after resolution: the original struck through, followed
/// by the outcome and both voter lists.
pub fn result_text(original: &str, outcome: Outcome, yes: &[UserId], no: &[UserId]) -> String {
    format!(
        "~~{original}~~\n**결과: __{outcome}__**\n-# 찬성({}): {}\n-# 반대({}): {}",
        yes.len(),
        mentions(yes),
        no.len(),
        mentions(no),
    )
}

fn mentions(users: &[UserId]) -> String {
    if users.is_empty() {
        return "(없음)".to_string();
    }
    users
        .iter()
        .map(|id| format!("<@{id}>"))
        .collect::<Vec<_>>()
        .join(" ")
}
