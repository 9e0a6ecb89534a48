use super::presence::PresenceSnapshot;
use crate::types::Member;
use std::collections::HashMap;

/// Mutable state for a PusherChannel
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    /// Membership keyed by user id
    pub members: HashMap<String, Member>,
    /// This client's own identity on a presence channel
    pub me: Option<Member>,
    pub subscription_count: Option<u64>,
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a member. Returns `true` if the user was not present before.
    pub fn upsert_member(&mut self, member: Member) -> bool {
        self.members.insert(member.user_id.clone(), member).is_none()
    }

    pub fn remove_member(&mut self, user_id: &str) -> Option<Member> {
        self.members.remove(user_id)
    }

    /// Merges a presence snapshot into the membership set.
    ///
    /// `own_user_id` is the user id the subscription event named; the matching entry becomes
    /// `me`. Members already known (e.g. from an earlier member-added) are updated in place.
    pub fn apply_presence_snapshot(
        &mut self,
        snapshot: PresenceSnapshot,
        own_user_id: Option<&str>,
    ) -> usize {
        let applied = snapshot.hash.len();

        for (user_id, user_info) in snapshot.hash {
            let member = Member::new(user_id, user_info);
            if own_user_id == Some(member.user_id.as_str()) {
                self.me = Some(member.clone());
            }
            self.upsert_member(member);
        }

        applied
    }
}
