//! Faculty group membership sync.
//!
//! Each department's portal faculty group should contain everyone teaching
//! in that department this semester. The static table in `taxsync-shared`
//! maps department codes to group names; membership updates go through the
//! store's group endpoints, which replace the whole member list per update.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use taxsync_shared::{Course, Result, dept_for_group, dept_group};
use taxsync_store::{GroupUpdate, RemoteGroup, TermStore};

/// A user group in the store, with lazily fetched membership.
#[derive(Debug)]
pub struct FacultyGroup {
    pub uuid: String,
    pub name: String,
    pub parent_uuid: Option<String>,
    /// `None` until fetched from the store.
    users: Option<Vec<String>>,
}

impl FacultyGroup {
    pub fn from_remote(group: RemoteGroup) -> Self {
        Self {
            uuid: group.uuid,
            name: group.name,
            parent_uuid: group.parent_uuid,
            users: None,
        }
    }

    /// The department code this group serves, if any. Architecture programs
    /// share one group.
    pub fn department(&self) -> Option<&'static str> {
        dept_for_group(&self.name)
    }

    /// Current member list, fetched from the store at most once.
    pub async fn users(&mut self, store: &TermStore) -> Result<&[String]> {
        if self.users.is_none() {
            let fetched = store.group_users(&self.uuid).await?;
            debug!(group = %self.name, count = fetched.len(), "fetched group members");
            self.users = Some(fetched);
        }
        Ok(self.users.as_deref().unwrap_or_default())
    }

    /// Add usernames to the group, deduplicating against current members.
    /// Returns how many were actually new; no store call when nothing
    /// changes.
    pub async fn add_users(&mut self, store: &TermStore, new_users: &[String]) -> Result<usize> {
        self.users(store).await?;
        let mut members = self.users.take().unwrap_or_default();
        let mut added = 0;
        for user in new_users {
            if !members.contains(user) {
                members.push(user.clone());
                added += 1;
            }
        }
        if added == 0 {
            self.users = Some(members);
            return Ok(0);
        }
        self.put_members(store, members).await?;
        info!(group = %self.name, added, "added users to group");
        Ok(added)
    }

    /// Remove usernames from the group. No store call when nothing changes.
    pub async fn remove_users(&mut self, store: &TermStore, banlist: &[String]) -> Result<usize> {
        self.users(store).await?;
        let members = self.users.take().unwrap_or_default();
        let kept: Vec<String> = members
            .iter()
            .filter(|u| !banlist.contains(u))
            .cloned()
            .collect();
        let removed = members.len() - kept.len();
        if removed == 0 {
            self.users = Some(members);
            return Ok(0);
        }
        self.put_members(store, kept).await?;
        info!(group = %self.name, removed, "removed users from group");
        Ok(removed)
    }

    async fn put_members(&mut self, store: &TermStore, members: Vec<String>) -> Result<()> {
        store
            .update_group(&GroupUpdate {
                id: self.uuid.clone(),
                name: self.name.clone(),
                parent_id: self.parent_uuid.clone(),
                users: members.clone(),
            })
            .await?;
        self.users = Some(members);
        Ok(())
    }
}

/// Who is teaching in which department this batch: owner code → usernames.
pub fn teaching_by_department(courses: &[Course]) -> BTreeMap<String, BTreeSet<String>> {
    let mut teaching: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for course in courses {
        let Some(owner) = course.owner() else { continue };
        let entry = teaching.entry(owner).or_default();
        entry.extend(course.instructors.iter().map(|i| i.username.clone()));
    }
    teaching
}

/// Outcome of a faculty-group sync run.
#[derive(Debug, Default)]
pub struct GroupSyncReport {
    pub groups_updated: usize,
    pub users_added: usize,
    /// Departments from the course data with no faculty group in the table
    /// or no matching group in the store.
    pub departments_skipped: Vec<String>,
}

/// Ensure every instructor in `courses` is a member of their department's
/// faculty group.
pub async fn sync_faculty_groups(
    store: &TermStore,
    groups: &mut [FacultyGroup],
    courses: &[Course],
) -> Result<GroupSyncReport> {
    let mut report = GroupSyncReport::default();

    for (dept, usernames) in teaching_by_department(courses) {
        let group_name = dept_group(&dept).and_then(|g| g.group);
        let Some(group_name) = group_name else {
            debug!(department = %dept, "department has no faculty group");
            report.departments_skipped.push(dept);
            continue;
        };
        let Some(group) = groups.iter_mut().find(|g| g.name == group_name) else {
            warn!(department = %dept, group = group_name, "faculty group missing from store");
            report.departments_skipped.push(dept);
            continue;
        };
        let users: Vec<String> = usernames.into_iter().collect();
        let added = group.add_users(store, &users).await?;
        if added > 0 {
            report.groups_updated += 1;
            report.users_added += added;
        }
    }
    Ok(report)
}
