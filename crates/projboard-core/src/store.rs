//! In-memory entity store
//!
//! Each entity collection sits behind its own `RwLock`, so readers run in
//! parallel while a writer holds one collection at a time. Mutations are
//! additionally serialized through a single writer gate owned by the store,
//! which keeps validate-then-apply sequences in the service atomic with
//! respect to other writers. Nothing is persisted.

use crate::{
    BugReport, BugReportId, Error, Milestone, MilestoneId, Project, ProjectId, Result, Ticket,
    TicketId, User, UserId,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One keyed collection. Reads hand out clones, never references.
pub struct Collection<K, V> {
    name: &'static str,
    items: RwLock<HashMap<K, V>>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn new(name: &'static str) -> Self {
        Self {
            name,
            items: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.items.read().map_err(|_| Error::StorePoisoned(self.name))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.items.write().map_err(|_| Error::StorePoisoned(self.name))
    }

    /// Snapshot of a single entity
    pub fn get(&self, id: &K) -> Result<Option<V>> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn contains(&self, id: &K) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    /// Snapshot of every entity matching `pred`
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Result<Vec<V>> {
        Ok(self.read()?.values().filter(|v| pred(v)).cloned().collect())
    }

    /// Snapshot of the entities for `ids`, in the order given; unknown ids are skipped
    pub fn get_many(&self, ids: &[K]) -> Result<Vec<V>> {
        let items = self.read()?;
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Insert or replace
    ///
    /// This is a raw write: no authorization, lifecycle or reference checks run.
    /// Mutations go through `ProjectService`; this is for seeding fixtures and imports.
    pub fn put(&self, id: K, value: V) -> Result<()> {
        self.write()?.insert(id, value);
        Ok(())
    }
}

/// All entity collections
pub struct Store {
    pub users: Collection<UserId, User>,
    pub projects: Collection<ProjectId, Project>,
    pub milestones: Collection<MilestoneId, Milestone>,
    pub tickets: Collection<TicketId, Ticket>,
    pub bug_reports: Collection<BugReportId, BugReport>,
    writer: Mutex<()>,
}

/// Held for the duration of a mutation
pub(crate) type WriteGuard<'a> = MutexGuard<'a, ()>;

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Collection::new("users"),
            projects: Collection::new("projects"),
            milestones: Collection::new("milestones"),
            tickets: Collection::new("tickets"),
            bug_reports: Collection::new("bug_reports"),
            writer: Mutex::new(()),
        }
    }

    /// Serialize a mutation against every other writer
    pub(crate) fn begin_write(&self) -> Result<WriteGuard<'_>> {
        self.writer.lock().map_err(|_| Error::StorePoisoned("writer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_filter() {
        let store = Store::new();
        let user = User::new("dev", "dev@test.com", "Dev").unwrap();
        store.users.put(user.id, user.clone()).unwrap();

        assert_eq!(store.users.get(&user.id).unwrap(), Some(user.clone()));
        assert!(store.users.contains(&user.id).unwrap());
        assert_eq!(store.users.filter(|u| u.username == "dev").unwrap().len(), 1);
        assert_eq!(store.users.len().unwrap(), 1);
        assert!(store.projects.is_empty().unwrap());
    }

    #[test]
    fn test_get_many_keeps_order() {
        let store = Store::new();
        let a = User::new("a", "a@test.com", "A").unwrap();
        let b = User::new("b", "b@test.com", "B").unwrap();
        store.users.put(a.id, a.clone()).unwrap();
        store.users.put(b.id, b.clone()).unwrap();

        let got = store.users.get_many(&[b.id, UserId::new(), a.id]).unwrap();
        let names: Vec<_> = got.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_snapshots_are_detached() {
        let store = Store::new();
        let user = User::new("dev", "dev@test.com", "Dev").unwrap();
        store.users.put(user.id, user.clone()).unwrap();

        let mut snapshot = store.users.get(&user.id).unwrap().unwrap();
        snapshot.display_name = "Changed".into();
        assert_eq!(store.users.get(&user.id).unwrap().unwrap().display_name, "Dev");
    }

    #[test]
    fn test_parallel_readers_one_writer() {
        let store = std::sync::Arc::new(Store::new());
        let project = Project::new("P", None, UserId::new()).unwrap();
        let project_id = project.id;
        store.projects.put(project_id, project).unwrap();

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let ticket = Ticket::new(&format!("t{i}"), None, project_id, None).unwrap();
                    let _gate = store.begin_write().unwrap();
                    store.tickets.put(ticket.id, ticket).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let n = store.tickets.filter(|t| t.project_id == project_id).unwrap().len();
                        assert!(n <= 200);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(store.tickets.len().unwrap(), 200);
    }
}
