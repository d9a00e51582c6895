use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::series::UserSeries;
use super::store::MeasurementStore;
use crate::error::Result;
use crate::model::{MetricName, ParsedRecord, Point, SampleValue, Timestamp, UserId};

/// Keeps every user in memory behind its own lock and, when given a data
/// directory, mirrors each user into `<dir>/users/<id>.json`.
pub struct FileStore {
    dir: Option<PathBuf>,
    users: RwLock<HashMap<UserId, Arc<Mutex<UserSeries>>>>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(dir.join("users"))
            .map_err(|e| (format!("couldn't create data directory {}", dir.display()), e))?;

        info!("measurement store opened at {}", dir.display());

        Ok(Self {
            dir: Some(dir),
            users: RwLock::new(HashMap::new()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            dir: None,
            users: RwLock::new(HashMap::new()),
        }
    }

    fn user(&self, user: UserId) -> Result<Arc<Mutex<UserSeries>>> {
        if let Some(series) = self.users.read().get(&user) {
            return Ok(Arc::clone(series));
        }

        // Loaded without the map lock; a concurrent loader of the same user
        // may win the insert, and its copy is the one kept.
        let loaded = Arc::new(Mutex::new(self.load(user)?));
        let series = self.users.write().entry(user).or_insert(loaded).clone();
        Ok(series)
    }

    fn user_path(&self, user: UserId) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join("users").join(format!("{}.json", user)))
    }

    fn load(&self, user: UserId) -> Result<UserSeries> {
        let path = match self.user_path(user) {
            Some(path) => path,
            None => return Ok(UserSeries::default()),
        };

        let buf = match fs::read(&path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(UserSeries::default()),
            Err(e) => return Err((format!("couldn't read {}", path.display()), e).into()),
        };

        debug!(user, "loaded series from {}", path.display());
        serde_json::from_slice(&buf)
            .map_err(|e| (format!("couldn't decode {}", path.display()), e).into())
    }

    fn persist(&self, user: UserId, series: &UserSeries) -> Result<()> {
        let path = match self.user_path(user) {
            Some(path) => path,
            None => return Ok(()),
        };

        let buf = serde_json::to_vec(series).map_err(|e| ("JSON serialization failed", e))?;
        write_atomically(&path, &buf)
    }

    // The change is applied to a copy and only becomes visible once it is on disk.
    fn update<F, T>(&self, user: UserId, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserSeries) -> T,
    {
        let series = self.user(user)?;
        let mut guard = series.lock();

        let mut next = guard.clone();
        let out = f(&mut next);
        self.persist(user, &next)?;
        *guard = next;

        Ok(out)
    }
}

pub(super) fn write_atomically(path: &Path, buf: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, buf).map_err(|e| (format!("couldn't write {}", tmp.display()), e))?;
    fs::rename(&tmp, path).map_err(|e| (format!("couldn't replace {}", path.display()), e))?;
    Ok(())
}

impl MeasurementStore for FileStore {
    fn append(
        &self,
        user: UserId,
        records: &[ParsedRecord],
        default_timestamp: Timestamp,
    ) -> Result<()> {
        self.update(user, |series| series.append(records, default_timestamp))?;
        debug!(user, records = records.len(), "appended records");
        Ok(())
    }

    fn all_points(&self, user: UserId) -> Result<Vec<Point>> {
        Ok(self.user(user)?.lock().all_points())
    }

    fn latest_per_key(&self, user: UserId) -> Result<BTreeMap<MetricName, SampleValue>> {
        Ok(self.user(user)?.lock().latest_per_key())
    }

    fn delete_point(&self, user: UserId, key: &str, timestamp: Timestamp) -> Result<bool> {
        self.update(user, |series| series.delete_point(key, timestamp))
    }

    fn clear(&self, user: UserId) -> Result<()> {
        self.update(user, UserSeries::clear)?;
        info!(user, "cleared all series");
        Ok(())
    }
}
