//! The article repository: one file per article, keyed by id.

use crate::entity::{Article, PublishStatus};
use crate::error::{CoreError, CoreResult};
use folio_codec::{RecordReader, RecordWriter, Ticks};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Durable article storage under `<root>/articles/`.
///
/// Each article is one whole file rewritten on save; a single lock
/// serializes saves against directory scans.
pub struct ArticleRepo {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl ArticleRepo {
    /// Creates the article directory if needed.
    pub fn open(root: &Path) -> CoreResult<Self> {
        let dir = root.join("articles");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    /// Whether an article with this id exists on disk.
    pub fn exists(&self, id: Uuid) -> bool {
        self.path(id).exists()
    }

    /// Loads one article.
    pub fn get(&self, id: Uuid) -> CoreResult<Option<Article>> {
        let _guard = self.lock.lock();
        self.read_unlocked(id)
    }

    /// Like [`ArticleRepo::get`] but absence is an error.
    pub fn require(&self, id: Uuid) -> CoreResult<Article> {
        self.get(id)?
            .ok_or_else(|| CoreError::not_found("article", id.to_string()))
    }

    fn read_unlocked(&self, id: Uuid) -> CoreResult<Option<Article>> {
        let path = self.path(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let mut reader = RecordReader::new(&bytes);
        Ok(Some(Article::decode(id, &mut reader)?))
    }

    /// Writes an article, replacing any previous content.
    pub fn save(&self, article: &Article) -> CoreResult<()> {
        let _guard = self.lock.lock();
        let mut writer = RecordWriter::new();
        article.encode(&mut writer);
        fs::write(self.path(article.id), writer.into_bytes())?;
        Ok(())
    }

    /// Stores a fresh submission under a new id.
    pub fn submit(
        &self,
        title: String,
        body: String,
        author: String,
        now: Ticks,
    ) -> CoreResult<Article> {
        let article = Article::new_submission(Uuid::new_v4(), title, body, author, now);
        self.save(&article)?;
        debug!(id = %article.id, author = %article.author, "article submitted");
        Ok(article)
    }

    /// Replaces an under-review article with a revised submission.
    ///
    /// The old record is frozen as `Revised` pointing forward at the new
    /// article; the new article points back and takes over review.
    pub fn revise(&self, id: Uuid, title: String, body: String, now: Ticks) -> CoreResult<Article> {
        let mut parent = self.require(id)?;

        let mut child = Article::new_submission(
            Uuid::new_v4(),
            title,
            body,
            parent.author.clone(),
            now,
        );
        child.previous_revision = Some(parent.id);

        parent.supersede(child.id)?;
        self.save(&child)?;
        self.save(&parent)?;
        Ok(child)
    }

    /// Follows the forward revision chain from `id` to its newest
    /// article. A broken link is corruption.
    pub fn latest_revision(&self, id: Uuid) -> CoreResult<Article> {
        let mut article = self.require(id)?;
        while let Some(next) = article.next_revision {
            article = self.get(next)?.ok_or_else(|| {
                CoreError::corrupted(format!("revision chain from {id} breaks at {next}"))
            })?;
        }
        Ok(article)
    }

    /// Articles published on the given civil day, or submitted (and not
    /// yet published) on it when `unpublished` is set.
    pub fn on_day(&self, day: i64, unpublished: bool) -> CoreResult<Vec<Article>> {
        let _guard = self.lock.lock();

        let mut matches = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|name| Uuid::parse_str(name).ok()) else {
                continue;
            };
            let Some(article) = self.read_unlocked(id)? else {
                continue;
            };

            let keep = if unpublished {
                article.status != PublishStatus::Published && article.upload_time.day_number() == day
            } else {
                article.publish_time.day_number() == day
            };
            if keep {
                matches.push(article);
            }
        }

        matches.sort_by_key(|article| article.upload_time);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NOW: Ticks = Ticks::from_unix_seconds(1_700_000_000);

    fn repo(root: &Path) -> ArticleRepo {
        ArticleRepo::open(root).unwrap()
    }

    #[test]
    fn submit_and_reload() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let article = repo
            .submit("Title".into(), "Body".into(), "alice1234".into(), NOW)
            .unwrap();
        assert!(repo.exists(article.id));

        let loaded = repo.require(article.id).unwrap();
        assert_eq!(loaded, article);
        assert_eq!(loaded.status, PublishStatus::UnderReview);
        assert_eq!(loaded.publish_time, Ticks::MAX);
    }

    #[test]
    fn publish_persists() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let mut article = repo
            .submit("Title".into(), "Body".into(), "alice1234".into(), NOW)
            .unwrap();
        article.publish(NOW).unwrap();
        repo.save(&article).unwrap();

        let loaded = repo.require(article.id).unwrap();
        assert_eq!(loaded.status, PublishStatus::Published);
        assert_eq!(loaded.publish_time, NOW);
    }

    #[test]
    fn revision_chain_links_both_ways() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());

        let parent = repo
            .submit("Title".into(), "Draft one".into(), "alice1234".into(), NOW)
            .unwrap();
        let child = repo
            .revise(parent.id, "Title".into(), "Draft two".into(), NOW)
            .unwrap();

        let parent = repo.require(parent.id).unwrap();
        assert_eq!(parent.status, PublishStatus::Revised);
        assert_eq!(parent.next_revision, Some(child.id));
        assert_eq!(child.previous_revision, Some(parent.id));
        assert_eq!(child.status, PublishStatus::UnderReview);
        assert_eq!(child.author, "alice1234");

        // Comment access reparents to the newest article in the chain.
        assert_eq!(repo.latest_revision(parent.id).unwrap().id, child.id);

        // A terminal article cannot be revised again.
        assert!(repo
            .revise(parent.id, "x".into(), "y".into(), NOW)
            .is_err());
    }

    #[test]
    fn day_listings() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let day = NOW.day_number();

        let mut published = repo
            .submit("P".into(), "b".into(), "alice1234".into(), NOW)
            .unwrap();
        published.publish(NOW).unwrap();
        repo.save(&published).unwrap();

        let pending = repo
            .submit("U".into(), "b".into(), "bob5678aa".into(), NOW)
            .unwrap();

        let listed = repo.on_day(day, false).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, published.id);

        let waiting = repo.on_day(day, true).unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, pending.id);

        // Days other than the publish day list nothing.
        assert!(repo.on_day(day + 1, false).unwrap().is_empty());

        // The sentinel publish time maps to a real day number, so the
        // pending article surfaces there even on a published listing.
        let sentinel_day = repo.on_day(Ticks::MAX.day_number(), false).unwrap();
        assert_eq!(sentinel_day.len(), 1);
        assert_eq!(sentinel_day[0].id, pending.id);
    }
}
