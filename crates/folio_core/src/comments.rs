//! Per-discussion comment logs.

use crate::entity::Comment;
use crate::error::{CoreError, CoreResult};
use folio_codec::{RecordReader, RecordWriter};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Comment storage under `<root>/comments/`, one file per discussion.
///
/// Each file is a little-endian u32 comment count followed by that many
/// encoded comments; appending rewrites the count and extends the file.
pub struct CommentLog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl CommentLog {
    /// Creates the comment directory if needed.
    pub fn open(root: &Path) -> CoreResult<Self> {
        let dir = root.join("comments");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path(&self, discussion: Uuid) -> PathBuf {
        self.dir.join(format!("{discussion}.dat"))
    }

    /// Loads a discussion's comments in posting order. A discussion with
    /// no file has no comments. Revision-request comments can be filtered
    /// out for public readers.
    pub fn load(&self, discussion: Uuid, exclude_revisions: bool) -> CoreResult<Vec<Comment>> {
        let _guard = self.lock.lock();

        let path = self.path(discussion);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;

        let mut reader = RecordReader::new(&bytes);
        let count = reader.get_u32()?;
        let mut comments = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let comment = Comment::decode(&mut reader)?;
            if !(exclude_revisions && comment.revision_requested) {
                comments.push(comment);
            }
        }
        if !reader.is_empty() {
            return Err(CoreError::corrupted(format!(
                "{} trailing bytes in discussion {discussion}",
                reader.remaining()
            )));
        }
        Ok(comments)
    }

    /// Appends one comment, bumping the leading count.
    pub fn add(&self, discussion: Uuid, comment: &Comment) -> CoreResult<()> {
        let _guard = self.lock.lock();

        let path = self.path(discussion);
        let mut bytes = if path.exists() {
            fs::read(&path)?
        } else {
            0u32.to_le_bytes().to_vec()
        };

        let mut reader = RecordReader::new(&bytes);
        let count = reader.get_u32()?;
        bytes[..4].copy_from_slice(&(count + 1).to_le_bytes());

        let mut writer = RecordWriter::new();
        comment.encode(&mut writer);
        bytes.extend_from_slice(&writer.into_bytes());

        fs::write(&path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_codec::Ticks;
    use tempfile::tempdir;

    const NOW: Ticks = Ticks::from_unix_seconds(1_700_000_000);

    fn comment(sender: &str, content: &str, revision: bool) -> Comment {
        Comment::new(sender.into(), content.into(), revision, NOW)
    }

    #[test]
    fn empty_discussion_has_no_comments() {
        let dir = tempdir().unwrap();
        let log = CommentLog::open(dir.path()).unwrap();
        assert!(log.load(Uuid::new_v4(), false).unwrap().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let dir = tempdir().unwrap();
        let log = CommentLog::open(dir.path()).unwrap();
        let discussion = Uuid::new_v4();

        log.add(discussion, &comment("alice1234", "first", false))
            .unwrap();
        log.add(discussion, &comment("bob5678aa", "second", false))
            .unwrap();

        let comments = log.load(discussion, false).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
        assert_eq!(comments[1].content, "second");
    }

    #[test]
    fn revision_requests_can_be_hidden() {
        let dir = tempdir().unwrap();
        let log = CommentLog::open(dir.path()).unwrap();
        let discussion = Uuid::new_v4();

        log.add(discussion, &comment("alice1234", "public", false))
            .unwrap();
        log.add(discussion, &comment("ed1234567", "needs work", true))
            .unwrap();

        assert_eq!(log.load(discussion, false).unwrap().len(), 2);
        let visible = log.load(discussion, true).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].sender, "alice1234");
    }
}
