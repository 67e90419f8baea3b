//! Daily audit event logs.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use folio_codec::{CodecError, CodecResult, RecordReader, RecordWriter, Ticks};
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// How much an event matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    /// Routine operation.
    Information,
    /// Unusual but handled.
    Warning,
    /// Security-relevant, wants review.
    Alert,
    /// Service-threatening.
    Critical,
}

impl EventSeverity {
    /// Decodes the wire byte.
    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            1 => Ok(Self::Information),
            2 => Ok(Self::Warning),
            3 => Ok(Self::Alert),
            4 => Ok(Self::Critical),
            value => Err(CodecError::InvalidTag {
                field: "event severity",
                value,
            }),
        }
    }

    /// Encodes the wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Information => 1,
            Self::Warning => 2,
            Self::Alert => 3,
            Self::Critical => 4,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Alert => "alert",
            Self::Critical => "critical",
        }
    }
}

/// One audit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// How much it matters.
    pub severity: EventSeverity,
    /// What happened.
    pub description: String,
    /// The acting account, when known.
    pub username: Option<String>,
    /// The remote address, when known.
    pub address: Option<IpAddr>,
    /// When it happened.
    pub time: Ticks,
}

impl LogEvent {
    fn encode(&self, writer: &mut RecordWriter) {
        writer.put_u8(self.severity.to_byte());
        writer.put_string(&self.description);
        match &self.username {
            Some(username) => {
                writer.put_bool(true);
                writer.put_string(username);
            }
            None => writer.put_bool(false),
        }
        match &self.address {
            Some(IpAddr::V4(v4)) => {
                writer.put_u8(4);
                writer.put_bytes(&v4.octets());
            }
            Some(IpAddr::V6(v6)) => {
                writer.put_u8(16);
                writer.put_bytes(&v6.octets());
            }
            None => writer.put_u8(0),
        }
        writer.put_ticks(self.time);
    }

    fn decode(reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        let severity = EventSeverity::from_byte(reader.get_u8()?)?;
        let description = reader.get_string()?;
        let username = if reader.get_bool()? {
            Some(reader.get_string()?)
        } else {
            None
        };
        let address = match reader.get_u8()? {
            0 => None,
            4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(reader.get_bytes(4)?);
                Some(IpAddr::from(octets))
            }
            16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(reader.get_bytes(16)?);
                Some(IpAddr::from(octets))
            }
            value => {
                return Err(CodecError::InvalidTag {
                    field: "address length",
                    value,
                })
            }
        };
        Ok(Self {
            severity,
            description,
            username,
            address,
            time: reader.get_ticks()?,
        })
    }
}

/// Filters for [`EventLog::query`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Skip this many matching events before collecting.
    pub offset: usize,
    /// Stop after this many events; 0 means 10.
    pub limit: usize,
    /// Only events attributed to this account.
    pub username: Option<String>,
    /// Only events from this address.
    pub address: Option<IpAddr>,
    /// Only events at least this severe.
    pub min_severity: EventSeverity,
}

impl Default for EventSeverity {
    fn default() -> Self {
        Self::Information
    }
}

/// Append-only audit log under `<root>/logs/`, one file per calendar
/// day.
pub struct EventLog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl EventLog {
    /// Creates the log directory if needed.
    pub fn open(root: &Path) -> CoreResult<Self> {
        let dir = root.join("logs");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn day_path(&self, time: Ticks) -> CoreResult<PathBuf> {
        let date = DateTime::<Utc>::from_timestamp(time.unix_seconds(), time.subsec_nanos())
            .ok_or_else(|| CoreError::corrupted(format!("event time {time} out of range")))?
            .date_naive();
        Ok(self.dir.join(format!("events_{}.dat", date.format("%Y-%m-%d"))))
    }

    /// Appends one event to its day's file.
    pub fn record(&self, event: &LogEvent) -> CoreResult<()> {
        let _guard = self.lock.lock();

        let mut writer = RecordWriter::new();
        event.encode(&mut writer);

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.day_path(event.time)?)?;
        file.write_all(&writer.into_bytes())?;
        Ok(())
    }

    /// Events between `from` and `to` inclusive, newest day first,
    /// filtered by `query`.
    pub fn query(&self, from: Ticks, to: Ticks, query: &EventQuery) -> CoreResult<Vec<LogEvent>> {
        let _guard = self.lock.lock();

        let limit = if query.limit == 0 { 10 } else { query.limit };
        let mut events = Vec::with_capacity(limit.min(100));
        let mut skipped = 0usize;

        let mut day = to.day_number();
        while day >= from.day_number() {
            let path = self
                .dir
                .join(format!("events_{}.dat", day_label(day)?));
            day -= 1;
            if !path.exists() {
                continue;
            }

            let bytes = fs::read(&path)?;
            let mut reader = RecordReader::new(&bytes);
            while !reader.is_empty() {
                let event = LogEvent::decode(&mut reader)?;
                if event.time < from || event.time > to {
                    continue;
                }
                if let Some(username) = &query.username {
                    if event.username.as_deref() != Some(username.as_str()) {
                        continue;
                    }
                }
                if let Some(address) = query.address {
                    if event.address != Some(address) {
                        continue;
                    }
                }
                if event.severity < query.min_severity {
                    continue;
                }

                if skipped < query.offset {
                    skipped += 1;
                    continue;
                }
                events.push(event);
                if events.len() == limit {
                    return Ok(events);
                }
            }
        }

        Ok(events)
    }
}

fn day_label(day: i64) -> CoreResult<String> {
    let date = DateTime::<Utc>::from_timestamp(day * 86_400, 0)
        .ok_or_else(|| CoreError::corrupted(format!("day number {day} out of range")))?
        .date_naive();
    Ok(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use tempfile::tempdir;

    const NOW: Ticks = Ticks::from_unix_seconds(1_700_000_000);

    fn event(description: &str, severity: EventSeverity, username: Option<&str>) -> LogEvent {
        LogEvent {
            severity,
            description: description.into(),
            username: username.map(String::from),
            address: Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))),
            time: NOW,
        }
    }

    #[test]
    fn event_roundtrip() {
        for sample in [
            event("login failed", EventSeverity::Warning, Some("alice1234")),
            LogEvent {
                severity: EventSeverity::Information,
                description: "startup".into(),
                username: None,
                address: None,
                time: NOW,
            },
            LogEvent {
                severity: EventSeverity::Alert,
                description: "v6 client".into(),
                username: Some("bob5678aa".into()),
                address: Some(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x9))),
                time: NOW,
            },
        ] {
            let mut writer = RecordWriter::new();
            sample.encode(&mut writer);
            let bytes = writer.into_bytes();
            let mut reader = RecordReader::new(&bytes);
            assert_eq!(LogEvent::decode(&mut reader).unwrap(), sample);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn record_and_query() {
        let dir = tempdir().unwrap();
        let log = EventLog::open(dir.path()).unwrap();

        log.record(&event("one", EventSeverity::Information, Some("alice1234")))
            .unwrap();
        log.record(&event("two", EventSeverity::Alert, Some("bob5678aa")))
            .unwrap();
        log.record(&event("three", EventSeverity::Critical, None))
            .unwrap();

        let all = log
            .query(Ticks::ZERO, Ticks::from_unix_seconds(1_800_000_000), &EventQuery::default())
            .unwrap();
        assert_eq!(all.len(), 3);

        let alice_only = log
            .query(
                Ticks::ZERO,
                Ticks::from_unix_seconds(1_800_000_000),
                &EventQuery {
                    username: Some("alice1234".into()),
                    ..EventQuery::default()
                },
            )
            .unwrap();
        assert_eq!(alice_only.len(), 1);
        assert_eq!(alice_only[0].description, "one");

        let severe = log
            .query(
                Ticks::ZERO,
                Ticks::from_unix_seconds(1_800_000_000),
                &EventQuery {
                    min_severity: EventSeverity::Alert,
                    ..EventQuery::default()
                },
            )
            .unwrap();
        assert_eq!(severe.len(), 2);
    }

    #[test]
    fn query_pagination_and_window() {
        let dir = tempdir().unwrap();
        let log = EventLog::open(dir.path()).unwrap();

        for index in 0..5 {
            log.record(&LogEvent {
                severity: EventSeverity::Information,
                description: format!("event {index}"),
                username: None,
                address: None,
                time: Ticks::from_unix_seconds(1_700_000_000 + index),
            })
            .unwrap();
        }

        let page = log
            .query(
                Ticks::ZERO,
                Ticks::from_unix_seconds(1_800_000_000),
                &EventQuery {
                    offset: 2,
                    limit: 2,
                    ..EventQuery::default()
                },
            )
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].description, "event 2");

        // Events outside the window are excluded.
        let none = log
            .query(
                Ticks::from_unix_seconds(1_700_000_100),
                Ticks::from_unix_seconds(1_700_000_200),
                &EventQuery::default(),
            )
            .unwrap();
        assert!(none.is_empty());
    }
}
