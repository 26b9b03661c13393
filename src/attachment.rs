// driftdb is an embedded, offline-first document datastore
// Copyright (C) 2026  driftdb contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use rand::RngCore;
use sha1::{Digest, Sha1};

use crate::config::defaults;
use crate::error::DatastoreError;

/// How an attachment's bytes are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentEncoding {
    /// Bytes are stored verbatim.
    Plain,
    /// Bytes are gzip-compressed on disk; the SHA-1 digest is still over
    /// the decoded content.
    Gzip,
}

impl FromStr for AttachmentEncoding {
    type Err = DatastoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Plain" => Ok(AttachmentEncoding::Plain),
            "Gzip" => Ok(AttachmentEncoding::Gzip),
            other => Err(DatastoreError::InvalidArgument(format!(
                "unknown attachment encoding '{other}'"
            ))),
        }
    }
}

/// The external collaborator that supplies attachment bytes: a named
/// readable stream. `prepare` never needs to know whether the bytes come
/// from the network, a file, or memory.
pub struct AttachmentSource {
    name: String,
    reader: Box<dyn Read + Send>,
}

impl AttachmentSource {
    pub fn new(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A cooperative cancellation signal shared across threads, mirroring the
/// `Arc<AtomicBool>` + `Ordering::Acquire`/`AcqRel` idiom used elsewhere in
/// this crate's lineage for cross-thread signaling.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A staged, digest-computed attachment ready for atomic commit into the
/// store.
#[derive(Debug)]
pub struct PreparedAttachment {
    pub source_attachment: String,
    pub temp_file_path: PathBuf,
    pub sha1_digest: [u8; 20],
    pub encoding: AttachmentEncoding,
}

impl PreparedAttachment {
    pub fn sha1_hex(&self) -> String {
        hex_encode(&self.sha1_digest)
    }
}

enum EncodedWriter {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl Write for EncodedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            EncodedWriter::Plain(f) => f.write(buf),
            EncodedWriter::Gzip(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            EncodedWriter::Plain(f) => f.flush(),
            EncodedWriter::Gzip(e) => e.flush(),
        }
    }
}

impl EncodedWriter {
    fn finish(self) -> std::io::Result<()> {
        match self {
            EncodedWriter::Plain(mut f) => f.flush(),
            EncodedWriter::Gzip(e) => e.finish().map(|_| ()),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Picks a fresh temp filename in `attachments_dir` whose basename begins
/// with the crate's temp-file prefix, followed by a random, globally
/// unique suffix.
fn fresh_temp_path(attachments_dir: &Path) -> PathBuf {
    loop {
        let mut suffix = vec![0u8; defaults::TEMP_SUFFIX_RANDOM_BYTES];
        rand::rng().fill_bytes(&mut suffix);
        let candidate = attachments_dir.join(format!(
            "{}{}",
            defaults::TEMP_FILE_PREFIX,
            hex_encode(&suffix)
        ));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Stages `source`'s bytes into a fresh temp file under `attachments_dir`,
/// computing the SHA-1 digest of the decoded content as it streams.
///
/// Uses a fixed-size buffer (`chunk_size` bytes) so staging a large
/// attachment never requires holding the whole payload in memory. Checks
/// `cancel` once per chunk; on cancellation, or on any I/O failure, the
/// temp file is removed before the error is returned.
pub fn prepare(
    source: AttachmentSource,
    attachments_dir: &Path,
    encoding: AttachmentEncoding,
    cancel: &CancellationToken,
    chunk_size: usize,
) -> Result<PreparedAttachment, DatastoreError> {
    let _span = tracing::debug_span!("attachment::prepare", name = %source.name()).entered();

    let temp_file_path = fresh_temp_path(attachments_dir);
    let mut reader = source.reader;

    let file = File::create(&temp_file_path)?;
    let mut writer = match encoding {
        AttachmentEncoding::Plain => EncodedWriter::Plain(file),
        AttachmentEncoding::Gzip => EncodedWriter::Gzip(GzEncoder::new(file, Compression::default())),
    };

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; chunk_size.max(1)];

    let result = (|| -> Result<(), DatastoreError> {
        loop {
            if cancel.is_cancelled() {
                return Err(DatastoreError::Cancelled);
            }

            let read = reader.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
            writer.write_all(&buf[..read])?;
        }
        writer.finish()?;
        Ok(())
    })();

    // Release the input source on every exit path, success or failure.
    drop(reader);

    if let Err(err) = result {
        let _ = std::fs::remove_file(&temp_file_path);
        tracing::warn!(error = %err, "attachment staging failed, removed temp file");
        return Err(err);
    }

    let digest: [u8; 20] = hasher.finalize().into();

    Ok(PreparedAttachment {
        source_attachment: source.name,
        temp_file_path,
        sha1_digest: digest,
        encoding,
    })
}

/// Commits a prepared attachment by renaming its temp file to its final,
/// digest-named path inside `attachments_dir`. Consumes the
/// `PreparedAttachment`: it is meant to be committed exactly once.
pub fn commit(prepared: PreparedAttachment, attachments_dir: &Path) -> Result<PathBuf, DatastoreError> {
    let final_path = attachments_dir.join(prepared.sha1_hex());
    std::fs::rename(&prepared.temp_file_path, &final_path)?;
    Ok(final_path)
}
