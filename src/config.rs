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

/// Tunable knobs the core owns directly, as opposed to the SQL/HTTP/CLI
/// concerns that live outside this crate.
pub mod defaults {
    /// Prefix every attachment staging temp file's basename must start with.
    pub const TEMP_FILE_PREFIX: &str = "temp";

    /// Size, in bytes, of the buffer used to stream attachment bytes from
    /// source to temp file. Bounded so staging a multi-gigabyte attachment
    /// never requires holding it all in memory.
    pub const ATTACHMENT_IO_CHUNK_SIZE: usize = 64 * 1024;

    /// Number of random bytes used to build a temp filename's unique
    /// suffix. 16 bytes (128 bits) comfortably covers the "122-bit suffix"
    /// called for by the spec.
    pub const TEMP_SUFFIX_RANDOM_BYTES: usize = 16;

    /// Capacity of the event bus's bounded channel. A publish beyond this
    /// capacity is dropped rather than blocking the publisher (see
    /// [`crate::event_bus`]).
    pub const EVENT_BUS_CHANNEL_CAPACITY: usize = 256;

    /// Name of the attachments subdirectory inside a datastore's root.
    pub const ATTACHMENTS_DIR_NAME: &str = "attachments";
}

/// Runtime configuration for a [`crate::Datastore`].
#[derive(Debug, Clone)]
pub struct DatastoreConfig {
    /// Buffer size used when streaming attachment bytes during staging.
    pub attachment_io_chunk_size: usize,

    /// Capacity of the event bus's bounded channel.
    pub event_bus_channel_capacity: usize,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            attachment_io_chunk_size: defaults::ATTACHMENT_IO_CHUNK_SIZE,
            event_bus_channel_capacity: defaults::EVENT_BUS_CHANNEL_CAPACITY,
        }
    }
}
