//! Raw memory segments with an owning scope and a byte order.
//!
//! A [`MemorySegment`] is a window onto shared byte storage. Every segment
//! belongs to a scope: heap segments to a global scope that never closes,
//! arena segments to their [`Arena`]. Once an arena is closed, every access
//! through one of its segments fails with
//! [`LaneError::ResourceReleased`](crate::error::LaneError::ResourceReleased).

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::debug;

use crate::error::{check_from_index_size, check_index, read_only, released_resource, Result};

/// Order of the bytes of one lane in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// The byte order of the running platform.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    pub fn is_native(self) -> bool {
        self == Self::native()
    }
}

#[derive(Debug)]
struct Scope {
    id: u64,
    alive: AtomicBool,
}

impl Scope {
    fn new() -> Arc<Self> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Arc::new(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            alive: AtomicBool::new(true),
        })
    }

    fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<Scope>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| {
                Arc::new(Scope {
                    id: 0,
                    alive: AtomicBool::new(true),
                })
            })
            .clone()
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Owner of a group of segments that are released together.
#[derive(Debug)]
pub struct Arena {
    scope: Arc<Scope>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
        }
    }

    /// A zero-filled segment of `byte_size` bytes owned by this arena.
    pub fn allocate(&self, byte_size: usize) -> MemorySegment {
        MemorySegment::with_scope(vec![0; byte_size], self.scope.clone())
    }

    /// A segment owned by this arena holding a copy of `bytes`.
    pub fn allocate_from(&self, bytes: &[u8]) -> MemorySegment {
        MemorySegment::with_scope(bytes.to_vec(), self.scope.clone())
    }

    pub fn is_alive(&self) -> bool {
        self.scope.is_alive()
    }

    /// Releases every segment of this arena. Closing twice is a no-op.
    pub fn close(&self) {
        if self.scope.alive.swap(false, Ordering::AcqRel) {
            debug!("closed arena scope {}", self.scope.id);
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.close();
    }
}

/// A bounded, scoped window onto shared bytes.
#[derive(Clone)]
pub struct MemorySegment {
    storage: Arc<RwLock<Vec<u8>>>,
    scope: Arc<Scope>,
    offset: usize,
    len: usize,
    read_only: bool,
}

impl MemorySegment {
    fn with_scope(bytes: Vec<u8>, scope: Arc<Scope>) -> Self {
        let len = bytes.len();
        Self {
            storage: Arc::new(RwLock::new(bytes)),
            scope,
            offset: 0,
            len,
            read_only: false,
        }
    }

    /// A heap segment over `bytes` that is never released.
    pub fn of_vec(bytes: Vec<u8>) -> Self {
        Self::with_scope(bytes, Scope::global())
    }

    pub fn byte_size(&self) -> usize {
        self.len
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_alive(&self) -> bool {
        self.scope.is_alive()
    }

    /// A read-only view of the same bytes.
    pub fn as_read_only(&self) -> MemorySegment {
        Self {
            read_only: true,
            ..self.clone()
        }
    }

    /// The sub-segment `[offset, offset + len)` sharing this segment's bytes.
    pub fn slice(&self, offset: usize, len: usize) -> Result<MemorySegment> {
        self.check_alive()?;
        let start = check_from_index_size(offset as isize, len, self.len)?;
        Ok(Self {
            offset: self.offset + start,
            len,
            ..self.clone()
        })
    }

    pub fn get(&self, index: usize) -> Result<u8> {
        let index = check_index(index as i64, self.len)?;
        self.read(|bytes| bytes[index])
    }

    pub fn set(&self, index: usize, value: u8) -> Result<()> {
        let index = check_index(index as i64, self.len)?;
        self.write(|bytes| bytes[index] = value)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        self.read(|bytes| bytes.to_vec())
    }

    pub(crate) fn check_alive(&self) -> Result<()> {
        if self.scope.is_alive() {
            Ok(())
        } else {
            Err(released_resource(format!(
                "segment of {} bytes belongs to closed scope {}",
                self.len, self.scope.id
            )))
        }
    }

    pub(crate) fn check_writable(&self) -> Result<()> {
        self.check_alive()?;
        if self.read_only {
            return Err(read_only(self.len));
        }
        Ok(())
    }

    /// Runs `f` over this segment's bytes after checking the scope.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        self.check_alive()?;
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&storage[self.offset..self.offset + self.len]))
    }

    /// Runs `f` over this segment's bytes after checking scope and access mode.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        self.check_writable()?;
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut storage[self.offset..self.offset + self.len]))
    }
}

impl fmt::Debug for MemorySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySegment")
            .field("offset", &self.offset)
            .field("byte_size", &self.len)
            .field("read_only", &self.read_only)
            .field("scope", &self.scope.id)
            .field("alive", &self.scope.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;

    #[test]
    fn heap_segments_are_always_alive() {
        let segment = MemorySegment::of_vec(vec![1, 2, 3]);
        assert!(segment.is_alive());
        assert_eq!(segment.get(2), Ok(3));
        assert!(segment.get(3).is_err());
    }

    #[test]
    fn closed_arena_releases_segments() {
        let arena = Arena::new();
        let segment = arena.allocate(16);
        segment.set(0, 7).expect("alive");
        arena.close();
        assert!(matches!(segment.get(0), Err(LaneError::ResourceReleased { .. })));
        assert!(matches!(segment.set(0, 1), Err(LaneError::ResourceReleased { .. })));
        arena.close();
    }

    #[test]
    fn read_only_views_reject_writes() {
        let segment = MemorySegment::of_vec(vec![0; 4]);
        let view = segment.as_read_only();
        assert_eq!(view.set(0, 1), Err(LaneError::ReadOnly { byte_size: 4 }));
        segment.set(0, 9).expect("writable");
        assert_eq!(view.get(0), Ok(9));
    }

    #[test]
    fn slices_share_storage() {
        let segment = MemorySegment::of_vec((0..10).collect());
        let tail = segment.slice(6, 4).expect("in range");
        assert_eq!(tail.to_vec(), Ok(vec![6, 7, 8, 9]));
        tail.set(0, 60).expect("writable");
        assert_eq!(segment.get(6), Ok(60));
        assert!(segment.slice(8, 4).is_err());
    }

    #[test]
    fn native_order_matches_target() {
        assert!(ByteOrder::native().is_native());
        #[cfg(target_endian = "little")]
        assert!(!ByteOrder::BigEndian.is_native());
    }
}
