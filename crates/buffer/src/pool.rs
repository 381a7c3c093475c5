//! # `Buffer`
//!
//! A paged, 2Q-evicted cache over a handful of [`RawFile`]s (§4.G). New
//! pages enter on a FIFO queue; any re-fix of a resident page promotes
//! it straight to the LRU queue's tail. Eviction looks for the first
//! unused frame in FIFO order, then in LRU order, and writes it back
//! first if dirty.
//!
//! `Buffer` is `Rc<RefCell<..>>`-backed rather than taking `&mut self`
//! on every call: callers routinely need two pages fixed at once (a
//! join scanning two tables), and an `&mut` pool can't hand out two
//! live guards simultaneously. Interior mutability moves that
//! constraint from compile time to the existing lock-compatibility
//! check in [`Inner::fix_page`], which is the same place a multi-reader
//! backend would need it anyway.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::config::BufferPoolConfig;
use crate::error::BufferError;
use crate::frame::{Frame, Queue};
use crate::ids::{FileId, FrameId, PageId};
use crate::raw_file::RawFile;

const MAX_FILE_COUNT: u32 = 1 << 16;

struct FileEntry<F: RawFile> {
    handle: F,
    file_size: u64,
    required_file_size: u64,
    ref_count: u32,
}

struct Inner<F: RawFile> {
    config: BufferPoolConfig,
    files: HashMap<FileId, FileEntry<F>>,
    free_file_ids: Vec<u16>,
    next_file_id: u32,
    frames: HashMap<FrameId, Frame>,
    fifo: VecDeque<FrameId>,
    lru: VecDeque<FrameId>,
}

impl<F: RawFile> Inner<F> {
    fn allocate_file_id(&mut self) -> Result<FileId, BufferError> {
        if let Some(id) = self.free_file_ids.pop() {
            return Ok(FileId(id));
        }
        if self.next_file_id >= MAX_FILE_COUNT {
            return Err(BufferError::FileIdSpaceExhausted);
        }
        let id = self.next_file_id as u16;
        self.next_file_id += 1;
        Ok(FileId(id))
    }

    fn remove_from_queue(&mut self, frame_id: FrameId, queue: Queue) {
        let q = match queue {
            Queue::Fifo => &mut self.fifo,
            Queue::Lru => &mut self.lru,
        };
        if let Some(pos) = q.iter().position(|id| *id == frame_id) {
            q.remove(pos);
        }
    }

    fn promote_to_lru(&mut self, frame_id: FrameId) {
        let queue = self.frames[&frame_id].queue;
        self.remove_from_queue(frame_id, queue);
        self.lru.push_back(frame_id);
        self.frames.get_mut(&frame_id).expect("frame was resident above").queue = Queue::Lru;
    }

    fn find_frame_to_evict(&self) -> Option<FrameId> {
        self.fifo
            .iter()
            .find(|id| self.frames.get(*id).is_some_and(Frame::is_evictable))
            .or_else(|| self.lru.iter().find(|id| self.frames.get(*id).is_some_and(Frame::is_evictable)))
            .copied()
    }

    fn flush_frame_to_disk(&mut self, frame_id: FrameId) -> Result<(), BufferError> {
        let (file_id, page_id) = {
            let frame = &self.frames[&frame_id];
            (frame.file_id, frame.page_id)
        };
        let page_size = self.config.page_size() as u64;
        let offset = page_id.0 * page_size;
        let required = offset + page_size;
        let entry = self.files.get_mut(&file_id).ok_or(BufferError::UnknownFile)?;
        if required > entry.file_size {
            let target = required.max(entry.required_file_size);
            entry.handle.set_len(target)?;
            entry.file_size = target;
        }
        entry.handle.write_at(&self.frames[&frame_id].data, offset)?;
        self.frames.get_mut(&frame_id).expect("frame still resident").dirty = false;
        Ok(())
    }

    fn allocate_frame_buffer(&mut self) -> Result<Vec<u8>, BufferError> {
        let page_size = self.config.page_size();
        if self.frames.len() < self.config.page_capacity() {
            return Ok(vec![0u8; page_size]);
        }
        let Some(victim_id) = self.find_frame_to_evict() else {
            // Every resident frame is pinned: over-commit rather than stall.
            return Ok(vec![0u8; page_size]);
        };
        if self.frames[&victim_id].dirty {
            self.flush_frame_to_disk(victim_id)?;
        }
        let queue = self.frames[&victim_id].queue;
        self.remove_from_queue(victim_id, queue);
        Ok(self.frames.remove(&victim_id).expect("victim was resident").data)
    }

    fn fix_page(&mut self, file_id: FileId, page_id: PageId, exclusive: bool) -> Result<FrameId, BufferError> {
        if !self.files.contains_key(&file_id) {
            return Err(BufferError::UnknownFile);
        }
        let frame_id = FrameId::new(file_id, page_id);

        if self.frames.contains_key(&frame_id) {
            self.promote_to_lru(frame_id);
            let frame = self.frames.get_mut(&frame_id).expect("just promoted");
            if frame.num_users > 0 && (exclusive || frame.exclusive) {
                return Err(BufferError::FrameAlreadyLocked);
            }
            frame.num_users += 1;
            if exclusive {
                frame.exclusive = true;
            }
            return Ok(frame_id);
        }

        let mut buffer = self.allocate_frame_buffer()?;
        buffer.iter_mut().for_each(|b| *b = 0);
        let offset = page_id.0 * self.config.page_size() as u64;
        let entry = self.files.get(&file_id).expect("checked above");
        entry.handle.read_at(&mut buffer, offset)?;

        let mut frame = Frame::new(file_id, page_id, buffer);
        frame.num_users = 1;
        frame.exclusive = exclusive;
        self.frames.insert(frame_id, frame);
        self.fifo.push_back(frame_id);
        Ok(frame_id)
    }

    fn unfix(&mut self, frame_id: FrameId, exclusive: bool, dirty: bool) {
        if let Some(frame) = self.frames.get_mut(&frame_id) {
            frame.num_users = frame.num_users.saturating_sub(1);
            if exclusive {
                frame.exclusive = false;
            }
            if dirty {
                frame.dirty = true;
            }
        }
    }

    fn read(&mut self, file_id: FileId, offset: u64, buf: &mut [u8]) -> Result<usize, BufferError> {
        let page_size = self.config.page_size() as u64;
        let page_id = PageId(offset / page_size);
        let skip = (offset % page_size) as usize;
        let actual = buf.len().min(self.config.page_size() - skip);

        let frame_id = self.fix_page(file_id, page_id, false)?;
        buf[..actual].copy_from_slice(&self.frames[&frame_id].data[skip..skip + actual]);
        self.unfix(frame_id, false, false);
        Ok(actual)
    }

    fn write(&mut self, file_id: FileId, offset: u64, buf: &[u8]) -> Result<usize, BufferError> {
        let page_size = self.config.page_size() as u64;
        let page_id = PageId(offset / page_size);
        let skip = (offset % page_size) as usize;
        let actual = buf.len().min(self.config.page_size() - skip);

        let frame_id = self.fix_page(file_id, page_id, true)?;
        self.frames.get_mut(&frame_id).expect("just fixed").data[skip..skip + actual]
            .copy_from_slice(&buf[..actual]);
        self.unfix(frame_id, true, true);

        let required = page_id.0 * page_size + skip as u64 + buf.len() as u64;
        if let Some(entry) = self.files.get_mut(&file_id) {
            entry.required_file_size = entry.required_file_size.max(required);
        }
        Ok(actual)
    }

    fn flush_file(&mut self, file_id: FileId) -> Result<(), BufferError> {
        let required = self.files.get(&file_id).ok_or(BufferError::UnknownFile)?.required_file_size;
        let entry = self.files.get_mut(&file_id).expect("checked above");
        if required > entry.file_size {
            entry.handle.set_len(required)?;
            entry.file_size = required;
        }

        let mut dirty_frames: Vec<FrameId> = self
            .frames
            .iter()
            .filter(|(_, f)| f.file_id == file_id && f.dirty)
            .map(|(id, _)| *id)
            .collect();
        dirty_frames.sort_by_key(|id| id.page_id().0);
        for frame_id in dirty_frames {
            self.flush_frame_to_disk(frame_id)?;
        }
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), BufferError> {
        let file_ids: Vec<FileId> = self.files.keys().copied().collect();
        for file_id in file_ids {
            self.flush_file(file_id)?;
        }
        Ok(())
    }

    fn truncate(&mut self, file_id: FileId, len: u64) -> Result<(), BufferError> {
        let resident: Vec<FrameId> =
            self.frames.iter().filter(|(_, f)| f.file_id == file_id).map(|(id, _)| *id).collect();
        for frame_id in resident {
            if self.frames[&frame_id].dirty {
                self.flush_frame_to_disk(frame_id)?;
            }
            let queue = self.frames[&frame_id].queue;
            self.remove_from_queue(frame_id, queue);
            self.frames.remove(&frame_id);
        }
        let entry = self.files.get_mut(&file_id).ok_or(BufferError::UnknownFile)?;
        entry.handle.set_len(len)?;
        entry.file_size = len;
        entry.required_file_size = len;
        Ok(())
    }

    fn release_file(&mut self, file_id: FileId) {
        let should_remove = match self.files.get_mut(&file_id) {
            Some(entry) => {
                entry.ref_count = entry.ref_count.saturating_sub(1);
                entry.ref_count == 0
            }
            None => false,
        };
        if !should_remove {
            return;
        }
        let _ = self.flush_file(file_id);
        let resident: Vec<FrameId> =
            self.frames.iter().filter(|(_, f)| f.file_id == file_id).map(|(id, _)| *id).collect();
        for frame_id in resident {
            let queue = self.frames[&frame_id].queue;
            self.remove_from_queue(frame_id, queue);
            self.frames.remove(&frame_id);
        }
        self.files.remove(&file_id);
        self.free_file_ids.push(file_id.0);
    }
}

/// A pool of resident pages shared across every [`FileRef`] and
/// [`BufferRef`] it hands out. Cloning is a cheap `Rc` clone: clones
/// share the same underlying frame table.
pub struct Buffer<F: RawFile> {
    inner: Rc<RefCell<Inner<F>>>,
}

impl<F: RawFile> Clone for Buffer<F> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<F: RawFile> Buffer<F> {
    pub fn new(config: BufferPoolConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                files: HashMap::new(),
                free_file_ids: Vec::new(),
                next_file_id: 0,
                frames: HashMap::new(),
                fifo: VecDeque::new(),
                lru: VecDeque::new(),
            })),
        }
    }

    pub fn config(&self) -> BufferPoolConfig {
        self.inner.borrow().config
    }

    /// Register an already-opened handle with the pool.
    #[tracing::instrument(skip(self, handle))]
    pub fn open_file(&self, handle: F) -> Result<FileRef<F>, BufferError> {
        let mut inner = self.inner.borrow_mut();
        let file_id = inner.allocate_file_id()?;
        let file_size = handle.file_size()?;
        inner.files.insert(file_id, FileEntry { handle, file_size, required_file_size: file_size, ref_count: 1 });
        Ok(FileRef { inner: Rc::clone(&self.inner), file_id })
    }

    pub fn fix_page(&self, file: &FileRef<F>, page_id: PageId, exclusive: bool) -> Result<BufferRef<F>, BufferError> {
        let frame_id = self.inner.borrow_mut().fix_page(file.file_id, page_id, exclusive)?;
        Ok(BufferRef { inner: Rc::clone(&self.inner), frame_id, exclusive, dirty: false })
    }

    pub fn read(&self, file: &FileRef<F>, offset: u64, buf: &mut [u8]) -> Result<usize, BufferError> {
        self.inner.borrow_mut().read(file.file_id, offset, buf)
    }

    pub fn write(&self, file: &FileRef<F>, offset: u64, buf: &[u8]) -> Result<usize, BufferError> {
        self.inner.borrow_mut().write(file.file_id, offset, buf)
    }

    #[tracing::instrument(skip(self, file))]
    pub fn flush_file(&self, file: &FileRef<F>) -> Result<(), BufferError> {
        self.inner.borrow_mut().flush_file(file.file_id)
    }

    #[tracing::instrument(skip(self))]
    pub fn flush(&self) -> Result<(), BufferError> {
        self.inner.borrow_mut().flush_all()
    }

    pub fn truncate(&self, file: &FileRef<F>, len: u64) -> Result<(), BufferError> {
        self.inner.borrow_mut().truncate(file.file_id, len)
    }

    pub fn resident_frame_count(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn fifo_len(&self) -> usize {
        self.inner.borrow().fifo.len()
    }

    pub fn lru_len(&self) -> usize {
        self.inner.borrow().lru.len()
    }

    pub fn is_resident(&self, file: &FileRef<F>, page_id: PageId) -> bool {
        self.inner.borrow().frames.contains_key(&FrameId::new(file.file_id, page_id))
    }
}

/// A registered, ref-counted handle to one file. Dropping the last
/// clone flushes the file's dirty frames, evicts them, and returns the
/// file id to the pool's free list.
pub struct FileRef<F: RawFile> {
    inner: Rc<RefCell<Inner<F>>>,
    file_id: FileId,
}

impl<F: RawFile> FileRef<F> {
    pub fn file_id(&self) -> FileId {
        self.file_id
    }
}

impl<F: RawFile> Clone for FileRef<F> {
    fn clone(&self) -> Self {
        if let Some(entry) = self.inner.borrow_mut().files.get_mut(&self.file_id) {
            entry.ref_count += 1;
        }
        Self { inner: Rc::clone(&self.inner), file_id: self.file_id }
    }
}

impl<F: RawFile> Drop for FileRef<F> {
    fn drop(&mut self) {
        self.inner.borrow_mut().release_file(self.file_id);
    }
}

/// A fixed page. Holds the frame pinned (shared or exclusive) until
/// dropped; dropping decrements the frame's user count and, if
/// [`BufferRef::data_mut`] or [`BufferRef::mark_dirty`] was ever called,
/// marks the frame dirty.
pub struct BufferRef<F: RawFile> {
    inner: Rc<RefCell<Inner<F>>>,
    frame_id: FrameId,
    exclusive: bool,
    dirty: bool,
}

impl<F: RawFile> BufferRef<F> {
    pub fn page_id(&self) -> PageId {
        self.frame_id.page_id()
    }

    pub fn data(&self) -> Ref<'_, [u8]> {
        Ref::map(self.inner.borrow(), |inner| inner.frames[&self.frame_id].data.as_slice())
    }

    pub fn data_mut(&mut self) -> RefMut<'_, [u8]> {
        self.dirty = true;
        RefMut::map(self.inner.borrow_mut(), |inner| {
            inner.frames.get_mut(&self.frame_id).expect("frame fixed for the guard's lifetime").data.as_mut_slice()
        })
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl<F: RawFile> Drop for BufferRef<F> {
    fn drop(&mut self) {
        self.inner.borrow_mut().unfix(self.frame_id, self.exclusive, self.dirty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_file::MemoryFile;

    fn small_pool() -> Buffer<MemoryFile> {
        Buffer::new(BufferPoolConfig::new().with_page_size_bits(4).with_page_capacity(2))
    }

    #[test]
    fn write_then_read_within_one_page() {
        let pool = small_pool();
        let file = pool.open_file(MemoryFile::new()).unwrap();
        pool.write(&file, 3, b"hi").unwrap();
        let mut buf = [0u8; 2];
        pool.read(&file, 3, &mut buf).unwrap();
        assert_eq!(&buf, b"hi");
    }

    #[test]
    fn flush_grows_file_past_eof_write() {
        let backing = MemoryFile::new();
        let pool = Buffer::new(BufferPoolConfig::new().with_page_size_bits(4).with_page_capacity(4));
        let file = pool.open_file(backing).unwrap();
        pool.write(&file, 20, b"end").unwrap();
        pool.flush_file(&file).unwrap();

        let mut buf = [0u8; 3];
        pool.read(&file, 20, &mut buf).unwrap();
        assert_eq!(&buf, b"end");
    }

    #[test]
    fn eviction_prefers_fifo_order_over_lru() {
        // Capacity 2: fill both frames, re-fix page 0 to promote it to
        // LRU, then fix a third page. Page 1 (still in FIFO, unused)
        // should be evicted, not page 0.
        let pool = small_pool();
        let file = pool.open_file(MemoryFile::new()).unwrap();
        let page_size = pool.config().page_size() as u64;

        pool.write(&file, 0, b"a").unwrap();
        pool.write(&file, page_size, b"b").unwrap();
        assert_eq!(pool.resident_frame_count(), 2);

        // Re-fix page 0 and drop immediately: promotes it to LRU.
        drop(pool.fix_page(&file, PageId(0), false).unwrap());

        pool.write(&file, page_size * 2, b"c").unwrap();
        assert_eq!(pool.resident_frame_count(), 2);
        assert!(pool.is_resident(&file, PageId(0)));
        assert!(!pool.is_resident(&file, PageId(1)));
        assert!(pool.is_resident(&file, PageId(2)));
    }

    #[test]
    fn exclusive_fix_rejects_concurrent_access() {
        let pool = small_pool();
        let file = pool.open_file(MemoryFile::new()).unwrap();
        let _held = pool.fix_page(&file, PageId(0), true).unwrap();
        let err = pool.fix_page(&file, PageId(0), false).unwrap_err();
        assert_eq!(err, BufferError::FrameAlreadyLocked);
    }

    #[test]
    fn releasing_last_file_ref_flushes_dirty_frames() {
        let backing = MemoryFile::new();
        let pool = small_pool();
        let file = pool.open_file(backing).unwrap();
        pool.write(&file, 0, b"x").unwrap();
        drop(file);
        assert_eq!(pool.resident_frame_count(), 0);
    }

    #[test]
    fn truncate_drops_resident_pages_and_resizes() {
        let pool = small_pool();
        let file = pool.open_file(MemoryFile::new()).unwrap();
        let page_size = pool.config().page_size() as u64;
        pool.write(&file, 0, b"a").unwrap();
        pool.write(&file, page_size, b"b").unwrap();
        pool.truncate(&file, 2).unwrap();
        assert_eq!(pool.resident_frame_count(), 0);
    }

    #[test]
    fn file_id_space_exhaustion_is_fatal() {
        let pool: Buffer<MemoryFile> = small_pool();
        let mut inner = pool.inner.borrow_mut();
        inner.next_file_id = MAX_FILE_COUNT;
        drop(inner);
        let err = pool.open_file(MemoryFile::new()).unwrap_err();
        assert_eq!(err, BufferError::FileIdSpaceExhausted);
    }
}
