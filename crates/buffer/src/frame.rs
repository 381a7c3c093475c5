use crate::ids::{FileId, PageId};

/// Which of the pool's two eviction queues currently holds a resident
/// frame (§4.G's 2Q policy: new frames enter FIFO; any re-fix promotes
/// straight to the LRU tail).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Queue {
    Fifo,
    Lru,
}

#[derive(Debug)]
pub(crate) struct Frame {
    pub data: Vec<u8>,
    pub file_id: FileId,
    pub page_id: PageId,
    pub dirty: bool,
    pub num_users: u32,
    pub exclusive: bool,
    pub queue: Queue,
}

impl Frame {
    pub fn new(file_id: FileId, page_id: PageId, data: Vec<u8>) -> Self {
        Self { data, file_id, page_id, dirty: false, num_users: 0, exclusive: false, queue: Queue::Fifo }
    }

    pub fn is_evictable(&self) -> bool {
        self.num_users == 0
    }
}
