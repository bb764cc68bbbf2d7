//! Reusable scratch buffers for encoding.
//!
//! Each checkout hands one buffer to exactly one worker. The buffer goes back
//! to the pool when the guard drops, so every exit path of an encode,
//! including failures and panics, returns it.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// A pool of `Vec<u8>` scratch buffers with checkout/return semantics.
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    max_retained: usize,
}

impl BufferPool {
    /// Create an empty pool that retains at most `max_retained` idle buffers.
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_retained)),
            max_retained,
        }
    }

    /// Check out a cleared buffer, allocating a fresh one if none is idle.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.lock().pop().unwrap_or_default();
        PooledBuffer { pool: self, buf }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        let mut free = self.lock();
        if free.len() < self.max_retained {
            free.push(buf);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        // The free list stays consistent even if a holder panicked
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A buffer checked out of a [`BufferPool`]; returned on drop.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_buffer_returned_on_drop() {
        let pool = BufferPool::new(4);
        assert_eq!(pool.idle(), 0);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"hello");
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_reused_buffer_is_cleared_and_keeps_capacity() {
        let pool = BufferPool::new(4);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[0u8; 1024]);
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn test_concurrent_checkouts_are_distinct() {
        let pool = BufferPool::new(4);
        let mut a = pool.acquire();
        let mut b = pool.acquire();
        a.push(1);
        b.push(2);
        assert_eq!(a.as_slice(), &[1]);
        assert_eq!(b.as_slice(), &[2]);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_retention_is_bounded() {
        let pool = BufferPool::new(1);
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_returned_on_error_path() {
        fn failing(pool: &BufferPool) -> Result<(), String> {
            let mut buf = pool.acquire();
            buf.push(42);
            Err("encode failed".to_string())
        }

        let pool = BufferPool::new(2);
        assert!(failing(&pool).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let pool = Arc::new(BufferPool::new(8));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    let mut buf = pool.acquire();
                    buf.push(i as u8);
                    buf.len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
        assert!(pool.idle() >= 1 && pool.idle() <= 4);
    }
}
