//! Reusable scratch buffers for multilinear tables.
//!
//! Buffers are checked out by value, so a buffer handed back through `dump`
//! can no longer be referenced by the code that used it.

use crate::Fr;
use ark_ff::Zero;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
pub struct MultiLinPool {
    free: Mutex<Vec<Vec<Fr>>>,
    capacity: usize,
    default_len: usize,
    checked_out: AtomicUsize,
}

impl MultiLinPool {
    /// A pool retaining at most `capacity` idle buffers, each allocated with
    /// room for at least `default_len` elements.
    pub fn new(capacity: usize, default_len: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            capacity,
            default_len,
            checked_out: AtomicUsize::new(0),
        }
    }

    fn take(&self, len: usize) -> Vec<Fr> {
        self.checked_out.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(pos) = free.iter().rposition(|buf| buf.capacity() >= len) {
            let mut buf = free.swap_remove(pos);
            buf.clear();
            return buf;
        }
        drop(free);
        Vec::with_capacity(len.max(self.default_len))
    }

    /// Checks out a zeroed buffer of length `len`.
    pub fn make(&self, len: usize) -> Vec<Fr> {
        let mut buf = self.take(len);
        buf.resize(len, Fr::zero());
        buf
    }

    /// Checks out a copy of `src`.
    pub fn clone_slice(&self, src: &[Fr]) -> Vec<Fr> {
        let mut buf = self.take(src.len());
        buf.extend_from_slice(src);
        buf
    }

    /// Returns a buffer to the pool. Buffers beyond capacity are dropped.
    pub fn dump(&self, buf: Vec<Fr>) {
        let _ = self
            .checked_out
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if buf.capacity() == 0 {
            return;
        }
        let mut free = self.free.lock().unwrap_or_else(|err| err.into_inner());
        if free.len() < self.capacity {
            free.push(buf);
        }
    }

    pub fn dump_all<I: IntoIterator<Item = Vec<Fr>>>(&self, bufs: I) {
        for buf in bufs {
            self.dump(buf);
        }
    }

    /// Buffers handed out and not yet dumped.
    pub fn checked_out(&self) -> usize {
        self.checked_out.load(Ordering::Relaxed)
    }

    /// Buffers currently held for reuse.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(|err| err.into_inner()).len()
    }
}
