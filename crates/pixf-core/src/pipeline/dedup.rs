//! Exact deduplication by content fingerprint.
//!
//! The first occurrence of a fingerprint wins and keeps its position; later
//! occurrences are counted and dropped. Finding duplicates is never an error.

use std::collections::HashSet;

use crate::types::{CanonicalImage, ContentFingerprint, EncodeTask};

/// Tracks fingerprints seen so far in a batch.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<ContentFingerprint>,
    duplicates: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fingerprint. Returns `true` for a first occurrence.
    pub fn admit(&mut self, fingerprint: ContentFingerprint) -> bool {
        if self.seen.insert(fingerprint) {
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    /// Number of duplicates rejected.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Filter decoded images down to their unique, order-preserved subsequence.
    pub fn dedup_images(images: Vec<CanonicalImage>) -> UniqueImageSet {
        let mut dedup = Self::new();
        let mut unique = Vec::with_capacity(images.len());
        for image in images {
            if dedup.admit(image.fingerprint) {
                unique.push(image);
            } else {
                tracing::debug!("Duplicate content: {:?}", image.source);
            }
        }
        UniqueImageSet {
            images: unique,
            duplicates: dedup.duplicates,
        }
    }
}

/// Images surviving deduplication, in first-occurrence order.
#[derive(Debug)]
pub struct UniqueImageSet {
    images: Vec<CanonicalImage>,
    duplicates: usize,
}

impl UniqueImageSet {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Duplicates discarded while building the set.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Turn the set into encode tasks, binding 1-based output indices.
    pub fn into_tasks(self) -> Vec<EncodeTask> {
        self.images
            .into_iter()
            .enumerate()
            .map(|(i, image)| EncodeTask {
                index: i + 1,
                image,
            })
            .collect()
    }
}
