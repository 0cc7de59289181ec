//! Marker store for the current session
//!
//! Holds the markers placed since the last reset, in insertion order, with
//! unique ids. Adding a marker whose id is already present is an error.

use serde::Serialize;
use std::collections::HashSet;

use crate::errors::PracticeError;
use crate::models::{Marker, MarkerCounts};

/// Ordered, id-unique set of markers
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MarkerStore {
    markers: Vec<Marker>,

    #[serde(skip)]
    ids: HashSet<String>,
}

impl MarkerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker; fails if its id is taken or its origin contradicts the id
    pub fn add_marker(&mut self, marker: Marker) -> Result<(), PracticeError> {
        marker.check_origin()?;
        if self.ids.contains(&marker.id) {
            return Err(PracticeError::DuplicateMarker { id: marker.id });
        }
        self.ids.insert(marker.id.clone());
        self.markers.push(marker);
        Ok(())
    }

    /// Remove a marker by id; absent ids are ignored
    pub fn remove_marker(&mut self, id: &str) -> Option<Marker> {
        if !self.ids.remove(id) {
            return None;
        }
        let index = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(index))
    }

    /// Drop every marker
    pub fn clear(&mut self) {
        self.markers.clear();
        self.ids.clear();
    }

    /// Markers in insertion order
    pub fn list(&self) -> &[Marker] {
        &self.markers
    }

    /// Deep copy of the current markers
    pub fn snapshot(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn counts(&self) -> MarkerCounts {
        MarkerCounts::tally(&self.markers)
    }
}
