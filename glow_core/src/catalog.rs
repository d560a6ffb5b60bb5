//! Default catalog of facial exercises.
//!
//! This module provides the built-in exercises a user can mark as completed.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn exercise(
    id: &str,
    title: &str,
    description: &str,
    duration_seconds: u32,
    steps: &[&str],
    benefits: &[&str],
) -> Exercise {
    Exercise {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        duration_seconds,
        steps: steps.iter().map(|s| s.to_string()).collect(),
        benefits: benefits.iter().map(|s| s.to_string()).collect(),
    }
}

/// Builds the default catalog of facial exercises
///
/// **Note**: prefer `get_default_catalog()`, which returns a cached reference.
pub fn build_default_catalog() -> Catalog {
    let exercises = vec![
        exercise(
            "cheek_lift",
            "Cheek Lifter",
            "Lifts and tones the cheek muscles.",
            60,
            &[
                "Open your mouth into an O shape",
                "Smile with the corners of your mouth while keeping the O",
                "Hold for 30 seconds, then relax",
            ],
            &["Firmer cheeks", "Improved facial contour"],
        ),
        exercise(
            "jaw_release",
            "Jaw Release",
            "Relieves tension held in the jaw.",
            90,
            &[
                "Sit upright with your shoulders relaxed",
                "Chew slowly with your mouth closed",
                "Open wide, tongue to the lower teeth, hold for 5 seconds",
                "Repeat ten times",
            ],
            &["Less jaw tension", "Defined jawline"],
        ),
        exercise(
            "forehead_smoother",
            "Forehead Smoother",
            "Relaxes the forehead to soften expression lines.",
            60,
            &[
                "Place fingertips across your forehead",
                "Gently pull the skin down while raising your eyebrows",
                "Hold for 10 seconds and release",
            ],
            &["Smoother forehead", "Reduced tension headaches"],
        ),
        exercise(
            "eye_circle",
            "Eye Circles",
            "Strengthens the muscles around the eyes.",
            45,
            &[
                "Form a C shape with thumb and index finger around each eye",
                "Squint upward while keeping the fingers in place",
                "Relax and repeat six times",
            ],
            &["Reduced puffiness", "Brighter-looking eyes"],
        ),
        exercise(
            "neck_tone",
            "Neck Toner",
            "Tightens the neck and under-chin area.",
            60,
            &[
                "Tilt your head back and look at the ceiling",
                "Push your lower lip over the upper lip",
                "Hold for 10 seconds, repeat five times",
            ],
            &["Firmer neck", "Less under-chin sagging"],
        ),
    ];

    Catalog {
        exercises: exercises.into_iter().map(|e| (e.id.clone(), e)).collect(),
    }
}

impl Catalog {
    pub fn from_exercises(exercises: Vec<Exercise>) -> Self {
        let mut map = HashMap::new();
        for e in exercises {
            map.insert(e.id.clone(), e);
        }
        Catalog { exercises: map }
    }

    /// Look up an exercise by id
    pub fn get(&self, id: &str) -> Result<&Exercise> {
        self.exercises
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("Unknown exercise: {}", id)))
    }

    /// All exercises sorted by id
    pub fn list(&self) -> Vec<&Exercise> {
        let mut exercises: Vec<_> = self.exercises.values().collect();
        exercises.sort_by(|a, b| a.id.cmp(&b.id));
        exercises
    }

    /// Check catalog integrity, returning one message per problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut titles = HashSet::new();

        for (key, e) in &self.exercises {
            if e.id.trim().is_empty() {
                errors.push("Exercise with empty id".to_string());
            }
            if key != &e.id {
                errors.push(format!("Exercise {} filed under key {}", e.id, key));
            }
            if !titles.insert(e.title.as_str()) {
                errors.push(format!("Duplicate exercise title: {}", e.title));
            }
            if e.duration_seconds == 0 {
                errors.push(format!("Exercise {} has zero duration", e.id));
            }
            if e.steps.is_empty() {
                errors.push(format!("Exercise {} has no steps", e.id));
            }
        }

        if self.exercises.is_empty() {
            errors.push("Catalog has no exercises".to_string());
        }

        errors
    }
}
