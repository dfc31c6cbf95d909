//! Static fallback catalog used when the remote catalog cannot answer.

use super::TrackRecord;
use crate::features::{AudioFeatures, Feature, FeatureKey};
use crate::mood::Mood;

// ============================================================================
// Fallback tracks, three per mood, in `Mood::ALL` order
// ============================================================================

const FALLBACK_TRACKS: [[(&str, &str, &str); 3]; 5] = [
    // happy
    [
        ("4iV5W9uYEdYUVa79Axb7Rh", "Uptown Funk", "Mark Ronson"),
        ("0SiywuOBRcynK0uKGWdCnn", "Happy", "Pharrell Williams"),
        ("3MrRksHupTVEQ7YbA0FsZK", "Can't Stop the Feeling!", "Justin Timberlake"),
    ],
    // sad
    [
        ("0pqnGHJpmpxLKifKRmU6WP", "Imagine", "John Lennon"),
        ("1BxfuPKGuaTgP7aM0Bbdwr", "Hello", "Adele"),
        ("6b2RcmUt1g9N9mQ3CbjX2Y", "Skinny Love", "Bon Iver"),
    ],
    // energetic
    [
        ("7CZyCXKG6d5ALeq41sLzbP", "The Middle", "Zedd"),
        ("2KH16WveTQWT6KOG9Rg6e2", "Eye of the Tiger", "Survivor"),
        ("1zB4vmk8tFRmM9UULNzbLB", "Thunder", "Imagine Dragons"),
    ],
    // calm
    [
        ("0WqIKmW4BTrj3eJFmnCKMv", "River Flows In You", "Yiruma"),
        ("2LTlO3NuNVN70lp2ZbVswF", "Weightless", "Marconi Union"),
        ("4NwJCTuBJ1RSeZyEwzfL1T", "Gymnopédie No.1", "Erik Satie"),
    ],
    // focused
    [
        ("5wCKGrqU8rYvJfFYZJOxeN", "Brain Waves", "Study Music"),
        ("7MfxUR9vMuCIKjJ0tfhuJJ", "Concentration", "Focus Music"),
        ("6l8EbYRtQMgKOyc1gcDHF9", "Deep Focus", "Alpha Waves"),
    ],
];

/// Read-only substitute tracks keyed by mood
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    tracks: [Vec<TrackRecord>; 5],
}

impl FallbackCatalog {
    pub fn standard() -> Self {
        let row = |i: usize| {
            FALLBACK_TRACKS[i]
                .iter()
                .map(|(id, name, artist)| TrackRecord::new(*id, *name, *artist))
                .collect::<Vec<_>>()
        };

        Self {
            tracks: [row(0), row(1), row(2), row(3), row(4)],
        }
    }

    pub fn tracks_for(&self, mood: Mood) -> &[TrackRecord] {
        &self.tracks[mood.index()]
    }

    pub fn track_ids_for(&self, mood: Mood) -> Vec<String> {
        self.tracks_for(mood).iter().map(|t| t.id.clone()).collect()
    }
}

/// Pick the mood whose fallback tracks best match a feature request.
///
/// Rules are checked in order and a missing feature reads as `0.0`:
/// valence > 0.6 is happy, energy > 0.8 is energetic, acousticness > 0.6
/// is calm, valence < 0.4 is sad, instrumentalness > 0.6 is focused,
/// otherwise happy.
pub fn mood_for_features(features: &AudioFeatures) -> Mood {
    let target = |feature| features.value_or_zero(FeatureKey::target(feature));

    if target(Feature::Valence) > 0.6 {
        Mood::Happy
    } else if target(Feature::Energy) > 0.8 {
        Mood::Energetic
    } else if target(Feature::Acousticness) > 0.6 {
        Mood::Calm
    } else if target(Feature::Valence) < 0.4 {
        Mood::Sad
    } else if target(Feature::Instrumentalness) > 0.6 {
        Mood::Focused
    } else {
        Mood::Happy
    }
}
