//! Cluster-based re-ranking of a candidate pool.
//!
//! Tracks are grouped by audio descriptors with k-means and the cluster whose
//! centroid scores best under the emotion's weight table wins. Anything that
//! prevents clustering (no descriptors, too few vectors) returns the pool as is.

pub mod kmeans;

use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{Track, TrackDescriptor};
use crate::mood::{weights::weights_for, AudioProfile, Feature};

pub const CLUSTER_SEED: u64 = 42;
pub const DEFAULT_CLUSTERS: usize = 3;
pub const TEMPO_SCALE: f32 = 200.0;

/// Fixed component order of a clustering vector.
pub const VECTOR_FEATURES: [Feature; 6] = [
    Feature::Energy,
    Feature::Valence,
    Feature::Danceability,
    Feature::Acousticness,
    Feature::Instrumentalness,
    Feature::Tempo,
];

/// `None` when any vector feature is missing: such tracks sit out clustering.
pub fn feature_vector(descriptor: &TrackDescriptor) -> Option<Vec<f32>> {
    VECTOR_FEATURES
        .iter()
        .map(|&f| {
            let v = descriptor.get(f)?;
            Some(if f == Feature::Tempo { v / TEMPO_SCALE } else { v })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub index: usize,
    /// Positions in the original track list, ascending.
    pub members: Vec<usize>,
    pub centroid: Vec<f32>,
}

impl Cluster {
    pub fn centroid_value(&self, feature: Feature) -> Option<f32> {
        VECTOR_FEATURES
            .iter()
            .position(|&f| f == feature)
            .and_then(|i| self.centroid.get(i).copied())
    }
}

/// Groups `(track position, vector)` pairs into `k` clusters with centroids
/// computed from the final membership.
pub fn build_clusters(vectors: &[(usize, Vec<f32>)], k: usize, seed: u64) -> Vec<Cluster> {
    let points: Vec<Vec<f32>> = vectors.iter().map(|(_, v)| v.clone()).collect();
    let assignments = kmeans::assign(&points, k, seed);
    let dim = VECTOR_FEATURES.len();

    (0..k)
        .map(|index| {
            let members: Vec<usize> = vectors
                .iter()
                .zip(assignments.iter())
                .filter(|(_, &a)| a == index)
                .map(|((pos, _), _)| *pos)
                .collect();

            let mut centroid = vec![0.0f32; dim];
            let member_vectors: Vec<&Vec<f32>> = vectors
                .iter()
                .zip(assignments.iter())
                .filter(|(_, &a)| a == index)
                .map(|((_, v), _)| v)
                .collect();
            if !member_vectors.is_empty() {
                for v in &member_vectors {
                    for (c, x) in centroid.iter_mut().zip(v.iter()) {
                        *c += *x;
                    }
                }
                let n = member_vectors.len() as f32;
                centroid.iter_mut().for_each(|c| *c /= n);
            }

            Cluster { index, members, centroid }
        })
        .collect()
}

/// Highest score wins; ties go to the lower index. Empty clusters never win.
pub fn select_cluster<'a>(clusters: &'a [Cluster], target: &AudioProfile) -> Option<&'a Cluster> {
    let weights = weights_for(target.emotion);
    let mut best: Option<(&Cluster, f32)> = None;

    for cluster in clusters.iter().filter(|c| !c.members.is_empty()) {
        let score = weights.score(|f| cluster.centroid_value(f));
        debug!(
            "Cluster {} ({} tracks) scored {score:.4} for {}",
            cluster.index,
            cluster.members.len(),
            target.emotion
        );
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((cluster, score)),
        }
    }
    best.map(|(c, _)| c)
}

pub fn refine(
    tracks: &[Track],
    descriptors: &[TrackDescriptor],
    target: &AudioProfile,
    k: usize,
) -> Vec<Track> {
    refine_seeded(tracks, descriptors, target, k, CLUSTER_SEED)
}

pub fn refine_seeded(
    tracks: &[Track],
    descriptors: &[TrackDescriptor],
    target: &AudioProfile,
    k: usize,
    seed: u64,
) -> Vec<Track> {
    if tracks.is_empty() || descriptors.is_empty() || k == 0 {
        return tracks.to_vec();
    }

    let by_id: HashMap<&str, &TrackDescriptor> =
        descriptors.iter().map(|d| (d.track_id.as_str(), d)).collect();

    let vectors: Vec<(usize, Vec<f32>)> = tracks
        .iter()
        .enumerate()
        .filter_map(|(pos, t)| {
            let d = by_id.get(t.id.as_str())?;
            feature_vector(d).map(|v| (pos, v))
        })
        .collect();

    if vectors.len() < k {
        debug!("Only {} clusterable tracks for k={k}, skipping refinement", vectors.len());
        return tracks.to_vec();
    }

    let clusters = build_clusters(&vectors, k, seed);
    match select_cluster(&clusters, target) {
        Some(best) if !best.members.is_empty() => {
            debug!("Selected cluster {} with {} tracks", best.index, best.members.len());
            best.members.iter().map(|&pos| tracks[pos].clone()).collect()
        }
        _ => tracks.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel;
    use crate::mood::profile_for;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {id}"),
            artists: vec!["Artist".into()],
            language: None,
        }
    }

    fn descriptor(id: &str, energy: f32, valence: f32, dance: f32, tempo: f32) -> TrackDescriptor {
        TrackDescriptor {
            track_id: id.to_string(),
            valence: Some(valence),
            energy: Some(energy),
            tempo: Some(tempo),
            danceability: Some(dance),
            instrumentalness: Some(0.0),
            acousticness: Some(0.3),
            mode: Some(1.0),
        }
    }

    /// Three mellow tracks and three loud, bright ones.
    fn pool() -> (Vec<Track>, Vec<TrackDescriptor>) {
        let tracks = ["a", "b", "c", "d", "e", "f"].iter().map(|id| track(id)).collect();
        let descriptors = vec![
            descriptor("a", 0.9, 0.9, 0.8, 128.0),
            descriptor("b", 0.2, 0.1, 0.2, 70.0),
            descriptor("c", 0.85, 0.95, 0.85, 125.0),
            descriptor("d", 0.15, 0.15, 0.25, 72.0),
            descriptor("e", 0.95, 0.85, 0.9, 130.0),
            descriptor("f", 0.25, 0.05, 0.15, 68.0),
        ];
        (tracks, descriptors)
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_feature_vector_normalises_tempo() {
        let v = feature_vector(&descriptor("a", 0.5, 0.4, 0.3, 100.0)).unwrap();
        assert_eq!(v, vec![0.5, 0.4, 0.3, 0.3, 0.0, 0.5]);
    }

    #[test]
    fn test_feature_vector_missing_feature_excluded() {
        let mut d = descriptor("a", 0.5, 0.4, 0.3, 100.0);
        d.acousticness = None;
        assert!(feature_vector(&d).is_none());
    }

    #[test]
    fn test_sad_selects_mellow_cluster_in_order() {
        let (tracks, descriptors) = pool();
        let out = refine(&tracks, &descriptors, &profile_for(EmotionLabel::Sad), 2);
        assert_eq!(ids(&out), vec!["b", "d", "f"]);
    }

    #[test]
    fn test_happy_selects_bright_cluster_in_order() {
        let (tracks, descriptors) = pool();
        let out = refine(&tracks, &descriptors, &profile_for(EmotionLabel::Happy), 2);
        assert_eq!(ids(&out), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_fewer_vectors_than_k_returns_input() {
        let (tracks, descriptors) = pool();
        for k in [7, 10, 100] {
            let out = refine(&tracks, &descriptors, &profile_for(EmotionLabel::Sad), k);
            assert_eq!(out, tracks);
        }
    }

    #[test]
    fn test_tracks_without_descriptors_excluded_from_clustering() {
        let (mut tracks, descriptors) = pool();
        tracks.push(track("nodesc"));
        let out = refine(&tracks, &descriptors, &profile_for(EmotionLabel::Sad), 2);
        assert!(!ids(&out).contains(&"nodesc"));
    }

    #[test]
    fn test_incomplete_descriptors_count_against_k() {
        let (tracks, mut descriptors) = pool();
        for d in descriptors.iter_mut().skip(1) {
            d.tempo = None;
        }
        // One usable vector, k = 2: no clustering.
        let out = refine(&tracks, &descriptors, &profile_for(EmotionLabel::Sad), 2);
        assert_eq!(out, tracks);
    }

    #[test]
    fn test_empty_inputs_degrade_to_input() {
        let (tracks, descriptors) = pool();
        let target = profile_for(EmotionLabel::Angry);
        assert_eq!(refine(&tracks, &[], &target, 2), tracks);
        assert!(refine(&[], &descriptors, &target, 2).is_empty());
        assert_eq!(refine(&tracks, &descriptors, &target, 0), tracks);
    }

    #[test]
    fn test_refine_is_deterministic() {
        let (tracks, descriptors) = pool();
        let target = profile_for(EmotionLabel::Fearful);
        let first = refine(&tracks, &descriptors, &target, 3);
        for _ in 0..5 {
            assert_eq!(refine(&tracks, &descriptors, &target, 3), first);
        }
    }

    #[test]
    fn test_neutral_tie_picks_lowest_index() {
        let clusters = vec![
            Cluster { index: 0, members: vec![2], centroid: vec![0.1; 6] },
            Cluster { index: 1, members: vec![0, 1], centroid: vec![0.9; 6] },
        ];
        let best = select_cluster(&clusters, &profile_for(EmotionLabel::Neutral)).unwrap();
        assert_eq!(best.index, 0);
    }

    #[test]
    fn test_empty_cluster_never_selected() {
        let clusters = vec![
            Cluster { index: 0, members: vec![], centroid: vec![0.0; 6] },
            Cluster { index: 1, members: vec![3], centroid: vec![0.9; 6] },
        ];
        let best = select_cluster(&clusters, &profile_for(EmotionLabel::Sad)).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_centroid_is_member_mean() {
        let vectors = vec![(0, vec![0.0; 6]), (1, vec![1.0; 6])];
        let clusters = build_clusters(&vectors, 1, CLUSTER_SEED);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert!(clusters[0].centroid.iter().all(|c| (*c - 0.5).abs() < 1e-6));
    }
}
