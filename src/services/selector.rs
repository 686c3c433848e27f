//! Random album selection

use std::path::PathBuf;

use rand::Rng;
use rand::seq::SliceRandom;

/// Pick `count` distinct albums uniformly at random
///
/// When `count` covers every album the input is returned as-is (same order,
/// no shuffle). The caller's slice is never reordered.
pub fn select_albums(albums: &[PathBuf], count: usize) -> Vec<PathBuf> {
    select_albums_with(albums, count, &mut rand::thread_rng())
}

/// [`select_albums`] with an explicit random source
pub fn select_albums_with<R: Rng + ?Sized>(
    albums: &[PathBuf],
    count: usize,
    rng: &mut R,
) -> Vec<PathBuf> {
    if count >= albums.len() {
        return albums.to_vec();
    }
    albums.choose_multiple(rng, count).cloned().collect()
}
