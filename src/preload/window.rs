use serde::Serialize;

/// Fetch priority of a preload target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadTarget {
    pub index: usize,
    pub priority: Priority,
}

/// Indices to keep warm around `focus` in a list of `len` images.
///
/// Order is the focused image, then up to `ahead` following images (both
/// high priority), then up to `behind` preceding images, nearest first (low
/// priority). An out-of-range focus yields nothing.
pub fn window(len: usize, focus: usize, ahead: usize, behind: usize) -> Vec<PreloadTarget> {
    if focus >= len {
        return Vec::new();
    }

    let high = (focus..len).take(ahead + 1).map(|index| PreloadTarget {
        index,
        priority: Priority::High,
    });
    let low = (0..focus).rev().take(behind).map(|index| PreloadTarget {
        index,
        priority: Priority::Low,
    });

    high.chain(low).collect()
}
